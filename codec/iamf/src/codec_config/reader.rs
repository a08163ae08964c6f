use bitstream_io::BitRead;
use tokio_util::bytes::Bytes;
use utils::traits::reader::BitwiseReadRemainingFrom;

use crate::errors::IAMFCodecError;
use crate::leb128::{read_uleb128, uleb128_size};
use crate::obu_header::{ObuHeader, ObuType};

use super::{CodecConfigObu, CodecId, DecoderConfig};

/// Reads a codec config payload of `payload_size` bytes. The opaque FLAC
/// and AAC decoder configs occupy whatever the fixed fields leave over.
impl<R: BitRead> BitwiseReadRemainingFrom<usize, R> for CodecConfigObu {
    type Error = IAMFCodecError;
    fn read_remaining_from(payload_size: usize, reader: &mut R) -> Result<Self, Self::Error> {
        let codec_config_id = read_uleb128(reader)?;
        let codec_id = CodecId::try_from(reader.read::<32, u32>()?)?;
        let num_samples_per_frame = read_uleb128(reader)?;
        let audio_roll_distance = reader.read_signed::<16, i16>()?;

        let consumed = uleb128_size(codec_config_id) + 4 + uleb128_size(num_samples_per_frame) + 2;
        let remaining = payload_size
            .checked_sub(consumed)
            .ok_or(IAMFCodecError::ObuSizeTooSmall(payload_size as u32))?;

        let decoder_config = match codec_id {
            CodecId::Ipcm => DecoderConfig::Lpcm {
                sample_format_flags: reader.read::<8, u8>()?,
                sample_size: reader.read::<8, u8>()?,
                sample_rate: reader.read::<32, u32>()?,
            },
            CodecId::Opus => DecoderConfig::Opus {
                version: reader.read::<8, u8>()?,
                output_channel_count: reader.read::<8, u8>()?,
                pre_skip: reader.read::<16, u16>()?,
                input_sample_rate: reader.read::<32, u32>()?,
                output_gain: reader.read_signed::<16, i16>()?,
                mapping_family: reader.read::<8, u8>()?,
            },
            CodecId::Flac => DecoderConfig::Flac(Bytes::from(reader.read_to_vec(remaining)?)),
            CodecId::Mp4a => DecoderConfig::Aac(Bytes::from(reader.read_to_vec(remaining)?)),
        };

        Ok(Self {
            header: ObuHeader::new(ObuType::CodecConfig),
            codec_config_id,
            num_samples_per_frame,
            audio_roll_distance,
            decoder_config,
        })
    }
}
