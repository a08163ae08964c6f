use bitstream_io::BitWrite;
use utils::traits::writer::BitwiseWriteTo;

use crate::errors::IAMFCodecError;
use crate::leb128::write_uleb128;

use super::{CodecConfigObu, DecoderConfig};

impl<W: BitWrite> BitwiseWriteTo<W> for DecoderConfig {
    type Error = IAMFCodecError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        match self {
            Self::Lpcm {
                sample_format_flags,
                sample_size,
                sample_rate,
            } => {
                writer.write::<8, u8>(*sample_format_flags)?;
                writer.write::<8, u8>(*sample_size)?;
                writer.write::<32, u32>(*sample_rate)?;
            }
            Self::Opus {
                version,
                output_channel_count,
                pre_skip,
                input_sample_rate,
                output_gain,
                mapping_family,
            } => {
                writer.write::<8, u8>(*version)?;
                writer.write::<8, u8>(*output_channel_count)?;
                writer.write::<16, u16>(*pre_skip)?;
                writer.write::<32, u32>(*input_sample_rate)?;
                writer.write_signed::<16, i16>(*output_gain)?;
                writer.write::<8, u8>(*mapping_family)?;
            }
            Self::Flac(bytes) | Self::Aac(bytes) => {
                writer.write_bytes(bytes)?;
            }
        }
        Ok(())
    }
}

impl<W: BitWrite> BitwiseWriteTo<W> for CodecConfigObu {
    type Error = IAMFCodecError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        write_uleb128(writer, self.codec_config_id)?;
        writer.write::<32, u32>(self.decoder_config.codec_id().into())?;
        write_uleb128(writer, self.num_samples_per_frame)?;
        writer.write_signed::<16, i16>(self.audio_roll_distance)?;
        self.decoder_config.write_to(writer)?;
        Ok(())
    }
}
