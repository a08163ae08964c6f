use bitstream_io::BitRead;
use tokio_util::bytes::Bytes;
use utils::traits::reader::{BitwiseReadFrom, BitwiseReadRemainingFrom};

use crate::errors::{IAMFCodecError, IAMFCodecResult};
use crate::leb128::read_uleb128;
use crate::obu_header::{ObuHeader, ObuType};
use crate::param_definitions::{ParamDefinition, ParameterDefinitionType};

use super::{
    AmbisonicsConfig, AmbisonicsMonoConfig, AmbisonicsProjectionConfig, AudioElementConfig,
    AudioElementObu, ChannelAudioLayerConfig, ExtensionConfig, LoudspeakerLayout, OutputGain,
    ScalableChannelLayoutConfig,
};

impl<R: BitRead> BitwiseReadFrom<R> for ChannelAudioLayerConfig {
    type Error = IAMFCodecError;
    fn read_from(reader: &mut R) -> Result<Self, Self::Error> {
        let loudspeaker_layout = LoudspeakerLayout::from(reader.read::<4, u8>()?);
        let output_gain_is_present = reader.read_bit()?;
        let recon_gain_is_present = reader.read_bit()?;
        let reserved = reader.read::<2, u8>()?;
        let substream_count = reader.read::<8, u8>()?;
        let coupled_substream_count = reader.read::<8, u8>()?;
        let output_gain = if output_gain_is_present {
            Some(OutputGain {
                output_gain_flag: reader.read::<6, u8>()?,
                reserved: reader.read::<2, u8>()?,
                output_gain: reader.read_signed::<16, i16>()?,
            })
        } else {
            None
        };
        Ok(Self {
            loudspeaker_layout,
            recon_gain_is_present,
            reserved,
            substream_count,
            coupled_substream_count,
            output_gain,
        })
    }
}

impl<R: BitRead> BitwiseReadFrom<R> for ScalableChannelLayoutConfig {
    type Error = IAMFCodecError;
    fn read_from(reader: &mut R) -> Result<Self, Self::Error> {
        let num_layers = reader.read::<3, u8>()?;
        let reserved = reader.read::<5, u8>()?;
        let mut channel_audio_layer_configs = Vec::with_capacity(usize::from(num_layers));
        for _ in 0..num_layers {
            channel_audio_layer_configs.push(ChannelAudioLayerConfig::read_from(reader)?);
        }
        Ok(Self {
            reserved,
            channel_audio_layer_configs,
        })
    }
}

impl<R: BitRead> BitwiseReadFrom<R> for AmbisonicsConfig {
    type Error = IAMFCodecError;
    fn read_from(reader: &mut R) -> Result<Self, Self::Error> {
        let ambisonics_mode = read_uleb128(reader)?;
        match ambisonics_mode {
            0 => {
                let output_channel_count = reader.read::<8, u8>()?;
                let substream_count = reader.read::<8, u8>()?;
                let channel_mapping = reader.read_to_vec(usize::from(output_channel_count))?;
                Ok(Self::Mono(AmbisonicsMonoConfig {
                    output_channel_count,
                    substream_count,
                    channel_mapping,
                }))
            }
            1 => {
                let output_channel_count = reader.read::<8, u8>()?;
                let substream_count = reader.read::<8, u8>()?;
                let coupled_substream_count = reader.read::<8, u8>()?;
                let entries = (usize::from(substream_count)
                    + usize::from(coupled_substream_count))
                    * usize::from(output_channel_count);
                let mut demixing_matrix = Vec::with_capacity(entries);
                for _ in 0..entries {
                    demixing_matrix.push(reader.read_signed::<16, i16>()?);
                }
                Ok(Self::Projection(AmbisonicsProjectionConfig {
                    output_channel_count,
                    substream_count,
                    coupled_substream_count,
                    demixing_matrix,
                }))
            }
            mode => Err(IAMFCodecError::UnknownAmbisonicsMode(mode)),
        }
    }
}

fn read_config<R: BitRead>(
    audio_element_type: u8,
    reader: &mut R,
) -> IAMFCodecResult<AudioElementConfig> {
    match audio_element_type {
        0 => Ok(AudioElementConfig::Scalable(
            ScalableChannelLayoutConfig::read_from(reader)?,
        )),
        1 => Ok(AudioElementConfig::Ambisonics(AmbisonicsConfig::read_from(
            reader,
        )?)),
        audio_element_type => {
            let size = read_uleb128(reader)?;
            Ok(AudioElementConfig::Extension {
                audio_element_type,
                config: ExtensionConfig {
                    config_bytes: Bytes::from(reader.read_to_vec(size as usize)?),
                },
            })
        }
    }
}

impl<R: BitRead> BitwiseReadFrom<R> for AudioElementObu {
    type Error = IAMFCodecError;
    fn read_from(reader: &mut R) -> Result<Self, Self::Error> {
        let audio_element_id = read_uleb128(reader)?;
        let audio_element_type = reader.read::<3, u8>()?;
        let reserved = reader.read::<5, u8>()?;
        let codec_config_id = read_uleb128(reader)?;

        let num_substreams = read_uleb128(reader)?;
        let mut audio_substream_ids = Vec::with_capacity(num_substreams as usize);
        for _ in 0..num_substreams {
            audio_substream_ids.push(read_uleb128(reader)?);
        }

        let num_parameters = read_uleb128(reader)?;
        let mut audio_element_params = Vec::with_capacity(num_parameters as usize);
        for _ in 0..num_parameters {
            let definition_type = ParameterDefinitionType::from(read_uleb128(reader)?);
            audio_element_params.push(ParamDefinition::read_remaining_from(
                definition_type,
                reader,
            )?);
        }

        let config = read_config(audio_element_type, reader)?;
        let obu = Self {
            header: ObuHeader::new(ObuType::AudioElement),
            audio_element_id,
            reserved,
            codec_config_id,
            audio_substream_ids,
            audio_element_params,
            config,
        };
        obu.validate()?;
        Ok(obu)
    }
}
