use bitstream_io::BitWrite;
use utils::traits::writer::BitwiseWriteTo;

use crate::errors::IAMFCodecError;
use crate::leb128::write_uleb128;

use super::{
    AmbisonicsConfig, AudioElementConfig, AudioElementObu, ChannelAudioLayerConfig,
    ScalableChannelLayoutConfig,
};

impl<W: BitWrite> BitwiseWriteTo<W> for ChannelAudioLayerConfig {
    type Error = IAMFCodecError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        writer.write::<4, u8>(self.loudspeaker_layout.into())?;
        writer.write_bit(self.output_gain.is_some())?;
        writer.write_bit(self.recon_gain_is_present)?;
        writer.write::<2, u8>(self.reserved)?;
        writer.write::<8, u8>(self.substream_count)?;
        writer.write::<8, u8>(self.coupled_substream_count)?;
        if let Some(output_gain) = &self.output_gain {
            writer.write::<6, u8>(output_gain.output_gain_flag)?;
            writer.write::<2, u8>(output_gain.reserved)?;
            writer.write_signed::<16, i16>(output_gain.output_gain)?;
        }
        Ok(())
    }
}

impl<W: BitWrite> BitwiseWriteTo<W> for ScalableChannelLayoutConfig {
    type Error = IAMFCodecError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        writer.write::<3, u8>(self.num_layers())?;
        writer.write::<5, u8>(self.reserved)?;
        for layer_config in &self.channel_audio_layer_configs {
            layer_config.write_to(writer)?;
        }
        Ok(())
    }
}

impl<W: BitWrite> BitwiseWriteTo<W> for AmbisonicsConfig {
    type Error = IAMFCodecError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        write_uleb128(writer, self.ambisonics_mode())?;
        match self {
            Self::Mono(config) => {
                writer.write::<8, u8>(config.output_channel_count)?;
                writer.write::<8, u8>(config.substream_count)?;
                writer.write_bytes(&config.channel_mapping)?;
            }
            Self::Projection(config) => {
                writer.write::<8, u8>(config.output_channel_count)?;
                writer.write::<8, u8>(config.substream_count)?;
                writer.write::<8, u8>(config.coupled_substream_count)?;
                for entry in &config.demixing_matrix {
                    writer.write_signed::<16, i16>(*entry)?;
                }
            }
        }
        Ok(())
    }
}

impl<W: BitWrite> BitwiseWriteTo<W> for AudioElementObu {
    type Error = IAMFCodecError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        self.validate()?;
        write_uleb128(writer, self.audio_element_id)?;
        writer.write::<3, u8>(self.config.audio_element_type())?;
        writer.write::<5, u8>(self.reserved)?;
        write_uleb128(writer, self.codec_config_id)?;

        write_uleb128(writer, self.num_substreams())?;
        for audio_substream_id in &self.audio_substream_ids {
            write_uleb128(writer, *audio_substream_id)?;
        }

        write_uleb128(writer, self.num_parameters())?;
        for param_definition in &self.audio_element_params {
            write_uleb128(writer, param_definition.definition_type().into())?;
            param_definition.write_to(writer)?;
        }

        match &self.config {
            AudioElementConfig::Scalable(config) => config.write_to(writer)?,
            AudioElementConfig::Ambisonics(config) => config.write_to(writer)?,
            AudioElementConfig::Extension { config, .. } => {
                write_uleb128(writer, config.config_bytes.len() as u32)?;
                writer.write_bytes(&config.config_bytes)?;
            }
        }
        Ok(())
    }
}
