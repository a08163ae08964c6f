use bitstream_io::BitWrite;
use utils::traits::writer::BitwiseWriteTo;

use crate::errors::{IAMFCodecError, IAMFCodecResult};
use crate::leb128::write_uleb128;

use super::{
    Layout, LoudnessInfo, MAX_STRING_SIZE, MixPresentationLayout, MixPresentationObu,
    MixPresentationSubMix, RenderingConfig, SubMixAudioElement,
};

pub(super) fn write_string<W: BitWrite>(writer: &mut W, value: &str) -> IAMFCodecResult<()> {
    // The terminating NUL counts against the size limit.
    if value.len() + 1 > MAX_STRING_SIZE {
        return Err(IAMFCodecError::StringTooLong(value.len() + 1));
    }
    writer.write_bytes(value.as_bytes())?;
    writer.write::<8, u8>(0)?;
    Ok(())
}

impl<W: BitWrite> BitwiseWriteTo<W> for RenderingConfig {
    type Error = IAMFCodecError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        writer.write::<2, u8>(self.headphones_rendering_mode.into())?;
        writer.write::<6, u8>(self.reserved)?;
        write_uleb128(writer, self.rendering_config_extension.len() as u32)?;
        writer.write_bytes(&self.rendering_config_extension)?;
        Ok(())
    }
}

impl<W: BitWrite> BitwiseWriteTo<W> for Layout {
    type Error = IAMFCodecError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        match self {
            Self::LoudspeakersSsConvention {
                sound_system,
                reserved,
            } => {
                writer.write::<2, u8>(2)?;
                writer.write::<4, u8>((*sound_system).into())?;
                writer.write::<2, u8>(*reserved)?;
            }
            Self::Binaural { reserved } => {
                writer.write::<2, u8>(3)?;
                writer.write::<6, u8>(*reserved)?;
            }
        }
        Ok(())
    }
}

impl<W: BitWrite> BitwiseWriteTo<W> for LoudnessInfo {
    type Error = IAMFCodecError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        self.validate()?;
        writer.write::<8, u8>(self.info_type)?;
        writer.write_signed::<16, i16>(self.integrated_loudness)?;
        writer.write_signed::<16, i16>(self.digital_peak)?;
        if let Some(true_peak) = self.true_peak {
            writer.write_signed::<16, i16>(true_peak)?;
        }
        if let Some(anchored_loudness) = &self.anchored_loudness {
            writer.write::<8, u8>(anchored_loudness.len() as u8)?;
            for anchored in anchored_loudness {
                writer.write::<8, u8>(anchored.anchor_element)?;
                writer.write_signed::<16, i16>(anchored.anchored_loudness)?;
            }
        }
        if let Some(extension) = &self.extension {
            write_uleb128(writer, extension.len() as u32)?;
            writer.write_bytes(extension)?;
        }
        Ok(())
    }
}

impl<W: BitWrite> BitwiseWriteTo<W> for MixPresentationLayout {
    type Error = IAMFCodecError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        self.loudness_layout.write_to(writer)?;
        self.loudness.write_to(writer)?;
        Ok(())
    }
}

impl<W: BitWrite> BitwiseWriteTo<W> for SubMixAudioElement {
    type Error = IAMFCodecError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        write_uleb128(writer, self.audio_element_id)?;
        for annotation in &self.localized_element_annotations {
            write_string(writer, annotation)?;
        }
        self.rendering_config.write_to(writer)?;
        self.element_mix_gain.write_to(writer)?;
        Ok(())
    }
}

impl<W: BitWrite> BitwiseWriteTo<W> for MixPresentationSubMix {
    type Error = IAMFCodecError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        write_uleb128(writer, self.audio_elements.len() as u32)?;
        for audio_element in &self.audio_elements {
            audio_element.write_to(writer)?;
        }
        self.output_mix_gain.write_to(writer)?;
        write_uleb128(writer, self.layouts.len() as u32)?;
        for layout in &self.layouts {
            layout.write_to(writer)?;
        }
        Ok(())
    }
}

impl<W: BitWrite> BitwiseWriteTo<W> for MixPresentationObu {
    type Error = IAMFCodecError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        self.validate()?;
        write_uleb128(writer, self.mix_presentation_id)?;
        write_uleb128(writer, self.count_label())?;
        for language_label in &self.language_labels {
            write_string(writer, language_label)?;
        }
        for annotation in &self.localized_presentation_annotations {
            write_string(writer, annotation)?;
        }
        write_uleb128(writer, self.sub_mixes.len() as u32)?;
        for sub_mix in &self.sub_mixes {
            sub_mix.write_to(writer)?;
        }
        Ok(())
    }
}
