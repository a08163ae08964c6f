//! @see: IAMF v1.0, Mix Presentation OBU — how audio elements are rendered
//! and mixed for presentation, including the mix gain parameter tracks.

use tokio_util::bytes::Bytes;

use crate::errors::{IAMFCodecError, IAMFCodecResult};
use crate::leb128::DecodedUleb128;
use crate::obu_header::ObuHeader;
use crate::param_definitions::{ParamDefinition, ParameterDefinitionType};

pub mod reader;
pub mod writer;
#[cfg(test)]
mod mix_presentation_test;

/// Serialized strings are NUL-terminated UTF-8, at most 128 bytes in total.
pub const MAX_STRING_SIZE: usize = 128;

/// 2 bit headphones rendering mode of one referenced audio element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadphonesRenderingMode {
    Stereo,       // 0
    Binaural,     // 1
    Reserved(u8), // 2..=3
}

impl From<HeadphonesRenderingMode> for u8 {
    fn from(value: HeadphonesRenderingMode) -> Self {
        match value {
            HeadphonesRenderingMode::Stereo => 0,
            HeadphonesRenderingMode::Binaural => 1,
            HeadphonesRenderingMode::Reserved(value) => value,
        }
    }
}

impl From<u8> for HeadphonesRenderingMode {
    fn from(value: u8) -> Self {
        match value & 0b11 {
            0 => HeadphonesRenderingMode::Stereo,
            1 => HeadphonesRenderingMode::Binaural,
            value => HeadphonesRenderingMode::Reserved(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderingConfig {
    pub headphones_rendering_mode: HeadphonesRenderingMode, // 2 bits
    pub reserved: u8,                                       // 6 bits
    /// Length-prefixed opaque extension.
    pub rendering_config_extension: Bytes,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            headphones_rendering_mode: HeadphonesRenderingMode::Stereo,
            reserved: 0,
            rendering_config_extension: Bytes::new(),
        }
    }
}

/// 4 bit sound system of ITU-R BS.2051.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundSystem {
    A0_2_0,       // 0
    B0_5_0,       // 1
    C2_5_0,       // 2
    D4_5_0,       // 3
    E4_5_1,       // 4
    F3_7_0,       // 5
    G4_9_0,       // 6
    H9_10_3,      // 7
    I0_7_0,       // 8
    J4_7_0,       // 9
    Reserved(u8), // 10..=15
}

impl From<SoundSystem> for u8 {
    fn from(value: SoundSystem) -> Self {
        match value {
            SoundSystem::A0_2_0 => 0,
            SoundSystem::B0_5_0 => 1,
            SoundSystem::C2_5_0 => 2,
            SoundSystem::D4_5_0 => 3,
            SoundSystem::E4_5_1 => 4,
            SoundSystem::F3_7_0 => 5,
            SoundSystem::G4_9_0 => 6,
            SoundSystem::H9_10_3 => 7,
            SoundSystem::I0_7_0 => 8,
            SoundSystem::J4_7_0 => 9,
            SoundSystem::Reserved(value) => value,
        }
    }
}

impl From<u8> for SoundSystem {
    fn from(value: u8) -> Self {
        match value & 0x0f {
            0 => SoundSystem::A0_2_0,
            1 => SoundSystem::B0_5_0,
            2 => SoundSystem::C2_5_0,
            3 => SoundSystem::D4_5_0,
            4 => SoundSystem::E4_5_1,
            5 => SoundSystem::F3_7_0,
            6 => SoundSystem::G4_9_0,
            7 => SoundSystem::H9_10_3,
            8 => SoundSystem::I0_7_0,
            9 => SoundSystem::J4_7_0,
            value => SoundSystem::Reserved(value),
        }
    }
}

/// Loudness layout of one rendered target. 2 bit layout type; types 0 and 1
/// are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    LoudspeakersSsConvention {
        sound_system: SoundSystem, // 4 bits
        reserved: u8,              // 2 bits
    },
    Binaural {
        reserved: u8, // 6 bits
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchoredLoudness {
    pub anchor_element: u8,
    pub anchored_loudness: i16,
}

/// Loudness information of one layout. The option fields mirror the bits of
/// `info_type`: bit 0 true peak, bit 1 anchored loudness, bits 2..7 an
/// opaque extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoudnessInfo {
    pub info_type: u8,
    pub integrated_loudness: i16,
    pub digital_peak: i16,
    pub true_peak: Option<i16>,
    pub anchored_loudness: Option<Vec<AnchoredLoudness>>,
    pub extension: Option<Bytes>,
}

impl LoudnessInfo {
    pub fn validate(&self) -> IAMFCodecResult<()> {
        let consistent = (self.info_type & 0b1 != 0) == self.true_peak.is_some()
            && (self.info_type & 0b10 != 0) == self.anchored_loudness.is_some()
            && (self.info_type & 0xfc != 0) == self.extension.is_some();
        if !consistent {
            return Err(IAMFCodecError::LoudnessInfoTypeMismatch {
                info_type: self.info_type,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixPresentationLayout {
    pub loudness_layout: Layout,
    pub loudness: LoudnessInfo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubMixAudioElement {
    pub audio_element_id: DecodedUleb128,
    /// One entry per language label of the OBU.
    pub localized_element_annotations: Vec<String>,
    pub rendering_config: RenderingConfig,
    /// Must be a mix gain definition.
    pub element_mix_gain: ParamDefinition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixPresentationSubMix {
    pub audio_elements: Vec<SubMixAudioElement>,
    /// Must be a mix gain definition.
    pub output_mix_gain: ParamDefinition,
    pub layouts: Vec<MixPresentationLayout>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixPresentationObu {
    pub header: ObuHeader,
    pub mix_presentation_id: DecodedUleb128,
    pub language_labels: Vec<String>,
    /// One localized name per language label.
    pub localized_presentation_annotations: Vec<String>,
    pub sub_mixes: Vec<MixPresentationSubMix>,
}

impl MixPresentationObu {
    pub fn count_label(&self) -> DecodedUleb128 {
        self.language_labels.len() as u32
    }

    pub fn validate(&self) -> IAMFCodecResult<()> {
        let count_label = self.language_labels.len();
        if self.localized_presentation_annotations.len() != count_label {
            return Err(IAMFCodecError::AnnotationCountMismatch {
                expected: count_label,
                got: self.localized_presentation_annotations.len(),
            });
        }
        for sub_mix in &self.sub_mixes {
            for audio_element in &sub_mix.audio_elements {
                if audio_element.localized_element_annotations.len() != count_label {
                    return Err(IAMFCodecError::AnnotationCountMismatch {
                        expected: count_label,
                        got: audio_element.localized_element_annotations.len(),
                    });
                }
                validate_mix_gain(&audio_element.element_mix_gain)?;
            }
            validate_mix_gain(&sub_mix.output_mix_gain)?;
            for layout in &sub_mix.layouts {
                layout.loudness.validate()?;
            }
        }
        Ok(())
    }
}

fn validate_mix_gain(definition: &ParamDefinition) -> IAMFCodecResult<()> {
    if definition.definition_type() != ParameterDefinitionType::MixGain {
        return Err(IAMFCodecError::NotAMixGainDefinition(
            definition.parameter_id,
        ));
    }
    Ok(())
}
