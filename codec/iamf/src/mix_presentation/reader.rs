use bitstream_io::BitRead;
use tokio_util::bytes::Bytes;
use utils::traits::reader::{BitwiseReadFrom, BitwiseReadRemainingFrom};

use crate::errors::{IAMFCodecError, IAMFCodecResult};
use crate::leb128::read_uleb128;
use crate::obu_header::{ObuHeader, ObuType};
use crate::param_definitions::{ParamDefinition, ParameterDefinitionType};

use super::{
    AnchoredLoudness, HeadphonesRenderingMode, Layout, LoudnessInfo, MAX_STRING_SIZE,
    MixPresentationLayout, MixPresentationObu, MixPresentationSubMix, RenderingConfig,
    SoundSystem, SubMixAudioElement,
};

pub(super) fn read_string<R: BitRead>(reader: &mut R) -> IAMFCodecResult<String> {
    let mut bytes = Vec::new();
    loop {
        let byte = reader.read::<8, u8>()?;
        if byte == 0 {
            break;
        }
        bytes.push(byte);
        if bytes.len() + 1 > MAX_STRING_SIZE {
            return Err(IAMFCodecError::StringTooLong(bytes.len() + 1));
        }
    }
    String::from_utf8(bytes).map_err(|_| IAMFCodecError::InvalidString)
}

impl<R: BitRead> BitwiseReadFrom<R> for RenderingConfig {
    type Error = IAMFCodecError;
    fn read_from(reader: &mut R) -> Result<Self, Self::Error> {
        let headphones_rendering_mode = HeadphonesRenderingMode::from(reader.read::<2, u8>()?);
        let reserved = reader.read::<6, u8>()?;
        let extension_size = read_uleb128(reader)?;
        let rendering_config_extension =
            Bytes::from(reader.read_to_vec(extension_size as usize)?);
        Ok(Self {
            headphones_rendering_mode,
            reserved,
            rendering_config_extension,
        })
    }
}

impl<R: BitRead> BitwiseReadFrom<R> for Layout {
    type Error = IAMFCodecError;
    fn read_from(reader: &mut R) -> Result<Self, Self::Error> {
        let layout_type = reader.read::<2, u8>()?;
        match layout_type {
            2 => Ok(Self::LoudspeakersSsConvention {
                sound_system: SoundSystem::from(reader.read::<4, u8>()?),
                reserved: reader.read::<2, u8>()?,
            }),
            3 => Ok(Self::Binaural {
                reserved: reader.read::<6, u8>()?,
            }),
            layout_type => Err(IAMFCodecError::UnknownLayoutType(layout_type)),
        }
    }
}

impl<R: BitRead> BitwiseReadFrom<R> for LoudnessInfo {
    type Error = IAMFCodecError;
    fn read_from(reader: &mut R) -> Result<Self, Self::Error> {
        let info_type = reader.read::<8, u8>()?;
        let integrated_loudness = reader.read_signed::<16, i16>()?;
        let digital_peak = reader.read_signed::<16, i16>()?;
        let true_peak = if info_type & 0b1 != 0 {
            Some(reader.read_signed::<16, i16>()?)
        } else {
            None
        };
        let anchored_loudness = if info_type & 0b10 != 0 {
            let num_anchored_loudness = reader.read::<8, u8>()?;
            let mut anchored = Vec::with_capacity(usize::from(num_anchored_loudness));
            for _ in 0..num_anchored_loudness {
                anchored.push(AnchoredLoudness {
                    anchor_element: reader.read::<8, u8>()?,
                    anchored_loudness: reader.read_signed::<16, i16>()?,
                });
            }
            Some(anchored)
        } else {
            None
        };
        let extension = if info_type & 0xfc != 0 {
            let info_type_size = read_uleb128(reader)?;
            Some(Bytes::from(reader.read_to_vec(info_type_size as usize)?))
        } else {
            None
        };
        Ok(Self {
            info_type,
            integrated_loudness,
            digital_peak,
            true_peak,
            anchored_loudness,
            extension,
        })
    }
}

fn read_sub_mix_audio_element<R: BitRead>(
    count_label: u32,
    reader: &mut R,
) -> IAMFCodecResult<SubMixAudioElement> {
    let audio_element_id = read_uleb128(reader)?;
    let mut localized_element_annotations = Vec::with_capacity(count_label as usize);
    for _ in 0..count_label {
        localized_element_annotations.push(read_string(reader)?);
    }
    let rendering_config = RenderingConfig::read_from(reader)?;
    let element_mix_gain =
        ParamDefinition::read_remaining_from(ParameterDefinitionType::MixGain, reader)?;
    Ok(SubMixAudioElement {
        audio_element_id,
        localized_element_annotations,
        rendering_config,
        element_mix_gain,
    })
}

fn read_sub_mix<R: BitRead>(
    count_label: u32,
    reader: &mut R,
) -> IAMFCodecResult<MixPresentationSubMix> {
    let num_audio_elements = read_uleb128(reader)?;
    let mut audio_elements = Vec::with_capacity(num_audio_elements as usize);
    for _ in 0..num_audio_elements {
        audio_elements.push(read_sub_mix_audio_element(count_label, reader)?);
    }
    let output_mix_gain =
        ParamDefinition::read_remaining_from(ParameterDefinitionType::MixGain, reader)?;
    let num_layouts = read_uleb128(reader)?;
    let mut layouts = Vec::with_capacity(num_layouts as usize);
    for _ in 0..num_layouts {
        layouts.push(MixPresentationLayout {
            loudness_layout: Layout::read_from(reader)?,
            loudness: LoudnessInfo::read_from(reader)?,
        });
    }
    Ok(MixPresentationSubMix {
        audio_elements,
        output_mix_gain,
        layouts,
    })
}

impl<R: BitRead> BitwiseReadFrom<R> for MixPresentationObu {
    type Error = IAMFCodecError;
    fn read_from(reader: &mut R) -> Result<Self, Self::Error> {
        let mix_presentation_id = read_uleb128(reader)?;
        let count_label = read_uleb128(reader)?;
        let mut language_labels = Vec::with_capacity(count_label as usize);
        for _ in 0..count_label {
            language_labels.push(read_string(reader)?);
        }
        let mut localized_presentation_annotations = Vec::with_capacity(count_label as usize);
        for _ in 0..count_label {
            localized_presentation_annotations.push(read_string(reader)?);
        }
        let num_sub_mixes = read_uleb128(reader)?;
        let mut sub_mixes = Vec::with_capacity(num_sub_mixes as usize);
        for _ in 0..num_sub_mixes {
            sub_mixes.push(read_sub_mix(count_label, reader)?);
        }
        let obu = Self {
            header: ObuHeader::new(ObuType::MixPresentation),
            mix_presentation_id,
            language_labels,
            localized_presentation_annotations,
            sub_mixes,
        };
        obu.validate()?;
        Ok(obu)
    }
}
