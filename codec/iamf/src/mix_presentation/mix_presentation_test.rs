#[cfg(test)]
mod test {
    use bitstream_io::{BigEndian, BitReader, BitWriter};
    use tokio_util::bytes::Bytes;
    use utils::traits::reader::BitwiseReadFrom;
    use utils::traits::writer::BitwiseWriteTo;

    use crate::mix_presentation::{
        AnchoredLoudness, HeadphonesRenderingMode, Layout, LoudnessInfo, MixPresentationLayout,
        MixPresentationObu, MixPresentationSubMix, RenderingConfig, SoundSystem,
        SubMixAudioElement,
    };
    use crate::obu_header::{ObuHeader, ObuType};
    use crate::param_definitions::{
        ParamDefinition, ParamDefinitionVariant, SubblockPartition,
    };

    fn mix_gain_definition(parameter_id: u32) -> ParamDefinition {
        ParamDefinition {
            parameter_id,
            parameter_rate: 48000,
            reserved: 0,
            partition: Some(SubblockPartition::constant(960, 960).unwrap()),
            variant: ParamDefinitionVariant::MixGain,
        }
    }

    fn stereo_presentation() -> MixPresentationObu {
        MixPresentationObu {
            header: ObuHeader::new(ObuType::MixPresentation),
            mix_presentation_id: 42,
            language_labels: vec!["en-us".to_string()],
            localized_presentation_annotations: vec!["test mix".to_string()],
            sub_mixes: vec![MixPresentationSubMix {
                audio_elements: vec![SubMixAudioElement {
                    audio_element_id: 300,
                    localized_element_annotations: vec!["bed".to_string()],
                    rendering_config: RenderingConfig {
                        headphones_rendering_mode: HeadphonesRenderingMode::Binaural,
                        reserved: 0,
                        rendering_config_extension: Bytes::new(),
                    },
                    element_mix_gain: mix_gain_definition(100),
                }],
                output_mix_gain: mix_gain_definition(101),
                layouts: vec![MixPresentationLayout {
                    loudness_layout: Layout::LoudspeakersSsConvention {
                        sound_system: SoundSystem::A0_2_0,
                        reserved: 0,
                    },
                    loudness: LoudnessInfo {
                        info_type: 0b1,
                        integrated_loudness: -5632,
                        digital_peak: -512,
                        true_peak: Some(-256),
                        anchored_loudness: None,
                        extension: None,
                    },
                }],
            }],
        }
    }

    fn round_trip(obu: &MixPresentationObu) -> MixPresentationObu {
        let mut writer = BitWriter::endian(Vec::new(), BigEndian);
        obu.write_to(&mut writer).unwrap();
        let bytes = writer.into_writer();
        let mut reader = BitReader::endian(&bytes[..], BigEndian);
        MixPresentationObu::read_from(&mut reader).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let obu = stereo_presentation();
        assert_eq!(round_trip(&obu), obu);
    }

    #[test]
    fn test_round_trip_binaural_layout_and_anchored_loudness() {
        let mut obu = stereo_presentation();
        obu.sub_mixes[0].layouts.push(MixPresentationLayout {
            loudness_layout: Layout::Binaural { reserved: 0 },
            loudness: LoudnessInfo {
                info_type: 0b10,
                integrated_loudness: -4096,
                digital_peak: -1024,
                true_peak: None,
                anchored_loudness: Some(vec![
                    AnchoredLoudness {
                        anchor_element: 1,
                        anchored_loudness: -4000,
                    },
                    AnchoredLoudness {
                        anchor_element: 2,
                        anchored_loudness: -4100,
                    },
                ]),
                extension: None,
            },
        });
        assert_eq!(round_trip(&obu), obu);
    }

    #[test]
    fn test_strings_are_nul_terminated() {
        let obu = stereo_presentation();
        let mut writer = BitWriter::endian(Vec::new(), BigEndian);
        obu.write_to(&mut writer).unwrap();
        let bytes = writer.into_writer();
        // id 42, count_label 1, then "en-us\0".
        assert_eq!(&bytes[..8], &[42, 1, b'e', b'n', b'-', b'u', b's', 0]);
    }

    #[test]
    fn test_annotation_count_must_match_labels() {
        let mut obu = stereo_presentation();
        obu.sub_mixes[0].audio_elements[0]
            .localized_element_annotations
            .push("extra".to_string());
        assert!(obu.validate().is_err());
    }

    #[test]
    fn test_loudness_info_type_consistency() {
        let loudness = LoudnessInfo {
            info_type: 0,
            integrated_loudness: 0,
            digital_peak: 0,
            true_peak: Some(0),
            anchored_loudness: None,
            extension: None,
        };
        assert!(loudness.validate().is_err());
    }

    #[test]
    fn test_output_mix_gain_must_be_mix_gain() {
        let mut obu = stereo_presentation();
        obu.sub_mixes[0].output_mix_gain = ParamDefinition {
            parameter_id: 7,
            parameter_rate: 48000,
            reserved: 0,
            partition: None,
            variant: ParamDefinitionVariant::ReconGain {
                audio_element_id: 300,
            },
        };
        assert!(obu.validate().is_err());
    }
}
