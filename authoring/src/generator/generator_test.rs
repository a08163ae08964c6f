#[cfg(test)]
mod test {
    use std::collections::{BTreeMap, HashMap};

    use bitstream_io::{BigEndian, BitWrite, BitWriter};
    use utils::traits::writer::BitwiseWriteTo;

    use codec_iamf::audio_element::{
        AudioElementConfig, AudioElementObu, ChannelAudioLayerConfig, LoudspeakerLayout,
        ScalableChannelLayoutConfig,
    };
    use codec_iamf::errors::ErrorKind;
    use codec_iamf::ia_sequence_header::{IASequenceHeaderObu, ProfileVersion};
    use codec_iamf::leb128::DecodedUleb128;
    use codec_iamf::mix_presentation::{
        MixPresentationObu, MixPresentationSubMix, RenderingConfig, SubMixAudioElement,
    };
    use codec_iamf::obu_header::{ObuHeader, ObuType};
    use codec_iamf::param_definitions::{
        ParamDefinition, ParamDefinitionVariant, SubblockPartition,
    };
    use codec_iamf::parameter_block::ParameterSubblock;
    use codec_iamf::parameter_data::{DMixPMode, DemixingInfoParameterData};

    use crate::demix::{IdTimeLabeledFrameMap, LabeledFrame};
    use crate::errors::AuthoringError;
    use crate::generator::{
        AudioElementWithData, ParameterBlockGenerator, ParameterBlockWithData,
        collect_param_definitions,
    };
    use crate::metadata::{
        MixGainMetadata, ParameterBlockMetadata, ParameterPayloadMetadata,
        ParameterSubblockMetadata, ReconGainLayerMetadata, ReconGainMetadata,
    };
    use crate::timing::GlobalTimingModule;

    const MIX_GAIN_STEP_ID: DecodedUleb128 = 100;
    const MIX_GAIN_LINEAR_ID: DecodedUleb128 = 101;
    const DEMIXING_ID: DecodedUleb128 = 998;
    const RECON_GAIN_ID: DecodedUleb128 = 999;
    const AUDIO_ELEMENT_ID: DecodedUleb128 = 300;

    fn mix_gain_definition(
        parameter_id: DecodedUleb128,
        partition: Option<SubblockPartition>,
    ) -> ParamDefinition {
        ParamDefinition {
            parameter_id,
            parameter_rate: 48000,
            reserved: 0,
            partition,
            variant: ParamDefinitionVariant::MixGain,
        }
    }

    fn demixing_definition(partition: SubblockPartition) -> ParamDefinition {
        ParamDefinition {
            parameter_id: DEMIXING_ID,
            parameter_rate: 48000,
            reserved: 0,
            partition: Some(partition),
            variant: ParamDefinitionVariant::Demixing {
                default_demixing_info: DemixingInfoParameterData {
                    dmixp_mode: DMixPMode::Mode1,
                    reserved: 0,
                },
                default_w: 0,
            },
        }
    }

    fn recon_gain_definition(audio_element_id: DecodedUleb128) -> ParamDefinition {
        ParamDefinition {
            parameter_id: RECON_GAIN_ID,
            parameter_rate: 48000,
            reserved: 0,
            partition: Some(SubblockPartition::constant(8, 8).unwrap()),
            variant: ParamDefinitionVariant::ReconGain { audio_element_id },
        }
    }

    fn layer(
        layout: LoudspeakerLayout,
        substream_count: u8,
        recon_gain_is_present: bool,
    ) -> ChannelAudioLayerConfig {
        ChannelAudioLayerConfig {
            loudspeaker_layout: layout,
            recon_gain_is_present,
            reserved: 0,
            substream_count,
            coupled_substream_count: 1,
            output_gain: None,
        }
    }

    fn stereo_5_1_element(recon_gain_parameter: ParamDefinition) -> AudioElementWithData {
        let config = ScalableChannelLayoutConfig::new(vec![
            layer(LoudspeakerLayout::Stereo, 1, false),
            layer(LoudspeakerLayout::Layout5_1, 3, true),
        ])
        .unwrap();
        let obu = AudioElementObu::new(
            ObuHeader::new(ObuType::AudioElement),
            AUDIO_ELEMENT_ID,
            200,
            vec![0, 1, 2, 3],
            vec![
                demixing_definition(SubblockPartition::constant(8, 8).unwrap()),
                recon_gain_parameter,
            ],
            AudioElementConfig::Scalable(config),
        )
        .unwrap();
        AudioElementWithData::new(obu).unwrap()
    }

    fn mix_presentation() -> MixPresentationObu {
        MixPresentationObu {
            header: ObuHeader::new(ObuType::MixPresentation),
            mix_presentation_id: 1,
            language_labels: vec![],
            localized_presentation_annotations: vec![],
            sub_mixes: vec![MixPresentationSubMix {
                audio_elements: vec![SubMixAudioElement {
                    audio_element_id: AUDIO_ELEMENT_ID,
                    localized_element_annotations: vec![],
                    rendering_config: RenderingConfig::default(),
                    element_mix_gain: mix_gain_definition(
                        MIX_GAIN_STEP_ID,
                        Some(SubblockPartition::constant(960, 960).unwrap()),
                    ),
                }],
                output_mix_gain: mix_gain_definition(MIX_GAIN_LINEAR_ID, None),
                layouts: vec![],
            }],
        }
    }

    /// A generator over the standard fixture: a stereo + 5.1 audio element
    /// with demixing and recon gain parameters, and a mix presentation
    /// carrying a mode 0 step track and a mode 1 track.
    fn initialized_generator(override_computed_recon_gains: bool) -> ParameterBlockGenerator {
        let audio_elements = HashMap::from([(
            AUDIO_ELEMENT_ID,
            stereo_5_1_element(recon_gain_definition(AUDIO_ELEMENT_ID)),
        )]);
        let mix_presentations = vec![mix_presentation()];
        let param_definitions =
            collect_param_definitions(&audio_elements, &mix_presentations).unwrap();
        let ia_sequence_header =
            IASequenceHeaderObu::new(ProfileVersion::Simple, ProfileVersion::Simple);

        let mut generator = ParameterBlockGenerator::new(override_computed_recon_gains);
        generator
            .initialize(
                Some(&ia_sequence_header),
                &audio_elements,
                &mix_presentations,
                &param_definitions,
            )
            .unwrap();
        generator
    }

    fn single_subblock_metadata(
        parameter_id: DecodedUleb128,
        start_timestamp: i32,
        payload: ParameterPayloadMetadata,
    ) -> ParameterBlockMetadata {
        ParameterBlockMetadata {
            parameter_id,
            start_timestamp,
            duration: 0,
            constant_subblock_duration: 0,
            num_subblocks: 0,
            subblocks: vec![ParameterSubblockMetadata {
                subblock_duration: 0,
                payload,
            }],
        }
    }

    fn obu_payload_bytes(block: &ParameterBlockWithData) -> Vec<u8> {
        let mut writer = BitWriter::endian(Vec::new(), BigEndian);
        block.obu.write_to(&mut writer).unwrap();
        writer.byte_align().unwrap();
        writer.into_writer()
    }

    fn recon_gain_frames(
        labeled: [(&str, Vec<i32>); 4],
    ) -> IdTimeLabeledFrameMap {
        let mut frame = LabeledFrame::default();
        for (label, samples) in labeled {
            frame.label_to_samples.insert(label.to_string(), samples);
        }
        let mut time_map = BTreeMap::new();
        time_map.insert(0, frame);
        HashMap::from([(AUDIO_ELEMENT_ID, time_map)])
    }

    fn user_recon_gains(gains: &[(u32, u32)]) -> ReconGainMetadata {
        ReconGainMetadata {
            recon_gains_for_layer: vec![
                ReconGainLayerMetadata::default(),
                ReconGainLayerMetadata {
                    recon_gain: gains.iter().copied().collect(),
                },
            ],
        }
    }

    #[test]
    fn test_mix_gain_step_block() {
        // Scenario: a mode 0 step track emits a four byte block.
        let mut generator = initialized_generator(false);
        let mut timing = GlobalTimingModule::new();

        let duration = generator
            .add_metadata(single_subblock_metadata(
                MIX_GAIN_STEP_ID,
                0,
                ParameterPayloadMetadata::MixGain(MixGainMetadata::Step {
                    start_point_value: -1024,
                }),
            ))
            .unwrap();
        assert_eq!(duration, 960);

        let blocks = generator.generate_mix_gain(&mut timing).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(
            (blocks[0].start_timestamp, blocks[0].end_timestamp),
            (0, 960)
        );
        assert_eq!(obu_payload_bytes(&blocks[0]), vec![0x64, 0x00, 0xfc, 0x00]);
    }

    #[test]
    fn test_mix_gain_linear_two_subblocks() {
        // Scenario: a mode 1 track re-declares each subblock duration and
        // advances the clock to 1920.
        let mut generator = initialized_generator(false);
        let mut timing = GlobalTimingModule::new();

        let linear = |start_point_value, end_point_value| ParameterSubblockMetadata {
            subblock_duration: 960,
            payload: ParameterPayloadMetadata::MixGain(MixGainMetadata::Linear {
                start_point_value,
                end_point_value,
            }),
        };
        let metadata = ParameterBlockMetadata {
            parameter_id: MIX_GAIN_LINEAR_ID,
            start_timestamp: 0,
            duration: 1920,
            constant_subblock_duration: 0,
            num_subblocks: 2,
            subblocks: vec![linear(0, 512), linear(512, 0)],
        };
        assert_eq!(generator.add_metadata(metadata.clone()).unwrap(), 1920);

        let blocks = generator.generate_mix_gain(&mut timing).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(
            (blocks[0].start_timestamp, blocks[0].end_timestamp),
            (0, 1920)
        );
        let partition = blocks[0].obu.partition.as_ref().unwrap();
        assert_eq!(partition.num_subblocks(), 2);
        assert_eq!(partition.subblock_durations(), &[960, 960]);

        // The next unit must claim start 1920.
        let mut next = metadata;
        next.start_timestamp = 1920;
        generator.add_metadata(next).unwrap();
        let blocks = generator.generate_mix_gain(&mut timing).unwrap();
        assert_eq!(
            (blocks[0].start_timestamp, blocks[0].end_timestamp),
            (1920, 3840)
        );
    }

    #[test]
    fn test_demixing_single_subblock_bytes() {
        let mut generator = initialized_generator(false);
        let mut timing = GlobalTimingModule::new();

        generator
            .add_metadata(single_subblock_metadata(
                DEMIXING_ID,
                0,
                ParameterPayloadMetadata::demixing(DMixPMode::Reserved3),
            ))
            .unwrap();
        let blocks = generator.generate_demixing(&mut timing).unwrap();
        assert_eq!(blocks.len(), 1);
        // id 998 as a two byte uleb, then 0b011_00000.
        assert_eq!(obu_payload_bytes(&blocks[0]), vec![0xe6, 0x07, 0x60]);
    }

    #[test]
    fn test_demixing_rejects_two_subblocks() {
        // A demixing definition whose partition would allow two subblocks
        // still may not emit more than one.
        let audio_elements = HashMap::from([(
            AUDIO_ELEMENT_ID,
            stereo_5_1_element(recon_gain_definition(AUDIO_ELEMENT_ID)),
        )]);
        let two_subblock_demixing =
            demixing_definition(SubblockPartition::constant(16, 8).unwrap());
        let param_definitions = HashMap::from([
            (DEMIXING_ID, two_subblock_demixing),
            (RECON_GAIN_ID, recon_gain_definition(AUDIO_ELEMENT_ID)),
        ]);
        let ia_sequence_header =
            IASequenceHeaderObu::new(ProfileVersion::Simple, ProfileVersion::Simple);
        let mut generator = ParameterBlockGenerator::new(false);
        generator
            .initialize(
                Some(&ia_sequence_header),
                &audio_elements,
                &[],
                &param_definitions,
            )
            .unwrap();

        let mut timing = GlobalTimingModule::new();
        let metadata = ParameterBlockMetadata {
            parameter_id: DEMIXING_ID,
            start_timestamp: 0,
            duration: 0,
            constant_subblock_duration: 0,
            num_subblocks: 0,
            subblocks: vec![
                ParameterSubblockMetadata {
                    subblock_duration: 0,
                    payload: ParameterPayloadMetadata::demixing(DMixPMode::Mode1),
                },
                ParameterSubblockMetadata {
                    subblock_duration: 0,
                    payload: ParameterPayloadMetadata::demixing(DMixPMode::Mode1),
                },
            ],
        };
        generator.add_metadata(metadata).unwrap();
        let err = generator.generate_demixing(&mut timing).unwrap_err();
        assert!(matches!(
            err,
            AuthoringError::SingleSubblockRequired { got: 2, .. }
        ));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_recon_gain_two_layers() {
        // Scenario: stereo to 5.1 demixes {D_L3, D_R3, D_Ls5, D_Rs5} with
        // energy ratios {0.5, 0.5, 0.25, 0.25}.
        let mut generator = initialized_generator(false);
        let mut timing = GlobalTimingModule::new();

        let original = recon_gain_frames([
            ("D_L3", vec![4, 4]),
            ("D_R3", vec![4, 4]),
            ("D_Ls5", vec![4, 4]),
            ("D_Rs5", vec![4, 4]),
        ]);
        let decoded = recon_gain_frames([
            ("D_L3", vec![4, 0]),
            ("D_R3", vec![4, 0]),
            ("D_Ls5", vec![2, 2]),
            ("D_Rs5", vec![2, 2]),
        ]);

        generator
            .add_metadata(single_subblock_metadata(
                RECON_GAIN_ID,
                0,
                ParameterPayloadMetadata::ReconGain(user_recon_gains(&[
                    (0, 128),
                    (2, 128),
                    (3, 64),
                    (4, 64),
                ])),
            ))
            .unwrap();
        let blocks = generator
            .generate_recon_gain(&original, &decoded, &mut timing)
            .unwrap();
        assert_eq!(blocks.len(), 1);
        let ParameterSubblock::ReconGain(data) = &blocks[0].obu.subblocks[0] else {
            panic!("expected a recon gain subblock");
        };
        assert_eq!(data.recon_gain_elements.len(), 2);
        assert!(data.recon_gain_elements[0].is_none());
        let element = data.recon_gain_elements[1].unwrap();
        assert_eq!(element.recon_gain_flag, 0b11101);
        assert_eq!(element.recon_gain[0], 128);
        assert_eq!(element.recon_gain[2], 128);
        assert_eq!(element.recon_gain[3], 64);
        assert_eq!(element.recon_gain[4], 64);
    }

    #[test]
    fn test_recon_gain_flag_mismatch_lists_deltas() {
        // Scenario: the user omits one demixed position.
        let mut generator = initialized_generator(false);
        let mut timing = GlobalTimingModule::new();

        let original = recon_gain_frames([
            ("D_L3", vec![4, 4]),
            ("D_R3", vec![4, 4]),
            ("D_Ls5", vec![4, 4]),
            ("D_Rs5", vec![4, 4]),
        ]);
        let decoded = recon_gain_frames([
            ("D_L3", vec![4, 0]),
            ("D_R3", vec![4, 0]),
            ("D_Ls5", vec![2, 2]),
            ("D_Rs5", vec![2, 2]),
        ]);

        generator
            .add_metadata(single_subblock_metadata(
                RECON_GAIN_ID,
                0,
                ParameterPayloadMetadata::ReconGain(user_recon_gains(&[
                    (2, 128),
                    (3, 64),
                    (4, 64),
                ])),
            ))
            .unwrap();
        let err = generator
            .generate_recon_gain(&original, &decoded, &mut timing)
            .unwrap_err();
        let AuthoringError::ReconGainFlagMismatch {
            layer,
            differing_bits,
            ..
        } = err
        else {
            panic!("expected a flag mismatch, got {err:?}");
        };
        assert_eq!(layer, 1);
        assert_eq!(differing_bits, vec![0]);
    }

    #[test]
    fn test_recon_gain_value_mismatch_lists_all_deltas() {
        let mut generator = initialized_generator(false);
        let mut timing = GlobalTimingModule::new();

        let original = recon_gain_frames([
            ("D_L3", vec![4, 4]),
            ("D_R3", vec![4, 4]),
            ("D_Ls5", vec![4, 4]),
            ("D_Rs5", vec![4, 4]),
        ]);
        let decoded = recon_gain_frames([
            ("D_L3", vec![4, 0]),
            ("D_R3", vec![4, 0]),
            ("D_Ls5", vec![2, 2]),
            ("D_Rs5", vec![2, 2]),
        ]);

        generator
            .add_metadata(single_subblock_metadata(
                RECON_GAIN_ID,
                0,
                ParameterPayloadMetadata::ReconGain(user_recon_gains(&[
                    (0, 100),
                    (2, 128),
                    (3, 64),
                    (4, 60),
                ])),
            ))
            .unwrap();
        let err = generator
            .generate_recon_gain(&original, &decoded, &mut timing)
            .unwrap_err();
        let AuthoringError::ReconGainValueMismatch { deltas, .. } = err else {
            panic!("expected a value mismatch, got {err:?}");
        };
        assert_eq!(deltas.len(), 2);
        assert_eq!((deltas[0].bit_position, deltas[0].computed, deltas[0].user), (0, 128, 100));
        assert_eq!((deltas[1].bit_position, deltas[1].computed, deltas[1].user), (4, 64, 60));
    }

    #[test]
    fn test_recon_gain_override_emits_user_values() {
        let mut generator = initialized_generator(true);
        let mut timing = GlobalTimingModule::new();

        // No sample maps are consulted in override mode.
        let empty = IdTimeLabeledFrameMap::new();
        generator
            .add_metadata(single_subblock_metadata(
                RECON_GAIN_ID,
                0,
                ParameterPayloadMetadata::ReconGain(user_recon_gains(&[(5, 7)])),
            ))
            .unwrap();
        let blocks = generator
            .generate_recon_gain(&empty, &empty, &mut timing)
            .unwrap();
        let ParameterSubblock::ReconGain(data) = &blocks[0].obu.subblocks[0] else {
            panic!("expected a recon gain subblock");
        };
        let element = data.recon_gain_elements[1].unwrap();
        assert_eq!(element.recon_gain_flag, 0b100000);
        assert_eq!(element.recon_gain[5], 7);
    }

    #[test]
    fn test_timing_gap_across_units() {
        // Scenario: after [0, 100), a claim of 200 is a gap.
        let mut generator = initialized_generator(false);
        let mut timing = GlobalTimingModule::new();

        let metadata = |start_timestamp| ParameterBlockMetadata {
            parameter_id: MIX_GAIN_LINEAR_ID,
            start_timestamp,
            duration: 100,
            constant_subblock_duration: 100,
            num_subblocks: 0,
            subblocks: vec![ParameterSubblockMetadata {
                subblock_duration: 0,
                payload: ParameterPayloadMetadata::MixGain(MixGainMetadata::Step {
                    start_point_value: 0,
                }),
            }],
        };
        generator.add_metadata(metadata(0)).unwrap();
        generator.generate_mix_gain(&mut timing).unwrap();

        generator.add_metadata(metadata(200)).unwrap();
        let err = generator.generate_mix_gain(&mut timing).unwrap_err();
        assert!(matches!(
            err,
            AuthoringError::TimingGap {
                expected: 100,
                claimed: 200,
                ..
            }
        ));
    }

    #[test]
    fn test_generate_before_initialize_is_a_precondition_failure() {
        let mut generator = ParameterBlockGenerator::new(false);
        let mut timing = GlobalTimingModule::new();
        let err = generator.generate_mix_gain(&mut timing).unwrap_err();
        assert!(matches!(err, AuthoringError::NotInitialized));
        assert_eq!(err.kind(), ErrorKind::FailedPrecondition);
    }

    #[test]
    fn test_initialize_requires_a_sequence_header() {
        let mut generator = ParameterBlockGenerator::new(false);
        let err = generator
            .initialize(None, &HashMap::new(), &[], &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, AuthoringError::MissingSequenceHeader));
    }

    #[test]
    fn test_initialize_rejects_dangling_audio_element() {
        let audio_elements = HashMap::new();
        let param_definitions = HashMap::from([(RECON_GAIN_ID, recon_gain_definition(301))]);
        let ia_sequence_header =
            IASequenceHeaderObu::new(ProfileVersion::Simple, ProfileVersion::Simple);
        let mut generator = ParameterBlockGenerator::new(false);
        let err = generator
            .initialize(
                Some(&ia_sequence_header),
                &audio_elements,
                &[],
                &param_definitions,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            AuthoringError::DanglingAudioElement {
                audio_element_id: 301,
                ..
            }
        ));
    }

    #[test]
    fn test_initialize_rejects_reserved_definitions() {
        let param_definitions = HashMap::from([(
            7,
            ParamDefinition {
                parameter_id: 7,
                parameter_rate: 0,
                reserved: 0,
                partition: None,
                variant: ParamDefinitionVariant::Reserved {
                    definition_type: 4,
                    definition_bytes: tokio_util::bytes::Bytes::new(),
                },
            },
        )]);
        let ia_sequence_header =
            IASequenceHeaderObu::new(ProfileVersion::Simple, ProfileVersion::Simple);
        let mut generator = ParameterBlockGenerator::new(false);
        let err = generator
            .initialize(
                Some(&ia_sequence_header),
                &HashMap::new(),
                &[],
                &param_definitions,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            AuthoringError::UnsupportedParameterType {
                parameter_id: 7,
                definition_type: 4,
            }
        ));
    }

    #[test]
    fn test_stray_metadata_is_rejected() {
        let mut generator = initialized_generator(false);
        let err = generator
            .add_metadata(single_subblock_metadata(
                12345,
                0,
                ParameterPayloadMetadata::demixing(DMixPMode::Mode1),
            ))
            .unwrap_err();
        assert!(matches!(err, AuthoringError::StrayParameterBlock(12345)));
    }

    #[test]
    fn test_payload_type_must_match_definition() {
        let mut generator = initialized_generator(false);
        let mut timing = GlobalTimingModule::new();
        generator
            .add_metadata(single_subblock_metadata(
                MIX_GAIN_STEP_ID,
                0,
                ParameterPayloadMetadata::demixing(DMixPMode::Mode1),
            ))
            .unwrap();
        let err = generator.generate_mix_gain(&mut timing).unwrap_err();
        assert!(matches!(err, AuthoringError::PayloadTypeMismatch { .. }));
    }

    #[test]
    fn test_mix_gain_coercion_overflow() {
        let mut generator = initialized_generator(false);
        let mut timing = GlobalTimingModule::new();
        generator
            .add_metadata(single_subblock_metadata(
                MIX_GAIN_STEP_ID,
                0,
                ParameterPayloadMetadata::MixGain(MixGainMetadata::Step {
                    start_point_value: 40000,
                }),
            ))
            .unwrap();
        let err = generator.generate_mix_gain(&mut timing).unwrap_err();
        assert!(matches!(err, AuthoringError::MixGainOutOfRange(40000)));
    }

    #[test]
    fn test_collect_rejects_mix_gain_inside_an_audio_element() {
        let element = stereo_5_1_element(recon_gain_definition(AUDIO_ELEMENT_ID));
        let mut obu = element.obu.clone();
        obu.audio_element_params.push(mix_gain_definition(
            50,
            Some(SubblockPartition::constant(960, 960).unwrap()),
        ));
        let audio_elements = HashMap::from([(
            AUDIO_ELEMENT_ID,
            AudioElementWithData::new(obu).unwrap(),
        )]);
        assert!(matches!(
            collect_param_definitions(&audio_elements, &[]).unwrap_err(),
            AuthoringError::ParamTypeNotAllowedInAudioElement { definition_type: 0 }
        ));
    }

    #[test]
    fn test_collect_rejects_conflicting_duplicates() {
        let audio_elements = HashMap::from([(
            AUDIO_ELEMENT_ID,
            stereo_5_1_element(recon_gain_definition(AUDIO_ELEMENT_ID)),
        )]);
        let mut presentation = mix_presentation();
        // Reuse the demixing parameter id for a mix gain track.
        presentation.sub_mixes[0].output_mix_gain =
            mix_gain_definition(DEMIXING_ID, None);
        assert!(matches!(
            collect_param_definitions(&audio_elements, &[presentation]).unwrap_err(),
            AuthoringError::DuplicateParamDefinition(DEMIXING_ID)
        ));
    }
}
