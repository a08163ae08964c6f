#[cfg(test)]
mod test {
    use bitstream_io::{BigEndian, BitReader, BitWrite, BitWriter};
    use tokio_util::bytes::Bytes;
    use utils::traits::reader::BitwiseReadRemainingFrom;
    use utils::traits::writer::BitwiseWriteTo;

    use crate::param_definitions::{
        ParamDefinition, ParamDefinitionVariant, ParameterDefinitionType, SubblockPartition,
    };
    use crate::parameter_data::{DMixPMode, DemixingInfoParameterData};

    fn write_to_bytes(definition: &ParamDefinition) -> Vec<u8> {
        let mut writer = BitWriter::endian(Vec::new(), BigEndian);
        definition.write_to(&mut writer).unwrap();
        writer.byte_align().unwrap();
        writer.into_writer()
    }

    fn read_back(definition_type: ParameterDefinitionType, bytes: &[u8]) -> ParamDefinition {
        let mut reader = BitReader::endian(bytes, BigEndian);
        ParamDefinition::read_remaining_from(definition_type, &mut reader).unwrap()
    }

    #[test]
    fn test_partition_constant_subblocks() {
        let partition = SubblockPartition::constant(960, 960).unwrap();
        assert_eq!(partition.num_subblocks(), 1);
        assert_eq!(partition.subblock_duration(0), Some(960));
        assert_eq!(partition.subblock_duration(1), None);

        let uneven = SubblockPartition::constant(1000, 300).unwrap();
        assert_eq!(uneven.num_subblocks(), 4);
        assert_eq!(uneven.subblock_duration(2), Some(300));
        // The last subblock absorbs the remainder.
        assert_eq!(uneven.subblock_duration(3), Some(100));
    }

    #[test]
    fn test_partition_explicit_sum_must_match() {
        assert!(SubblockPartition::explicit(1920, vec![960, 960]).is_ok());
        assert!(SubblockPartition::explicit(1920, vec![960, 900]).is_err());
        assert!(SubblockPartition::explicit(1920, vec![]).is_err());
        assert!(SubblockPartition::constant(960, 0).is_err());
    }

    #[test]
    fn test_mix_gain_definition_bytes() {
        let definition = ParamDefinition {
            parameter_id: 9,
            parameter_rate: 960,
            reserved: 0,
            partition: Some(SubblockPartition::constant(960, 960).unwrap()),
            variant: ParamDefinitionVariant::MixGain,
        };
        // id, rate (2 byte uleb), mode 0 + reserved, duration, constant.
        assert_eq!(
            write_to_bytes(&definition),
            vec![0x09, 0xc0, 0x07, 0x00, 0xc0, 0x07, 0xc0, 0x07]
        );
    }

    #[test]
    fn test_explicit_durations_last_is_implicit() {
        let definition = ParamDefinition {
            parameter_id: 1,
            parameter_rate: 100,
            reserved: 0,
            partition: Some(SubblockPartition::explicit(100, vec![30, 30, 40]).unwrap()),
            variant: ParamDefinitionVariant::MixGain,
        };
        // duration 100, constant 0, num 3, then only the first two durations.
        assert_eq!(
            write_to_bytes(&definition),
            vec![0x01, 0x64, 0x00, 0x64, 0x00, 0x03, 30, 30]
        );
        let parsed = read_back(
            ParameterDefinitionType::MixGain,
            &write_to_bytes(&definition),
        );
        assert_eq!(parsed, definition);
    }

    #[test]
    fn test_demixing_definition_round_trip() {
        let definition = ParamDefinition {
            parameter_id: 998,
            parameter_rate: 48000,
            reserved: 0,
            partition: Some(SubblockPartition::constant(8, 8).unwrap()),
            variant: ParamDefinitionVariant::Demixing {
                default_demixing_info: DemixingInfoParameterData {
                    dmixp_mode: DMixPMode::Mode2,
                    reserved: 0,
                },
                default_w: 10,
            },
        };
        let parsed = read_back(
            ParameterDefinitionType::Demixing,
            &write_to_bytes(&definition),
        );
        assert_eq!(parsed, definition);
    }

    #[test]
    fn test_recon_gain_definition_round_trip() {
        let definition = ParamDefinition {
            parameter_id: 999,
            parameter_rate: 48000,
            reserved: 0,
            partition: Some(SubblockPartition::constant(8, 8).unwrap()),
            variant: ParamDefinitionVariant::ReconGain {
                audio_element_id: 300,
            },
        };
        let parsed = read_back(
            ParameterDefinitionType::ReconGain,
            &write_to_bytes(&definition),
        );
        assert_eq!(parsed, definition);
    }

    #[test]
    fn test_mode_1_definition_has_no_partition() {
        let definition = ParamDefinition {
            parameter_id: 42,
            parameter_rate: 48000,
            reserved: 0,
            partition: None,
            variant: ParamDefinitionVariant::MixGain,
        };
        assert_eq!(definition.param_definition_mode(), 1);
        let parsed = read_back(
            ParameterDefinitionType::MixGain,
            &write_to_bytes(&definition),
        );
        assert_eq!(parsed, definition);
    }

    #[test]
    fn test_reserved_definition_is_length_prefixed() {
        let definition = ParamDefinition {
            parameter_id: 0,
            parameter_rate: 0,
            reserved: 0,
            partition: None,
            variant: ParamDefinitionVariant::Reserved {
                definition_type: 7,
                definition_bytes: Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]),
            },
        };
        let bytes = write_to_bytes(&definition);
        assert_eq!(bytes, vec![0x04, 0xde, 0xad, 0xbe, 0xef]);
        let parsed = read_back(ParameterDefinitionType::Reserved(7), &bytes);
        assert_eq!(parsed, definition);
    }

    #[test]
    fn test_reserved_definition_rejects_known_tags() {
        let definition = ParamDefinition {
            parameter_id: 0,
            parameter_rate: 0,
            reserved: 0,
            partition: None,
            variant: ParamDefinitionVariant::Reserved {
                definition_type: 1,
                definition_bytes: Bytes::new(),
            },
        };
        let mut writer = BitWriter::endian(Vec::new(), BigEndian);
        assert!(definition.write_to(&mut writer).is_err());
    }
}
