use bitstream_io::BitRead;
use utils::traits::reader::{BitwiseReadFrom, BitwiseReadRemainingFrom};

use crate::errors::IAMFCodecError;
use crate::leb128::read_uleb128;
use crate::obu_header::{ObuHeader, ObuType};
use crate::param_definitions::{ParameterDefinitionType, SubblockPartition};
use crate::parameter_data::{
    DemixingInfoParameterData, MixGainParameterData, ReconGainInfoParameterData,
};

use super::{ParameterBlockObu, ParameterSubblock, PerIdParameterMetadata};

impl<R: BitRead> BitwiseReadRemainingFrom<&PerIdParameterMetadata, R> for ParameterBlockObu {
    type Error = IAMFCodecError;
    fn read_remaining_from(
        metadata: &PerIdParameterMetadata,
        reader: &mut R,
    ) -> Result<Self, Self::Error> {
        let parameter_id = read_uleb128(reader)?;
        if parameter_id != metadata.param_definition.parameter_id {
            return Err(IAMFCodecError::ParameterIdMismatch {
                expected: metadata.param_definition.parameter_id,
                got: parameter_id,
            });
        }

        let partition = if metadata.param_definition.param_definition_mode() == 1 {
            Some(SubblockPartition::read_from(reader)?)
        } else {
            None
        };
        let num_subblocks = match &partition {
            Some(partition) => partition.num_subblocks(),
            None => metadata
                .param_definition
                .partition
                .as_ref()
                .ok_or(IAMFCodecError::MissingSubblockPartition(parameter_id))?
                .num_subblocks(),
        };

        let mut subblocks = Vec::with_capacity(num_subblocks as usize);
        for _ in 0..num_subblocks {
            let subblock = match metadata.param_definition_type {
                ParameterDefinitionType::MixGain => {
                    ParameterSubblock::MixGain(MixGainParameterData::read_from(reader)?)
                }
                ParameterDefinitionType::Demixing => {
                    ParameterSubblock::Demixing(DemixingInfoParameterData::read_from(reader)?)
                }
                ParameterDefinitionType::ReconGain => {
                    ParameterSubblock::ReconGain(ReconGainInfoParameterData::read_remaining_from(
                        &metadata.recon_gain_is_present_flags[..],
                        reader,
                    )?)
                }
                ParameterDefinitionType::Reserved(_) => {
                    return Err(IAMFCodecError::SubblockTypeMismatch);
                }
            };
            subblocks.push(subblock);
        }

        let obu = Self {
            header: ObuHeader::new(ObuType::ParameterBlock),
            parameter_id,
            partition,
            subblocks,
        };
        obu.validate(metadata)?;
        Ok(obu)
    }
}
