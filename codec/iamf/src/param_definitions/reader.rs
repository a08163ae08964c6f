use bitstream_io::BitRead;
use tokio_util::bytes::Bytes;
use utils::traits::reader::{BitwiseReadFrom, BitwiseReadRemainingFrom};

use crate::errors::{IAMFCodecError, IAMFCodecResult};
use crate::leb128::read_uleb128;
use crate::parameter_data::DemixingInfoParameterData;

use super::{ParamDefinition, ParamDefinitionVariant, ParameterDefinitionType, SubblockPartition};

impl<R: BitRead> BitwiseReadFrom<R> for SubblockPartition {
    type Error = IAMFCodecError;
    fn read_from(reader: &mut R) -> Result<Self, Self::Error> {
        let duration = read_uleb128(reader)?;
        let constant_subblock_duration = read_uleb128(reader)?;
        if constant_subblock_duration != 0 {
            return SubblockPartition::constant(duration, constant_subblock_duration);
        }
        let num_subblocks = read_uleb128(reader)?;
        if num_subblocks == 0 {
            return Err(IAMFCodecError::EmptySubblockDurations);
        }
        let mut subblock_durations = Vec::with_capacity(num_subblocks as usize);
        let mut sum: u64 = 0;
        for _ in 0..num_subblocks - 1 {
            let subblock_duration = read_uleb128(reader)?;
            sum += u64::from(subblock_duration);
            subblock_durations.push(subblock_duration);
        }
        // The last duration is implicit: whatever remains of the total.
        let last = u64::from(duration)
            .checked_sub(sum)
            .ok_or(IAMFCodecError::SubblockDurationSum {
                duration,
                sum: sum.min(u64::from(u32::MAX)) as u32,
            })?;
        subblock_durations.push(last as u32);
        SubblockPartition::explicit(duration, subblock_durations)
    }
}

fn read_param_definition_body<R: BitRead>(
    reader: &mut R,
    variant_of: ParameterDefinitionType,
) -> IAMFCodecResult<ParamDefinition> {
    let parameter_id = read_uleb128(reader)?;
    let parameter_rate = read_uleb128(reader)?;
    let mode = reader.read_bit()?;
    let reserved = reader.read::<7, u8>()?;
    let partition = if mode {
        None
    } else {
        Some(SubblockPartition::read_from(reader)?)
    };
    let variant = match variant_of {
        ParameterDefinitionType::MixGain => ParamDefinitionVariant::MixGain,
        ParameterDefinitionType::Demixing => {
            let default_demixing_info = DemixingInfoParameterData::read_from(reader)?;
            let default_w = reader.read::<4, u8>()?;
            let _reserved = reader.read::<4, u8>()?;
            ParamDefinitionVariant::Demixing {
                default_demixing_info,
                default_w,
            }
        }
        ParameterDefinitionType::ReconGain => ParamDefinitionVariant::ReconGain {
            audio_element_id: read_uleb128(reader)?,
        },
        ParameterDefinitionType::Reserved(tag) => {
            // Handled by the caller; kept for exhaustiveness.
            return Err(IAMFCodecError::InvalidReservedDefinitionType(tag));
        }
    };
    Ok(ParamDefinition {
        parameter_id,
        parameter_rate,
        reserved,
        partition,
        variant,
    })
}

impl<R: BitRead> BitwiseReadRemainingFrom<ParameterDefinitionType, R> for ParamDefinition {
    type Error = IAMFCodecError;
    fn read_remaining_from(
        definition_type: ParameterDefinitionType,
        reader: &mut R,
    ) -> Result<Self, Self::Error> {
        if let ParameterDefinitionType::Reserved(tag) = definition_type {
            let size = read_uleb128(reader)?;
            let definition_bytes = Bytes::from(reader.read_to_vec(size as usize)?);
            return Ok(ParamDefinition {
                parameter_id: 0,
                parameter_rate: 0,
                reserved: 0,
                partition: None,
                variant: ParamDefinitionVariant::Reserved {
                    definition_type: tag,
                    definition_bytes,
                },
            });
        }
        read_param_definition_body(reader, definition_type)
    }
}
