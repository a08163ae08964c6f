//! @see: IAMF v1.0, Parameter Definitions — the per-parameter-id timing and
//! payload contracts referenced by audio elements and mix presentations.

use tokio_util::bytes::Bytes;

use crate::errors::{IAMFCodecError, IAMFCodecResult};
use crate::leb128::DecodedUleb128;
use crate::parameter_data::DemixingInfoParameterData;

pub mod reader;
pub mod writer;
#[cfg(test)]
mod param_definitions_test;

/// Serialized as a ULEB128 tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterDefinitionType {
    MixGain,
    Demixing,
    ReconGain,
    Reserved(DecodedUleb128),
}

impl From<ParameterDefinitionType> for u32 {
    fn from(value: ParameterDefinitionType) -> Self {
        match value {
            ParameterDefinitionType::MixGain => 0,
            ParameterDefinitionType::Demixing => 1,
            ParameterDefinitionType::ReconGain => 2,
            ParameterDefinitionType::Reserved(tag) => tag,
        }
    }
}

impl From<u32> for ParameterDefinitionType {
    fn from(value: u32) -> Self {
        match value {
            0 => ParameterDefinitionType::MixGain,
            1 => ParameterDefinitionType::Demixing,
            2 => ParameterDefinitionType::ReconGain,
            tag => ParameterDefinitionType::Reserved(tag),
        }
    }
}

/// Division of a duration into subblocks.
///
/// Either a constant subblock duration whose last subblock absorbs the
/// remainder, or an explicit per-subblock list summing to the duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubblockPartition {
    duration: DecodedUleb128,
    constant_subblock_duration: DecodedUleb128,
    subblock_durations: Vec<DecodedUleb128>,
}

impl SubblockPartition {
    pub fn constant(
        duration: DecodedUleb128,
        constant_subblock_duration: DecodedUleb128,
    ) -> IAMFCodecResult<Self> {
        if constant_subblock_duration == 0 {
            return Err(IAMFCodecError::ZeroConstantSubblockDuration);
        }
        Ok(Self {
            duration,
            constant_subblock_duration,
            subblock_durations: Vec::new(),
        })
    }

    pub fn explicit(
        duration: DecodedUleb128,
        subblock_durations: Vec<DecodedUleb128>,
    ) -> IAMFCodecResult<Self> {
        if subblock_durations.is_empty() {
            return Err(IAMFCodecError::EmptySubblockDurations);
        }
        let sum: u64 = subblock_durations.iter().map(|d| u64::from(*d)).sum();
        if sum != u64::from(duration) {
            return Err(IAMFCodecError::SubblockDurationSum {
                duration,
                sum: sum.min(u64::from(u32::MAX)) as u32,
            });
        }
        Ok(Self {
            duration,
            constant_subblock_duration: 0,
            subblock_durations,
        })
    }

    pub fn duration(&self) -> DecodedUleb128 {
        self.duration
    }

    pub fn constant_subblock_duration(&self) -> DecodedUleb128 {
        self.constant_subblock_duration
    }

    pub fn num_subblocks(&self) -> DecodedUleb128 {
        if self.constant_subblock_duration != 0 {
            self.duration.div_ceil(self.constant_subblock_duration)
        } else {
            self.subblock_durations.len() as u32
        }
    }

    pub fn subblock_duration(&self, index: u32) -> Option<DecodedUleb128> {
        let num_subblocks = self.num_subblocks();
        if index >= num_subblocks {
            return None;
        }
        if self.constant_subblock_duration == 0 {
            return self.subblock_durations.get(index as usize).copied();
        }
        if index + 1 == num_subblocks {
            // The last subblock absorbs the remainder.
            Some(self.duration - self.constant_subblock_duration * (num_subblocks - 1))
        } else {
            Some(self.constant_subblock_duration)
        }
    }

    pub fn subblock_durations(&self) -> &[DecodedUleb128] {
        &self.subblock_durations
    }
}

/// The subtype-specific tail of a param definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamDefinitionVariant {
    MixGain,
    Demixing {
        default_demixing_info: DemixingInfoParameterData,
        default_w: u8, // 4 bits
    },
    ReconGain {
        audio_element_id: DecodedUleb128,
    },
    /// Opaque body, serialized as a ULEB128 length and raw bytes in place of
    /// the common fields. The tag must be outside the known range.
    Reserved {
        definition_type: DecodedUleb128,
        definition_bytes: Bytes,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDefinition {
    pub parameter_id: DecodedUleb128,
    pub parameter_rate: DecodedUleb128,
    pub reserved: u8, // 7 bits
    /// `Some` iff `param_definition_mode == 0`: the definition fixes the
    /// timing of every parameter block. With mode 1 each block carries its
    /// own partition instead.
    pub partition: Option<SubblockPartition>,
    pub variant: ParamDefinitionVariant,
}

impl ParamDefinition {
    pub fn definition_type(&self) -> ParameterDefinitionType {
        match &self.variant {
            ParamDefinitionVariant::MixGain => ParameterDefinitionType::MixGain,
            ParamDefinitionVariant::Demixing { .. } => ParameterDefinitionType::Demixing,
            ParamDefinitionVariant::ReconGain { .. } => ParameterDefinitionType::ReconGain,
            ParamDefinitionVariant::Reserved {
                definition_type, ..
            } => ParameterDefinitionType::Reserved(*definition_type),
        }
    }

    pub fn param_definition_mode(&self) -> u8 {
        if self.partition.is_some() { 0 } else { 1 }
    }
}
