//! @see: IAMF v1.0, Parameter Block OBU.

use crate::audio_element::ChannelNumbers;
use crate::errors::{IAMFCodecError, IAMFCodecResult};
use crate::leb128::DecodedUleb128;
use crate::obu_header::ObuHeader;
use crate::param_definitions::{ParamDefinition, ParameterDefinitionType, SubblockPartition};
use crate::parameter_data::{
    DemixingInfoParameterData, MixGainParameterData, ReconGainInfoParameterData,
};

pub mod reader;
pub mod writer;

/// Typed subblock payload; the active arm is fixed by the associated param
/// definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterSubblock {
    MixGain(MixGainParameterData),
    Demixing(DemixingInfoParameterData),
    ReconGain(ReconGainInfoParameterData),
}

impl ParameterSubblock {
    pub fn definition_type(&self) -> ParameterDefinitionType {
        match self {
            Self::MixGain(_) => ParameterDefinitionType::MixGain,
            Self::Demixing(_) => ParameterDefinitionType::Demixing,
            Self::ReconGain(_) => ParameterDefinitionType::ReconGain,
        }
    }
}

/// Everything a serializer or generator needs to know about one parameter
/// id: the resolved definition and, for recon gain, the shape of the owning
/// scalable audio element.
#[derive(Debug, Clone, PartialEq)]
pub struct PerIdParameterMetadata {
    pub param_definition: ParamDefinition,
    pub param_definition_type: ParameterDefinitionType,
    pub audio_element_id: DecodedUleb128,
    pub num_layers: u8,
    pub recon_gain_is_present_flags: Vec<bool>,
    pub channel_numbers_for_layers: Vec<ChannelNumbers>,
}

impl PerIdParameterMetadata {
    pub fn new(param_definition: ParamDefinition) -> Self {
        let param_definition_type = param_definition.definition_type();
        Self {
            param_definition,
            param_definition_type,
            audio_element_id: 0,
            num_layers: 0,
            recon_gain_is_present_flags: Vec::new(),
            channel_numbers_for_layers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterBlockObu {
    pub header: ObuHeader,
    pub parameter_id: DecodedUleb128,
    /// `Some` iff the associated param definition has mode 1: the block
    /// carries its own timing. With mode 0 the definition's partition
    /// applies.
    pub partition: Option<SubblockPartition>,
    pub subblocks: Vec<ParameterSubblock>,
}

impl ParameterBlockObu {
    /// The partition governing this block: its own, or the definition's.
    pub fn partition_with<'a>(
        &'a self,
        metadata: &'a PerIdParameterMetadata,
    ) -> IAMFCodecResult<&'a SubblockPartition> {
        if let Some(partition) = &self.partition {
            return Ok(partition);
        }
        metadata
            .param_definition
            .partition
            .as_ref()
            .ok_or(IAMFCodecError::MissingSubblockPartition(self.parameter_id))
    }

    pub fn duration(&self, metadata: &PerIdParameterMetadata) -> IAMFCodecResult<DecodedUleb128> {
        Ok(self.partition_with(metadata)?.duration())
    }

    pub fn validate(&self, metadata: &PerIdParameterMetadata) -> IAMFCodecResult<()> {
        if self.parameter_id != metadata.param_definition.parameter_id {
            return Err(IAMFCodecError::ParameterIdMismatch {
                expected: metadata.param_definition.parameter_id,
                got: self.parameter_id,
            });
        }
        let mode = metadata.param_definition.param_definition_mode();
        if self.partition.is_some() != (mode == 1) {
            return Err(IAMFCodecError::PartitionModeMismatch { mode });
        }
        let num_subblocks = self.partition_with(metadata)?.num_subblocks();
        if num_subblocks != self.subblocks.len() as u32 {
            return Err(IAMFCodecError::SubblockCountMismatch {
                expected: num_subblocks,
                got: self.subblocks.len() as u32,
            });
        }
        for subblock in &self.subblocks {
            if subblock.definition_type() != metadata.param_definition_type {
                return Err(IAMFCodecError::SubblockTypeMismatch);
            }
        }
        Ok(())
    }
}
