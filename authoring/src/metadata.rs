//! User supplied descriptions of the parameter blocks to author, one record
//! per block per temporal unit.

use std::collections::BTreeMap;

use codec_iamf::leb128::DecodedUleb128;
use codec_iamf::parameter_data::{DMixPMode, DemixingInfoParameterData};

/// Mix gain control points, in the wide integer domain of the user config.
/// Values are range checked into int16 / uint8 when the OBU is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixGainMetadata {
    Step {
        start_point_value: i32,
    },
    Linear {
        start_point_value: i32,
        end_point_value: i32,
    },
    Bezier {
        start_point_value: i32,
        end_point_value: i32,
        control_point_value: i32,
        control_point_relative_time: u32,
    },
}

/// One scalable layer's user declared recon gains: bit position to gain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReconGainLayerMetadata {
    pub recon_gain: BTreeMap<u32, u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReconGainMetadata {
    /// One entry per layer of the audio element, low to high.
    pub recon_gains_for_layer: Vec<ReconGainLayerMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterPayloadMetadata {
    MixGain(MixGainMetadata),
    Demixing(DemixingInfoParameterData),
    ReconGain(ReconGainMetadata),
}

impl ParameterPayloadMetadata {
    pub fn demixing(dmixp_mode: DMixPMode) -> Self {
        Self::Demixing(DemixingInfoParameterData {
            dmixp_mode,
            reserved: 0,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSubblockMetadata {
    /// Only meaningful with mode 1 and a constant subblock duration of 0.
    pub subblock_duration: u32,
    pub payload: ParameterPayloadMetadata,
}

/// Metadata for one parameter block. The timing fields apply only when the
/// param definition has mode 1; with mode 0 the definition fixes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterBlockMetadata {
    pub parameter_id: DecodedUleb128,
    pub start_timestamp: i32,
    pub duration: u32,
    pub constant_subblock_duration: u32,
    pub num_subblocks: u32,
    pub subblocks: Vec<ParameterSubblockMetadata>,
}
