use codec_iamf::errors::{ErrorKind, IAMFCodecError};
use codec_iamf::leb128::DecodedUleb128;
use thiserror::Error;

/// One recon gain position where the computed value disagrees with the
/// user supplied one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconGainDelta {
    pub bit_position: u8,
    pub computed: u8,
    pub user: u8,
}

#[derive(Debug, Error)]
pub enum AuthoringError {
    #[error("codec error: {0}")]
    Codec(#[from] IAMFCodecError),
    #[error("generator used before initialize")]
    NotInitialized,
    #[error("ia sequence header obu is not present")]
    MissingSequenceHeader,
    #[error("stray parameter block with id {0} has no param definition")]
    StrayParameterBlock(DecodedUleb128),
    #[error("unsupported parameter type {definition_type} for id {parameter_id}")]
    UnsupportedParameterType {
        parameter_id: DecodedUleb128,
        definition_type: u32,
    },
    #[error(
        "audio element {audio_element_id} referenced by recon gain parameter {parameter_id} not found"
    )]
    DanglingAudioElement {
        parameter_id: DecodedUleb128,
        audio_element_id: DecodedUleb128,
    },
    #[error("audio element {0} referenced by a recon gain parameter is not channel based")]
    NotScalable(DecodedUleb128),
    #[error("mix presentation references parameter id {0} missing from the definitions")]
    MissingMixGainDefinition(DecodedUleb128),
    #[error("conflicting definitions collected for parameter id {0}")]
    DuplicateParamDefinition(DecodedUleb128),
    #[error("param definition type {definition_type} not allowed in an audio element")]
    ParamTypeNotAllowedInAudioElement { definition_type: u32 },
    #[error(
        "parameter id {parameter_id} claimed start {claimed}, expected {expected}"
    )]
    TimingGap {
        parameter_id: DecodedUleb128,
        expected: i32,
        claimed: i32,
    },
    #[error("timestamps for parameter id {parameter_id} overflow at start {start} + {duration}")]
    TimestampOverflow {
        parameter_id: DecodedUleb128,
        start: i32,
        duration: u32,
    },
    #[error("parameter id {0} is in a failed timing state")]
    TimingFatal(DecodedUleb128),
    #[error("expected {expected} metadata subblocks, got {got}")]
    SubblockCountMismatch { expected: u32, got: u32 },
    #[error("{definition_type} blocks must carry exactly one subblock, got {got}")]
    SingleSubblockRequired { definition_type: u32, got: u32 },
    #[error("subblock payload does not match parameter definition type {definition_type}")]
    PayloadTypeMismatch { definition_type: u32 },
    #[error("mix gain value {0} out of the int16 range")]
    MixGainOutOfRange(i32),
    #[error("control point relative time {0} out of the uint8 range")]
    ControlPointTimeOutOfRange(u32),
    #[error("recon gain value {0} out of the uint8 range")]
    ReconGainOutOfRange(u32),
    #[error("recon gain bit position {0} out of the 12 bit mask")]
    ReconGainBitPosition(u32),
    #[error("user specified {got} recon gain layers, audio element has {expected}")]
    ReconGainLayerCount { expected: u8, got: usize },
    #[error(
        "layer {layer}: user marked recon gain present = {user_present}, demixed channels disagree"
    )]
    ReconGainPresenceMismatch { layer: usize, user_present: bool },
    #[error(
        "layer {layer}: computed recon gain flag {computed:#x} differs from user {user:#x} at bits {differing_bits:?}"
    )]
    ReconGainFlagMismatch {
        layer: usize,
        computed: u32,
        user: u32,
        differing_bits: Vec<u8>,
    },
    #[error("layer {layer}: computed recon gains differ from user values: {deltas:?}")]
    ReconGainValueMismatch {
        layer: usize,
        deltas: Vec<ReconGainDelta>,
    },
    #[error("no samples for audio element {audio_element_id} at {timestamp} labeled {label}")]
    MissingSamples {
        audio_element_id: DecodedUleb128,
        timestamp: i32,
        label: String,
    },
    #[error("unsupported number of surround channels: {0}")]
    UnsupportedSurround(u8),
    #[error("internal invariant violated: {0}")]
    Internal(&'static str),
}

impl AuthoringError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Codec(err) => err.kind(),
            Self::NotInitialized => ErrorKind::FailedPrecondition,
            Self::Internal(_) => ErrorKind::Unknown,
            _ => ErrorKind::InvalidArgument,
        }
    }
}

pub type AuthoringResult<T> = Result<T, AuthoringError>;
