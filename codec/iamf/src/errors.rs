use std::io;

use thiserror::Error;

/// Failure category surfaced at every call boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    Unknown,
    ResourceExhausted,
    FailedPrecondition,
}

#[derive(Debug, Error)]
pub enum IAMFCodecError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid obu type: {0}")]
    InvalidObuType(u8),
    #[error("obu payload of {0} bytes does not fit a uleb128 size field")]
    ObuPayloadTooLarge(usize),
    #[error("obu size {0} smaller than its header fields")]
    ObuSizeTooSmall(u32),
    #[error("invalid ia code: {0:#010x}")]
    InvalidIaCode(u32),
    #[error("unknown codec id: {0:#010x}")]
    UnknownCodecId(u32),
    #[error("unknown animation type: {0}")]
    UnknownAnimationType(u32),
    #[error("unknown dmixp mode: {0}")]
    UnknownDMixPMode(u8),
    #[error("unknown ambisonics mode: {0}")]
    UnknownAmbisonicsMode(u32),
    #[error("unknown layout type: {0}")]
    UnknownLayoutType(u8),
    #[error("constant subblock duration of zero in a constant partition")]
    ZeroConstantSubblockDuration,
    #[error("explicit partition with no subblock durations")]
    EmptySubblockDurations,
    #[error("subblock durations sum to {sum}, expected duration {duration}")]
    SubblockDurationSum { duration: u32, sum: u32 },
    #[error("expected {expected} subblocks, got {got}")]
    SubblockCountMismatch { expected: u32, got: u32 },
    #[error("missing subblock partition for parameter id {0}")]
    MissingSubblockPartition(u32),
    #[error("parameter block timing fields do not match param definition mode {mode}")]
    PartitionModeMismatch { mode: u8 },
    #[error("subblock payload does not match the parameter definition type")]
    SubblockTypeMismatch,
    #[error("parameter block id {got} does not match definition id {expected}")]
    ParameterIdMismatch { expected: u32, got: u32 },
    #[error("num_layers must be in [1, 6], got {0}")]
    InvalidNumLayers(usize),
    #[error("layer {layer} does not extend the accumulated channel layout")]
    InvalidLayerOrdering { layer: usize },
    #[error("reserved loudspeaker layout: {0}")]
    ReservedLoudspeakerLayout(u8),
    #[error("ambisonics output channel count {0} is not a supported square")]
    InvalidAmbisonicsChannelCount(u8),
    #[error("requested ambisonics channel count too large: {0}")]
    AmbisonicsChannelCountTooLarge(u8),
    #[error("ambisonics channel mapping length {got}, expected {expected}")]
    AmbisonicsMappingLength { expected: usize, got: usize },
    #[error("ambisonics channel mapping entry {entry} out of range for {substream_count} substreams")]
    AmbisonicsMappingEntry { entry: u8, substream_count: u8 },
    #[error("ambisonics substream count {substream_count} does not match {mapped} mapped channels")]
    AmbisonicsSubstreamMapping { substream_count: u8, mapped: usize },
    #[error("ambisonics coupled substream count {coupled} exceeds substream count {substream_count}")]
    AmbisonicsCoupledCount { substream_count: u8, coupled: u8 },
    #[error("demixing matrix has {got} entries, expected {expected}")]
    AmbisonicsMatrixSize { expected: usize, got: usize },
    #[error("audio element has {got} substreams, config requires {expected}")]
    SubstreamCountMismatch { expected: u32, got: u32 },
    #[error("recon gain bit position {0} out of the 12 bit mask")]
    ReconGainBitPosition(u32),
    #[error("recon gain flag {flag:#x} inconsistent with values at bit {bit}")]
    ReconGainFlagInconsistent { flag: u32, bit: u8 },
    #[error("string of {0} bytes exceeds the 128 byte limit")]
    StringTooLong(usize),
    #[error("invalid utf-8 in a serialized string")]
    InvalidString,
    #[error("expected {expected} localized annotations, got {got}")]
    AnnotationCountMismatch { expected: usize, got: usize },
    #[error("param definition for id {0} is not a mix gain definition")]
    NotAMixGainDefinition(u32),
    #[error("loudness fields inconsistent with info_type {info_type:#04x}")]
    LoudnessInfoTypeMismatch { info_type: u8 },
    #[error("reserved param definition type {0} collides with a known type")]
    InvalidReservedDefinitionType(u32),
}

impl IAMFCodecError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(err) => match err.kind() {
                io::ErrorKind::WriteZero => ErrorKind::ResourceExhausted,
                io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData => {
                    ErrorKind::InvalidArgument
                }
                _ => ErrorKind::Unknown,
            },
            _ => ErrorKind::InvalidArgument,
        }
    }
}

pub type IAMFCodecResult<T> = Result<T, IAMFCodecError>;
