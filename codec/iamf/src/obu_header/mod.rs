//! @see: IAMF v1.0, OBU Header — the frame around every Open Bitstream Unit.

use tokio_util::bytes::Bytes;

use crate::errors::IAMFCodecError;
use crate::leb128::DecodedUleb128;

pub mod reader;
pub mod writer;

/// 5 bit OBU type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObuType {
    CodecConfig,       // 0
    AudioElement,      // 1
    MixPresentation,   // 2
    ParameterBlock,    // 3
    TemporalDelimiter, // 4
    AudioFrame,        // 5
    /// 6..=23, carrying the substream index 0..=17.
    AudioFrameId(u8),
    Reserved(u8), // 24..=30
    SequenceHeader, // 31
}

impl From<ObuType> for u8 {
    fn from(value: ObuType) -> Self {
        match value {
            ObuType::CodecConfig => 0,
            ObuType::AudioElement => 1,
            ObuType::MixPresentation => 2,
            ObuType::ParameterBlock => 3,
            ObuType::TemporalDelimiter => 4,
            ObuType::AudioFrame => 5,
            ObuType::AudioFrameId(index) => 6 + index,
            ObuType::Reserved(value) => value,
            ObuType::SequenceHeader => 31,
        }
    }
}

impl TryFrom<u8> for ObuType {
    type Error = IAMFCodecError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ObuType::CodecConfig),
            1 => Ok(ObuType::AudioElement),
            2 => Ok(ObuType::MixPresentation),
            3 => Ok(ObuType::ParameterBlock),
            4 => Ok(ObuType::TemporalDelimiter),
            5 => Ok(ObuType::AudioFrame),
            6..=23 => Ok(ObuType::AudioFrameId(value - 6)),
            24..=30 => Ok(ObuType::Reserved(value)),
            31 => Ok(ObuType::SequenceHeader),
            _ => Err(IAMFCodecError::InvalidObuType(value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrimmingStatus {
    pub num_samples_to_trim_at_end: DecodedUleb128,
    pub num_samples_to_trim_at_start: DecodedUleb128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObuHeader {
    pub obu_type: ObuType,
    pub redundant_copy: bool, // 1 bit
    /// `Some` iff the trimming status flag is set.
    pub trimming_status: Option<TrimmingStatus>,
    /// `Some` iff the extension flag is set.
    pub extension_header: Option<Bytes>,
}

impl ObuHeader {
    pub fn new(obu_type: ObuType) -> Self {
        Self {
            obu_type,
            redundant_copy: false,
            trimming_status: None,
            extension_header: None,
        }
    }
}
