//! @see: IAMF v1.0, Codec Config OBU.

use tokio_util::bytes::Bytes;

use crate::errors::IAMFCodecError;
use crate::leb128::DecodedUleb128;
use crate::obu_header::{ObuHeader, ObuType};

pub mod reader;
pub mod writer;

/// 32 bit four-character codec identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecId {
    Opus,
    Mp4a,
    Flac,
    Ipcm,
}

impl From<CodecId> for u32 {
    fn from(value: CodecId) -> Self {
        match value {
            CodecId::Opus => u32::from_be_bytes(*b"Opus"),
            CodecId::Mp4a => u32::from_be_bytes(*b"mp4a"),
            CodecId::Flac => u32::from_be_bytes(*b"fLaC"),
            CodecId::Ipcm => u32::from_be_bytes(*b"ipcm"),
        }
    }
}

impl TryFrom<u32> for CodecId {
    type Error = IAMFCodecError;
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match &value.to_be_bytes() {
            b"Opus" => Ok(CodecId::Opus),
            b"mp4a" => Ok(CodecId::Mp4a),
            b"fLaC" => Ok(CodecId::Flac),
            b"ipcm" => Ok(CodecId::Ipcm),
            _ => Err(IAMFCodecError::UnknownCodecId(value)),
        }
    }
}

/// Codec-specific decoder configuration. LPCM and Opus are fixed layouts;
/// FLAC and AAC configs pass through as raw bytes for their external
/// encoder adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoderConfig {
    Lpcm {
        sample_format_flags: u8,
        sample_size: u8,
        sample_rate: u32,
    },
    Opus {
        version: u8,
        output_channel_count: u8,
        pre_skip: u16,
        input_sample_rate: u32,
        output_gain: i16,
        mapping_family: u8,
    },
    Flac(Bytes),
    Aac(Bytes),
}

impl DecoderConfig {
    pub fn codec_id(&self) -> CodecId {
        match self {
            Self::Lpcm { .. } => CodecId::Ipcm,
            Self::Opus { .. } => CodecId::Opus,
            Self::Flac(_) => CodecId::Flac,
            Self::Aac(_) => CodecId::Mp4a,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfigObu {
    pub header: ObuHeader,
    pub codec_config_id: DecodedUleb128,
    pub num_samples_per_frame: DecodedUleb128,
    pub audio_roll_distance: i16,
    pub decoder_config: DecoderConfig,
}

impl CodecConfigObu {
    pub fn new(
        codec_config_id: DecodedUleb128,
        num_samples_per_frame: DecodedUleb128,
        audio_roll_distance: i16,
        decoder_config: DecoderConfig,
    ) -> Self {
        Self {
            header: ObuHeader::new(ObuType::CodecConfig),
            codec_config_id,
            num_samples_per_frame,
            audio_roll_distance,
            decoder_config,
        }
    }
}
