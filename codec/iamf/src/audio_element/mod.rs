//! @see: IAMF v1.0, Audio Element OBU — channel-based (scalable layers) and
//! scene-based (Ambisonics) audio elements.

use tokio_util::bytes::Bytes;

use crate::errors::{IAMFCodecError, IAMFCodecResult};
use crate::leb128::DecodedUleb128;
use crate::obu_header::ObuHeader;
use crate::param_definitions::ParamDefinition;

pub mod reader;
pub mod writer;

/// RFC 8486 reserves 255 to signal an inactive ambisonics channel number.
pub const INACTIVE_AMBISONICS_CHANNEL_NUMBER: u8 = 255;

const VALID_AMBISONICS_CHANNEL_COUNTS: [u8; 5] = [1, 4, 9, 16, 25];

/// Channel budget of a loudspeaker layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelNumbers {
    pub surround: u8,
    pub height: u8,
    pub lfe: u8,
}

impl ChannelNumbers {
    pub const fn new(surround: u8, height: u8, lfe: u8) -> Self {
        Self {
            surround,
            height,
            lfe,
        }
    }

    pub fn total(&self) -> u32 {
        u32::from(self.surround) + u32::from(self.height) + u32::from(self.lfe)
    }
}

/// 4 bit loudspeaker layout of one scalable channel layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoudspeakerLayout {
    Mono,          // 0
    Stereo,        // 1
    Layout5_1,     // 2
    Layout5_1_2,   // 3
    Layout5_1_4,   // 4
    Layout7_1,     // 5
    Layout7_1_2,   // 6
    Layout7_1_4,   // 7
    Layout3_1_2,   // 8
    Binaural,      // 9
    Reserved(u8),  // 10..=15
}

impl From<LoudspeakerLayout> for u8 {
    fn from(value: LoudspeakerLayout) -> Self {
        match value {
            LoudspeakerLayout::Mono => 0,
            LoudspeakerLayout::Stereo => 1,
            LoudspeakerLayout::Layout5_1 => 2,
            LoudspeakerLayout::Layout5_1_2 => 3,
            LoudspeakerLayout::Layout5_1_4 => 4,
            LoudspeakerLayout::Layout7_1 => 5,
            LoudspeakerLayout::Layout7_1_2 => 6,
            LoudspeakerLayout::Layout7_1_4 => 7,
            LoudspeakerLayout::Layout3_1_2 => 8,
            LoudspeakerLayout::Binaural => 9,
            LoudspeakerLayout::Reserved(value) => value,
        }
    }
}

impl From<u8> for LoudspeakerLayout {
    fn from(value: u8) -> Self {
        match value & 0x0f {
            0 => LoudspeakerLayout::Mono,
            1 => LoudspeakerLayout::Stereo,
            2 => LoudspeakerLayout::Layout5_1,
            3 => LoudspeakerLayout::Layout5_1_2,
            4 => LoudspeakerLayout::Layout5_1_4,
            5 => LoudspeakerLayout::Layout7_1,
            6 => LoudspeakerLayout::Layout7_1_2,
            7 => LoudspeakerLayout::Layout7_1_4,
            8 => LoudspeakerLayout::Layout3_1_2,
            9 => LoudspeakerLayout::Binaural,
            value => LoudspeakerLayout::Reserved(value),
        }
    }
}

impl LoudspeakerLayout {
    /// `(surround, height, lfe)` budget; `None` for reserved layouts.
    pub fn channel_numbers(&self) -> Option<ChannelNumbers> {
        match self {
            Self::Mono => Some(ChannelNumbers::new(1, 0, 0)),
            Self::Stereo => Some(ChannelNumbers::new(2, 0, 0)),
            Self::Layout5_1 => Some(ChannelNumbers::new(5, 0, 1)),
            Self::Layout5_1_2 => Some(ChannelNumbers::new(5, 2, 1)),
            Self::Layout5_1_4 => Some(ChannelNumbers::new(5, 4, 1)),
            Self::Layout7_1 => Some(ChannelNumbers::new(7, 0, 1)),
            Self::Layout7_1_2 => Some(ChannelNumbers::new(7, 2, 1)),
            Self::Layout7_1_4 => Some(ChannelNumbers::new(7, 4, 1)),
            Self::Layout3_1_2 => Some(ChannelNumbers::new(3, 2, 1)),
            Self::Binaural => Some(ChannelNumbers::new(2, 0, 0)),
            Self::Reserved(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputGain {
    pub output_gain_flag: u8, // 6 bits
    pub reserved: u8,         // 2 bits
    pub output_gain: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelAudioLayerConfig {
    pub loudspeaker_layout: LoudspeakerLayout, // 4 bits
    pub recon_gain_is_present: bool,           // 1 bit
    pub reserved: u8,                          // 2 bits
    pub substream_count: u8,
    pub coupled_substream_count: u8,
    /// `Some` iff the output gain flag is set.
    pub output_gain: Option<OutputGain>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalableChannelLayoutConfig {
    pub reserved: u8, // 5 bits
    pub channel_audio_layer_configs: Vec<ChannelAudioLayerConfig>,
}

impl ScalableChannelLayoutConfig {
    /// Layers are ordered low to high; every layer must cover strictly more
    /// channels than the layers below it, without shrinking any of the
    /// surround, height or LFE budgets.
    pub fn new(
        channel_audio_layer_configs: Vec<ChannelAudioLayerConfig>,
    ) -> IAMFCodecResult<Self> {
        let config = Self {
            reserved: 0,
            channel_audio_layer_configs,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> IAMFCodecResult<()> {
        let num_layers = self.channel_audio_layer_configs.len();
        if num_layers == 0 || num_layers > 6 {
            return Err(IAMFCodecError::InvalidNumLayers(num_layers));
        }
        let mut accumulated = ChannelNumbers::default();
        for (layer, layer_config) in self.channel_audio_layer_configs.iter().enumerate() {
            let channels = layer_config
                .loudspeaker_layout
                .channel_numbers()
                .ok_or_else(|| {
                    IAMFCodecError::ReservedLoudspeakerLayout(
                        layer_config.loudspeaker_layout.into(),
                    )
                })?;
            if channels.surround < accumulated.surround
                || channels.height < accumulated.height
                || channels.lfe < accumulated.lfe
                || channels.total() <= accumulated.total()
            {
                return Err(IAMFCodecError::InvalidLayerOrdering { layer });
            }
            accumulated = channels;
        }
        Ok(())
    }

    pub fn num_layers(&self) -> u8 {
        self.channel_audio_layer_configs.len() as u8
    }

    /// Absolute channel budget of every layer, low to high.
    pub fn channel_numbers_for_layers(&self) -> IAMFCodecResult<Vec<ChannelNumbers>> {
        self.channel_audio_layer_configs
            .iter()
            .map(|layer_config| {
                layer_config
                    .loudspeaker_layout
                    .channel_numbers()
                    .ok_or_else(|| {
                        IAMFCodecError::ReservedLoudspeakerLayout(
                            layer_config.loudspeaker_layout.into(),
                        )
                    })
            })
            .collect()
    }

    fn substream_count(&self) -> u32 {
        self.channel_audio_layer_configs
            .iter()
            .map(|layer| u32::from(layer.substream_count))
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbisonicsMonoConfig {
    pub output_channel_count: u8, // (C)
    pub substream_count: u8,      // (N)
    /// Length (C); each entry is an ACN in [0, N) or the inactive sentinel.
    pub channel_mapping: Vec<u8>,
}

impl AmbisonicsMonoConfig {
    pub fn validate(&self, num_substreams_in_audio_element: DecodedUleb128) -> IAMFCodecResult<()> {
        validate_ambisonics_channel_count(self.output_channel_count)?;
        if u32::from(self.substream_count) != num_substreams_in_audio_element {
            return Err(IAMFCodecError::SubstreamCountMismatch {
                expected: u32::from(self.substream_count),
                got: num_substreams_in_audio_element,
            });
        }
        if self.channel_mapping.len() != usize::from(self.output_channel_count) {
            return Err(IAMFCodecError::AmbisonicsMappingLength {
                expected: usize::from(self.output_channel_count),
                got: self.channel_mapping.len(),
            });
        }
        let mut seen = [false; 256];
        let mut mapped = 0_usize;
        for entry in &self.channel_mapping {
            if *entry == INACTIVE_AMBISONICS_CHANNEL_NUMBER {
                continue;
            }
            if *entry >= self.substream_count {
                return Err(IAMFCodecError::AmbisonicsMappingEntry {
                    entry: *entry,
                    substream_count: self.substream_count,
                });
            }
            if !seen[usize::from(*entry)] {
                seen[usize::from(*entry)] = true;
                mapped += 1;
            }
        }
        if mapped != usize::from(self.substream_count) {
            return Err(IAMFCodecError::AmbisonicsSubstreamMapping {
                substream_count: self.substream_count,
                mapped,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbisonicsProjectionConfig {
    pub output_channel_count: u8,     // (C)
    pub substream_count: u8,          // (N)
    pub coupled_substream_count: u8,  // (M)
    /// Row-major, (N + M) rows of (C) columns.
    pub demixing_matrix: Vec<i16>,
}

impl AmbisonicsProjectionConfig {
    pub fn validate(&self, num_substreams_in_audio_element: DecodedUleb128) -> IAMFCodecResult<()> {
        validate_ambisonics_channel_count(self.output_channel_count)?;
        if u32::from(self.substream_count) != num_substreams_in_audio_element {
            return Err(IAMFCodecError::SubstreamCountMismatch {
                expected: u32::from(self.substream_count),
                got: num_substreams_in_audio_element,
            });
        }
        if self.coupled_substream_count > self.substream_count {
            return Err(IAMFCodecError::AmbisonicsCoupledCount {
                substream_count: self.substream_count,
                coupled: self.coupled_substream_count,
            });
        }
        let expected = (usize::from(self.substream_count)
            + usize::from(self.coupled_substream_count))
            * usize::from(self.output_channel_count);
        if self.demixing_matrix.len() != expected {
            return Err(IAMFCodecError::AmbisonicsMatrixSize {
                expected,
                got: self.demixing_matrix.len(),
            });
        }
        Ok(())
    }
}

fn validate_ambisonics_channel_count(output_channel_count: u8) -> IAMFCodecResult<()> {
    if VALID_AMBISONICS_CHANNEL_COUNTS.contains(&output_channel_count) {
        Ok(())
    } else {
        Err(IAMFCodecError::InvalidAmbisonicsChannelCount(
            output_channel_count,
        ))
    }
}

/// The active variant is serialized through a ULEB128 `ambisonics_mode`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmbisonicsConfig {
    Mono(AmbisonicsMonoConfig),
    Projection(AmbisonicsProjectionConfig),
}

impl AmbisonicsConfig {
    pub fn ambisonics_mode(&self) -> DecodedUleb128 {
        match self {
            Self::Mono(_) => 0,
            Self::Projection(_) => 1,
        }
    }

    /// Smallest valid ambisonics channel count covering `requested`.
    pub fn next_valid_output_channel_count(requested: u8) -> IAMFCodecResult<u8> {
        VALID_AMBISONICS_CHANNEL_COUNTS
            .into_iter()
            .find(|count| *count >= requested)
            .ok_or(IAMFCodecError::AmbisonicsChannelCountTooLarge(requested))
    }

    pub fn validate(&self, num_substreams_in_audio_element: DecodedUleb128) -> IAMFCodecResult<()> {
        match self {
            Self::Mono(config) => config.validate(num_substreams_in_audio_element),
            Self::Projection(config) => config.validate(num_substreams_in_audio_element),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionConfig {
    pub config_bytes: Bytes,
}

/// The active variant determines the serialized 3 bit audio element type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioElementConfig {
    Scalable(ScalableChannelLayoutConfig),
    Ambisonics(AmbisonicsConfig),
    Extension {
        /// A reserved type tag in [2, 7].
        audio_element_type: u8,
        config: ExtensionConfig,
    },
}

impl AudioElementConfig {
    pub fn audio_element_type(&self) -> u8 {
        match self {
            Self::Scalable(_) => 0,
            Self::Ambisonics(_) => 1,
            Self::Extension {
                audio_element_type, ..
            } => *audio_element_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioElementObu {
    pub header: ObuHeader,
    pub audio_element_id: DecodedUleb128,
    pub reserved: u8, // 5 bits
    pub codec_config_id: DecodedUleb128,
    pub audio_substream_ids: Vec<DecodedUleb128>,
    /// Parameters attached to this element; the type tag on the wire is
    /// derived from each definition's variant.
    pub audio_element_params: Vec<ParamDefinition>,
    pub config: AudioElementConfig,
}

impl AudioElementObu {
    pub fn new(
        header: ObuHeader,
        audio_element_id: DecodedUleb128,
        codec_config_id: DecodedUleb128,
        audio_substream_ids: Vec<DecodedUleb128>,
        audio_element_params: Vec<ParamDefinition>,
        config: AudioElementConfig,
    ) -> IAMFCodecResult<Self> {
        let obu = Self {
            header,
            audio_element_id,
            reserved: 0,
            codec_config_id,
            audio_substream_ids,
            audio_element_params,
            config,
        };
        obu.validate()?;
        Ok(obu)
    }

    /// The number of substreams must match what the config requires: the sum
    /// of per-layer counts for scalable elements, (N) for ambisonics.
    pub fn validate(&self) -> IAMFCodecResult<()> {
        let num_substreams = self.audio_substream_ids.len() as u32;
        match &self.config {
            AudioElementConfig::Scalable(config) => {
                config.validate()?;
                let expected = config.substream_count();
                if expected != num_substreams {
                    return Err(IAMFCodecError::SubstreamCountMismatch {
                        expected,
                        got: num_substreams,
                    });
                }
                Ok(())
            }
            AudioElementConfig::Ambisonics(config) => config.validate(num_substreams),
            AudioElementConfig::Extension { .. } => Ok(()),
        }
    }

    pub fn num_substreams(&self) -> DecodedUleb128 {
        self.audio_substream_ids.len() as u32
    }

    pub fn num_parameters(&self) -> DecodedUleb128 {
        self.audio_element_params.len() as u32
    }
}
