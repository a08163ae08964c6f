//! The per-temporal-unit parameter block pipeline.
//!
//! Use pattern, once per temporal unit alongside audio frame generation:
//!
//!   - add the metadata of every parameter block starting at the current
//!     timestamp ([`ParameterBlockGenerator::add_metadata`]);
//!   - generate demixing and mix gain blocks;
//!   - after the host has encoded, decoded and demixed the unit's audio
//!     frames, generate recon gain blocks from the two sample maps.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::mem;

use codec_iamf::audio_element::{AudioElementConfig, AudioElementObu, ChannelNumbers};
use codec_iamf::ia_sequence_header::{IASequenceHeaderObu, ProfileVersion};
use codec_iamf::leb128::DecodedUleb128;
use codec_iamf::mix_presentation::MixPresentationObu;
use codec_iamf::obu_header::{ObuHeader, ObuType};
use codec_iamf::param_definitions::{
    ParamDefinition, ParamDefinitionVariant, ParameterDefinitionType, SubblockPartition,
};
use codec_iamf::parameter_block::{ParameterBlockObu, ParameterSubblock, PerIdParameterMetadata};
use codec_iamf::parameter_data::{
    MixGainParameterData, RECON_GAIN_MASK_BITS, ReconGainElement, ReconGainInfoParameterData,
};

use crate::demix::{IdTimeLabeledFrameMap, demixed_label_bit_position, find_demixed_channels};
use crate::errors::{AuthoringError, AuthoringResult, ReconGainDelta};
use crate::metadata::{
    MixGainMetadata, ParameterBlockMetadata, ParameterPayloadMetadata, ReconGainMetadata,
};
use crate::recon_gain::{ReconGainGenerator, scaled_recon_gain};
use crate::timing::GlobalTimingModule;

#[cfg(test)]
mod generator_test;

/// An audio element OBU together with the per-layer channel budgets the
/// recon gain pipeline needs.
#[derive(Debug, Clone)]
pub struct AudioElementWithData {
    pub obu: AudioElementObu,
    pub channel_numbers_for_layers: Vec<ChannelNumbers>,
}

impl AudioElementWithData {
    pub fn new(obu: AudioElementObu) -> AuthoringResult<Self> {
        let channel_numbers_for_layers = match &obu.config {
            AudioElementConfig::Scalable(config) => config.channel_numbers_for_layers()?,
            _ => Vec::new(),
        };
        Ok(Self {
            obu,
            channel_numbers_for_layers,
        })
    }
}

/// A generated parameter block and the `[start, end)` interval it covers.
#[derive(Debug, Clone)]
pub struct ParameterBlockWithData {
    pub obu: ParameterBlockObu,
    pub start_timestamp: i32,
    pub end_timestamp: i32,
}

/// Aggregates the param definitions of a whole sequence: demixing and recon
/// gain definitions from the audio elements, mix gain definitions from the
/// mix presentations. Duplicated parameter ids must agree.
pub fn collect_param_definitions(
    audio_elements: &HashMap<DecodedUleb128, AudioElementWithData>,
    mix_presentation_obus: &[MixPresentationObu],
) -> AuthoringResult<HashMap<DecodedUleb128, ParamDefinition>> {
    let mut param_definitions = HashMap::new();
    for audio_element in audio_elements.values() {
        for definition in &audio_element.obu.audio_element_params {
            match definition.definition_type() {
                ParameterDefinitionType::Demixing | ParameterDefinitionType::ReconGain => {
                    insert_definition(&mut param_definitions, definition)?;
                }
                definition_type => {
                    return Err(AuthoringError::ParamTypeNotAllowedInAudioElement {
                        definition_type: definition_type.into(),
                    });
                }
            }
        }
    }
    for mix_presentation in mix_presentation_obus {
        for sub_mix in &mix_presentation.sub_mixes {
            for audio_element in &sub_mix.audio_elements {
                insert_definition(&mut param_definitions, &audio_element.element_mix_gain)?;
            }
            insert_definition(&mut param_definitions, &sub_mix.output_mix_gain)?;
        }
    }
    Ok(param_definitions)
}

fn insert_definition(
    param_definitions: &mut HashMap<DecodedUleb128, ParamDefinition>,
    definition: &ParamDefinition,
) -> AuthoringResult<()> {
    match param_definitions.entry(definition.parameter_id) {
        Entry::Vacant(entry) => {
            entry.insert(definition.clone());
            Ok(())
        }
        Entry::Occupied(entry) if entry.get() == definition => Ok(()),
        Entry::Occupied(_) => Err(AuthoringError::DuplicateParamDefinition(
            definition.parameter_id,
        )),
    }
}

#[derive(Debug)]
struct InitializedState {
    primary_profile: ProfileVersion,
}

/// Generator of parameter blocks, one temporal unit at a time.
#[derive(Debug)]
pub struct ParameterBlockGenerator {
    override_computed_recon_gains: bool,
    parameter_id_to_metadata: HashMap<DecodedUleb128, PerIdParameterMetadata>,
    initialized: Option<InitializedState>,
    mix_gain_metadata: Vec<ParameterBlockMetadata>,
    demixing_metadata: Vec<ParameterBlockMetadata>,
    recon_gain_metadata: Vec<ParameterBlockMetadata>,
    additional_recon_gain_logging: bool,
}

impl ParameterBlockGenerator {
    /// With `override_computed_recon_gains` the user supplied recon gains
    /// are emitted verbatim instead of being validated against computed
    /// ones.
    pub fn new(override_computed_recon_gains: bool) -> Self {
        Self {
            override_computed_recon_gains,
            parameter_id_to_metadata: HashMap::new(),
            initialized: None,
            mix_gain_metadata: Vec::new(),
            demixing_metadata: Vec::new(),
            recon_gain_metadata: Vec::new(),
            additional_recon_gain_logging: true,
        }
    }

    /// Resolves per-id metadata for every known parameter id. Must succeed
    /// before any `generate_*` call.
    pub fn initialize(
        &mut self,
        ia_sequence_header_obu: Option<&IASequenceHeaderObu>,
        audio_elements: &HashMap<DecodedUleb128, AudioElementWithData>,
        mix_presentation_obus: &[MixPresentationObu],
        param_definitions: &HashMap<DecodedUleb128, ParamDefinition>,
    ) -> AuthoringResult<()> {
        let ia_sequence_header_obu =
            ia_sequence_header_obu.ok_or(AuthoringError::MissingSequenceHeader)?;

        for mix_presentation in mix_presentation_obus {
            for sub_mix in &mix_presentation.sub_mixes {
                for audio_element in &sub_mix.audio_elements {
                    let parameter_id = audio_element.element_mix_gain.parameter_id;
                    if !param_definitions.contains_key(&parameter_id) {
                        return Err(AuthoringError::MissingMixGainDefinition(parameter_id));
                    }
                }
                let parameter_id = sub_mix.output_mix_gain.parameter_id;
                if !param_definitions.contains_key(&parameter_id) {
                    return Err(AuthoringError::MissingMixGainDefinition(parameter_id));
                }
            }
        }

        for (parameter_id, param_definition) in param_definitions {
            if !self.parameter_id_to_metadata.contains_key(parameter_id) {
                let per_id_metadata =
                    build_per_id_metadata(*parameter_id, param_definition, audio_elements)?;
                self.parameter_id_to_metadata
                    .insert(*parameter_id, per_id_metadata);
            }
            let definition_type =
                self.parameter_id_to_metadata[parameter_id].param_definition_type;
            if let ParameterDefinitionType::Reserved(tag) = definition_type {
                return Err(AuthoringError::UnsupportedParameterType {
                    parameter_id: *parameter_id,
                    definition_type: tag,
                });
            }
        }

        self.initialized = Some(InitializedState {
            primary_profile: ia_sequence_header_obu.primary_profile,
        });
        Ok(())
    }

    pub fn primary_profile(&self) -> Option<ProfileVersion> {
        self.initialized
            .as_ref()
            .map(|state| state.primary_profile)
    }

    pub fn per_id_metadata(&self, parameter_id: DecodedUleb128) -> Option<&PerIdParameterMetadata> {
        self.parameter_id_to_metadata.get(&parameter_id)
    }

    /// Queues one parameter block metadata record by its definition type
    /// and returns the duration of the block it will produce.
    pub fn add_metadata(&mut self, metadata: ParameterBlockMetadata) -> AuthoringResult<u32> {
        let per_id_metadata = self
            .parameter_id_to_metadata
            .get(&metadata.parameter_id)
            .ok_or(AuthoringError::StrayParameterBlock(metadata.parameter_id))?;
        let duration = match &per_id_metadata.param_definition.partition {
            Some(partition) => partition.duration(),
            None => metadata.duration,
        };
        match per_id_metadata.param_definition_type {
            ParameterDefinitionType::MixGain => self.mix_gain_metadata.push(metadata),
            ParameterDefinitionType::Demixing => self.demixing_metadata.push(metadata),
            ParameterDefinitionType::ReconGain => self.recon_gain_metadata.push(metadata),
            ParameterDefinitionType::Reserved(tag) => {
                return Err(AuthoringError::UnsupportedParameterType {
                    parameter_id: metadata.parameter_id,
                    definition_type: tag,
                });
            }
        }
        Ok(duration)
    }

    /// Drains the demixing queue into parameter blocks.
    pub fn generate_demixing(
        &mut self,
        global_timing_module: &mut GlobalTimingModule,
    ) -> AuthoringResult<Vec<ParameterBlockWithData>> {
        self.require_initialized()?;
        let metadata_list = mem::take(&mut self.demixing_metadata);
        self.generate_parameter_blocks(metadata_list, global_timing_module, None)
    }

    /// Drains the mix gain queue into parameter blocks.
    pub fn generate_mix_gain(
        &mut self,
        global_timing_module: &mut GlobalTimingModule,
    ) -> AuthoringResult<Vec<ParameterBlockWithData>> {
        self.require_initialized()?;
        let metadata_list = mem::take(&mut self.mix_gain_metadata);
        self.generate_parameter_blocks(metadata_list, global_timing_module, None)
    }

    /// Drains the recon gain queue. Must run after the host has decoded and
    /// demixed the unit's audio frames into the two sample maps.
    pub fn generate_recon_gain(
        &mut self,
        id_to_time_to_labeled_frame: &IdTimeLabeledFrameMap,
        id_to_time_to_labeled_decoded_frame: &IdTimeLabeledFrameMap,
        global_timing_module: &mut GlobalTimingModule,
    ) -> AuthoringResult<Vec<ParameterBlockWithData>> {
        self.require_initialized()?;
        let recon_gain_generator = ReconGainGenerator::new(
            id_to_time_to_labeled_frame,
            id_to_time_to_labeled_decoded_frame,
            self.additional_recon_gain_logging,
        );
        let metadata_list = mem::take(&mut self.recon_gain_metadata);
        let result = self.generate_parameter_blocks(
            metadata_list,
            global_timing_module,
            Some(&recon_gain_generator),
        );
        // Only the first temporal unit logs per-label details.
        self.additional_recon_gain_logging = false;
        result
    }

    fn require_initialized(&self) -> AuthoringResult<&InitializedState> {
        self.initialized
            .as_ref()
            .ok_or(AuthoringError::NotInitialized)
    }

    fn generate_parameter_blocks(
        &self,
        metadata_list: Vec<ParameterBlockMetadata>,
        global_timing_module: &mut GlobalTimingModule,
        recon_gain_generator: Option<&ReconGainGenerator>,
    ) -> AuthoringResult<Vec<ParameterBlockWithData>> {
        let mut output_parameter_blocks = Vec::with_capacity(metadata_list.len());
        for metadata in &metadata_list {
            let per_id_metadata = self
                .parameter_id_to_metadata
                .get(&metadata.parameter_id)
                .ok_or(AuthoringError::Internal(
                    "metadata queue references an unknown parameter id",
                ))?;
            output_parameter_blocks.push(self.generate_parameter_block(
                metadata,
                per_id_metadata,
                global_timing_module,
                recon_gain_generator,
            )?);
        }
        log_parameter_blocks(&output_parameter_blocks);
        Ok(output_parameter_blocks)
    }

    fn generate_parameter_block(
        &self,
        metadata: &ParameterBlockMetadata,
        per_id_metadata: &PerIdParameterMetadata,
        global_timing_module: &mut GlobalTimingModule,
        recon_gain_generator: Option<&ReconGainGenerator>,
    ) -> AuthoringResult<ParameterBlockWithData> {
        // Mode 0 adopts the definition's partition; mode 1 builds one from
        // the metadata and carries it on the block.
        let definition_partition = per_id_metadata.param_definition.partition.as_ref();
        let partition = match definition_partition {
            Some(_) => None,
            None => Some(build_partition_from_metadata(metadata)?),
        };
        let governing_partition = partition
            .as_ref()
            .or(definition_partition)
            .ok_or(AuthoringError::Internal("no governing subblock partition"))?;
        let duration = governing_partition.duration();
        let num_subblocks = governing_partition.num_subblocks();

        if num_subblocks != metadata.subblocks.len() as u32 {
            return Err(AuthoringError::SubblockCountMismatch {
                expected: num_subblocks,
                got: metadata.subblocks.len() as u32,
            });
        }
        match per_id_metadata.param_definition_type {
            ParameterDefinitionType::Demixing | ParameterDefinitionType::ReconGain
                if num_subblocks != 1 =>
            {
                return Err(AuthoringError::SingleSubblockRequired {
                    definition_type: per_id_metadata.param_definition_type.into(),
                    got: num_subblocks,
                });
            }
            _ => {}
        }

        let (start_timestamp, end_timestamp) = global_timing_module
            .get_next_parameter_block_timestamps(
                metadata.parameter_id,
                metadata.start_timestamp,
                duration,
            )?;

        let mut subblocks = Vec::with_capacity(metadata.subblocks.len());
        for subblock_metadata in &metadata.subblocks {
            subblocks.push(self.generate_subblock(
                per_id_metadata,
                &subblock_metadata.payload,
                recon_gain_generator,
                start_timestamp,
            )?);
        }

        let obu = ParameterBlockObu {
            header: ObuHeader::new(ObuType::ParameterBlock),
            parameter_id: metadata.parameter_id,
            partition,
            subblocks,
        };
        obu.validate(per_id_metadata)?;
        Ok(ParameterBlockWithData {
            obu,
            start_timestamp,
            end_timestamp,
        })
    }

    fn generate_subblock(
        &self,
        per_id_metadata: &PerIdParameterMetadata,
        payload: &ParameterPayloadMetadata,
        recon_gain_generator: Option<&ReconGainGenerator>,
        start_timestamp: i32,
    ) -> AuthoringResult<ParameterSubblock> {
        match (per_id_metadata.param_definition_type, payload) {
            (ParameterDefinitionType::MixGain, ParameterPayloadMetadata::MixGain(mix_gain)) => Ok(
                ParameterSubblock::MixGain(transcribe_mix_gain(mix_gain)?),
            ),
            (ParameterDefinitionType::Demixing, ParameterPayloadMetadata::Demixing(demixing)) => {
                Ok(ParameterSubblock::Demixing(*demixing))
            }
            (
                ParameterDefinitionType::ReconGain,
                ParameterPayloadMetadata::ReconGain(recon_gain_metadata),
            ) => {
                let recon_gain_generator = recon_gain_generator.ok_or(
                    AuthoringError::Internal("recon gain queue drained without a generator"),
                )?;
                Ok(ParameterSubblock::ReconGain(
                    self.generate_recon_gain_subblock(
                        per_id_metadata,
                        recon_gain_metadata,
                        recon_gain_generator,
                        start_timestamp,
                    )?,
                ))
            }
            (definition_type, _) => Err(AuthoringError::PayloadTypeMismatch {
                definition_type: definition_type.into(),
            }),
        }
    }

    fn generate_recon_gain_subblock(
        &self,
        per_id_metadata: &PerIdParameterMetadata,
        metadata: &ReconGainMetadata,
        recon_gain_generator: &ReconGainGenerator,
        start_timestamp: i32,
    ) -> AuthoringResult<ReconGainInfoParameterData> {
        let num_layers = per_id_metadata.num_layers;
        let user_layers = &metadata.recon_gains_for_layer;
        if num_layers > 1 && user_layers.len() != usize::from(num_layers) {
            return Err(AuthoringError::ReconGainLayerCount {
                expected: num_layers,
                got: user_layers.len(),
            });
        }

        let mut recon_gain_elements = Vec::with_capacity(usize::from(num_layers));
        let mut accumulated_channels = ChannelNumbers::default();
        for layer_index in 0..usize::from(num_layers) {
            let mut user_recon_gains = [0_u8; RECON_GAIN_MASK_BITS];
            let mut user_recon_gain_flag: u32 = 0;
            if let Some(user_layer) = user_layers.get(layer_index) {
                for (bit_position, user_recon_gain) in &user_layer.recon_gain {
                    if *bit_position >= RECON_GAIN_MASK_BITS as u32 {
                        return Err(AuthoringError::ReconGainBitPosition(*bit_position));
                    }
                    let user_recon_gain = u8::try_from(*user_recon_gain)
                        .map_err(|_| AuthoringError::ReconGainOutOfRange(*user_recon_gain))?;
                    user_recon_gain_flag |= 1_u32 << bit_position;
                    user_recon_gains[*bit_position as usize] = user_recon_gain;
                }
            }

            let layer_is_present = per_id_metadata
                .recon_gain_is_present_flags
                .get(layer_index)
                .copied()
                .ok_or(AuthoringError::Internal(
                    "recon gain present flags shorter than num_layers",
                ))?;

            // The user supplied gains go out either way; without the
            // override they must match the computed ones below.
            recon_gain_elements.push(layer_is_present.then_some(ReconGainElement {
                recon_gain_flag: user_recon_gain_flag,
                recon_gain: user_recon_gains,
            }));

            if self.override_computed_recon_gains {
                continue;
            }

            let layer_channels = per_id_metadata
                .channel_numbers_for_layers
                .get(layer_index)
                .copied()
                .ok_or(AuthoringError::Internal(
                    "channel numbers shorter than num_layers",
                ))?;
            if recon_gain_generator.additional_logging() {
                tracing::info!(
                    "layer[{}]: surround {} height {} lfe {}",
                    layer_index,
                    layer_channels.surround,
                    layer_channels.height,
                    layer_channels.lfe
                );
            }
            let demixed_channel_labels = if layer_index > 0 {
                find_demixed_channels(accumulated_channels, layer_channels)?
            } else {
                Vec::new()
            };
            accumulated_channels = layer_channels;

            if layer_is_present != !demixed_channel_labels.is_empty() {
                return Err(AuthoringError::ReconGainPresenceMismatch {
                    layer: layer_index,
                    user_present: layer_is_present,
                });
            }
            if !layer_is_present {
                continue;
            }

            let mut computed_recon_gains = [0_u8; RECON_GAIN_MASK_BITS];
            let mut computed_recon_gain_flag: u32 = 0;
            for label in &demixed_channel_labels {
                let recon_gain = recon_gain_generator.compute_recon_gain(
                    label,
                    per_id_metadata.audio_element_id,
                    start_timestamp,
                )?;
                let bit_position = demixed_label_bit_position(label)
                    .ok_or(AuthoringError::Internal("unmapped demixed channel label"))?;
                computed_recon_gain_flag |= 1_u32 << bit_position;
                computed_recon_gains[usize::from(bit_position)] = scaled_recon_gain(recon_gain);
            }

            if computed_recon_gain_flag != user_recon_gain_flag {
                let differing = computed_recon_gain_flag ^ user_recon_gain_flag;
                let differing_bits = (0..RECON_GAIN_MASK_BITS as u8)
                    .filter(|bit| differing & (1_u32 << bit) != 0)
                    .collect();
                return Err(AuthoringError::ReconGainFlagMismatch {
                    layer: layer_index,
                    computed: computed_recon_gain_flag,
                    user: user_recon_gain_flag,
                    differing_bits,
                });
            }
            // Find all value mismatches before failing.
            let deltas: Vec<ReconGainDelta> = (0..RECON_GAIN_MASK_BITS)
                .filter(|bit| computed_recon_gains[*bit] != user_recon_gains[*bit])
                .map(|bit| ReconGainDelta {
                    bit_position: bit as u8,
                    computed: computed_recon_gains[bit],
                    user: user_recon_gains[bit],
                })
                .collect();
            if !deltas.is_empty() {
                return Err(AuthoringError::ReconGainValueMismatch {
                    layer: layer_index,
                    deltas,
                });
            }
        }

        Ok(ReconGainInfoParameterData {
            recon_gain_elements,
        })
    }
}

fn build_per_id_metadata(
    parameter_id: DecodedUleb128,
    param_definition: &ParamDefinition,
    audio_elements: &HashMap<DecodedUleb128, AudioElementWithData>,
) -> AuthoringResult<PerIdParameterMetadata> {
    let mut per_id_metadata = PerIdParameterMetadata::new(param_definition.clone());
    if let ParamDefinitionVariant::ReconGain { audio_element_id } = &param_definition.variant {
        let audio_element =
            audio_elements
                .get(audio_element_id)
                .ok_or(AuthoringError::DanglingAudioElement {
                    parameter_id,
                    audio_element_id: *audio_element_id,
                })?;
        let AudioElementConfig::Scalable(config) = &audio_element.obu.config else {
            return Err(AuthoringError::NotScalable(*audio_element_id));
        };
        per_id_metadata.audio_element_id = *audio_element_id;
        per_id_metadata.num_layers = config.num_layers();
        per_id_metadata.recon_gain_is_present_flags = config
            .channel_audio_layer_configs
            .iter()
            .map(|layer| layer.recon_gain_is_present)
            .collect();
        per_id_metadata.channel_numbers_for_layers =
            audio_element.channel_numbers_for_layers.clone();
    }
    Ok(per_id_metadata)
}

fn build_partition_from_metadata(
    metadata: &ParameterBlockMetadata,
) -> AuthoringResult<SubblockPartition> {
    if metadata.constant_subblock_duration != 0 {
        return Ok(SubblockPartition::constant(
            metadata.duration,
            metadata.constant_subblock_duration,
        )?);
    }
    if metadata.num_subblocks != metadata.subblocks.len() as u32 {
        return Err(AuthoringError::SubblockCountMismatch {
            expected: metadata.num_subblocks,
            got: metadata.subblocks.len() as u32,
        });
    }
    let subblock_durations = metadata
        .subblocks
        .iter()
        .map(|subblock| subblock.subblock_duration)
        .collect();
    Ok(SubblockPartition::explicit(
        metadata.duration,
        subblock_durations,
    )?)
}

fn transcribe_mix_gain(metadata: &MixGainMetadata) -> AuthoringResult<MixGainParameterData> {
    let to_i16 =
        |value: i32| i16::try_from(value).map_err(|_| AuthoringError::MixGainOutOfRange(value));
    match *metadata {
        MixGainMetadata::Step { start_point_value } => Ok(MixGainParameterData::Step {
            start_point_value: to_i16(start_point_value)?,
        }),
        MixGainMetadata::Linear {
            start_point_value,
            end_point_value,
        } => Ok(MixGainParameterData::Linear {
            start_point_value: to_i16(start_point_value)?,
            end_point_value: to_i16(end_point_value)?,
        }),
        MixGainMetadata::Bezier {
            start_point_value,
            end_point_value,
            control_point_value,
            control_point_relative_time,
        } => Ok(MixGainParameterData::Bezier {
            start_point_value: to_i16(start_point_value)?,
            end_point_value: to_i16(end_point_value)?,
            control_point_value: to_i16(control_point_value)?,
            control_point_relative_time: u8::try_from(control_point_relative_time).map_err(
                |_| AuthoringError::ControlPointTimeOutOfRange(control_point_relative_time),
            )?,
        }),
    }
}

/// Logs the first and last block of the batch.
fn log_parameter_blocks(output_parameter_blocks: &[ParameterBlockWithData]) {
    let Some(first) = output_parameter_blocks.first() else {
        return;
    };
    let mut to_log = vec![first];
    if output_parameter_blocks.len() > 1 {
        if let Some(last) = output_parameter_blocks.last() {
            to_log.push(last);
        }
    }
    for parameter_block in to_log {
        tracing::debug!(
            "parameter block id {} covering [{}, {})",
            parameter_block.obu.parameter_id,
            parameter_block.start_timestamp,
            parameter_block.end_timestamp
        );
    }
}
