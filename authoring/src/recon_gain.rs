//! Recon gain computation: energy ratios between the original downmixed
//! program and the demixed-then-downmixed decoded program.

use codec_iamf::leb128::DecodedUleb128;

use crate::demix::IdTimeLabeledFrameMap;
use crate::errors::{AuthoringError, AuthoringResult};

/// Computes recon gains for one temporal unit from the two sample maps the
/// host filled in after encoding and decoding the unit's audio frames.
pub struct ReconGainGenerator<'a> {
    id_to_time_to_labeled_frame: &'a IdTimeLabeledFrameMap,
    id_to_time_to_labeled_decoded_frame: &'a IdTimeLabeledFrameMap,
    additional_logging: bool,
}

impl<'a> ReconGainGenerator<'a> {
    pub fn new(
        id_to_time_to_labeled_frame: &'a IdTimeLabeledFrameMap,
        id_to_time_to_labeled_decoded_frame: &'a IdTimeLabeledFrameMap,
        additional_logging: bool,
    ) -> Self {
        Self {
            id_to_time_to_labeled_frame,
            id_to_time_to_labeled_decoded_frame,
            additional_logging,
        }
    }

    pub fn additional_logging(&self) -> bool {
        self.additional_logging
    }

    /// Energy ratio of `label` between the decoded-demixed and the original
    /// program, clipped to [0, 1]. A silent original channel yields unity.
    pub fn compute_recon_gain(
        &self,
        label: &str,
        audio_element_id: DecodedUleb128,
        start_timestamp: i32,
    ) -> AuthoringResult<f64> {
        let original = samples(
            self.id_to_time_to_labeled_frame,
            audio_element_id,
            start_timestamp,
            label,
        )?;
        let demixed = samples(
            self.id_to_time_to_labeled_decoded_frame,
            audio_element_id,
            start_timestamp,
            label,
        )?;

        let original_energy = energy(original);
        let demixed_energy = energy(demixed);
        let recon_gain = if original_energy == 0.0 {
            1.0
        } else {
            (demixed_energy / original_energy).clamp(0.0, 1.0)
        };
        if self.additional_logging {
            tracing::info!(
                "recon gain[{}] = {} (original energy {}, demixed energy {})",
                label,
                recon_gain,
                original_energy,
                demixed_energy
            );
        }
        Ok(recon_gain)
    }
}

fn samples<'a>(
    frame_map: &'a IdTimeLabeledFrameMap,
    audio_element_id: DecodedUleb128,
    timestamp: i32,
    label: &str,
) -> AuthoringResult<&'a [i32]> {
    frame_map
        .get(&audio_element_id)
        .and_then(|time_map| time_map.get(&timestamp))
        .and_then(|frame| frame.label_to_samples.get(label))
        .map(|samples| &samples[..])
        .ok_or_else(|| AuthoringError::MissingSamples {
            audio_element_id,
            timestamp,
            label: label.to_string(),
        })
}

fn energy(samples: &[i32]) -> f64 {
    samples
        .iter()
        .map(|sample| f64::from(*sample) * f64::from(*sample))
        .sum()
}

/// 8 bit quantization of a recon gain ratio.
pub fn scaled_recon_gain(recon_gain: f64) -> u8 {
    (recon_gain * 255.0).round().clamp(0.0, 255.0) as u8
}
