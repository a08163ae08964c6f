//! Demixed channel bookkeeping: which channels a scalable layer
//! reconstructs from the layers below it, and where each of them sits in
//! the 12 bit recon gain mask.

use std::collections::{BTreeMap, HashMap};

use codec_iamf::audio_element::ChannelNumbers;
use codec_iamf::leb128::DecodedUleb128;

use crate::errors::{AuthoringError, AuthoringResult};

/// Samples of one frame keyed by channel label (e.g. "D_L3" for the
/// demixed-downmixed left of a 3 channel surround bed).
#[derive(Debug, Clone, Default)]
pub struct LabeledFrame {
    pub label_to_samples: HashMap<String, Vec<i32>>,
}

pub type TimeLabeledFrameMap = BTreeMap<i32, LabeledFrame>;

/// `audio_element_id -> start_timestamp -> labeled samples`.
pub type IdTimeLabeledFrameMap = HashMap<DecodedUleb128, TimeLabeledFrameMap>;

/// Labels of the channels demixed when moving from the accumulated lower
/// layers to `layer_channels`. Surround and height budgets only ever grow
/// across layers.
pub fn find_demixed_channels(
    accumulated_channels: ChannelNumbers,
    layer_channels: ChannelNumbers,
) -> AuthoringResult<Vec<&'static str>> {
    let mut labels = Vec::new();
    for surround in accumulated_channels.surround + 1..=layer_channels.surround {
        match surround {
            2 => {
                // Previous layer is mono, this layer is stereo.
                if accumulated_channels.surround == 1 {
                    labels.push("D_R2");
                }
            }
            3 => {
                labels.push("D_L3");
                labels.push("D_R3");
            }
            5 => {
                labels.push("D_Ls5");
                labels.push("D_Rs5");
            }
            7 => {
                labels.push("D_L7");
                labels.push("D_R7");
                labels.push("D_Lrs7");
                labels.push("D_Rrs7");
            }
            surround if surround > 7 => {
                return Err(AuthoringError::UnsupportedSurround(surround));
            }
            _ => {}
        }
    }

    if accumulated_channels.height == 2 {
        if layer_channels.height == 4 {
            labels.push("D_Ltb4");
            labels.push("D_Rtb4");
        } else if layer_channels.height == 2
            && accumulated_channels.surround == 3
            && layer_channels.surround > 3
        {
            labels.push("D_Ltf2");
            labels.push("D_Rtf2");
        }
    }

    Ok(labels)
}

/// Recon gain mask position of a demixed channel label. Positions 1 (D_C)
/// and 11 (D_LFE) are never demixed.
pub fn demixed_label_bit_position(label: &str) -> Option<u8> {
    match label {
        "D_L7" | "D_L5" | "D_L3" => Some(0),
        "D_R7" | "D_R5" | "D_R3" | "D_R2" => Some(2),
        "D_Ls5" => Some(3),
        "D_Rs5" => Some(4),
        "D_Ltf4" | "D_Ltf2" => Some(5),
        "D_Rtf4" | "D_Rtf2" => Some(6),
        "D_Lrs7" => Some(7),
        "D_Rrs7" => Some(8),
        "D_Ltb4" => Some(9),
        "D_Rtb4" => Some(10),
        _ => None,
    }
}
