//! @see: IAMF v1.0, Parameter Data — the typed payloads carried by
//! parameter block subblocks.

use crate::errors::{IAMFCodecError, IAMFCodecResult};
use crate::leb128::DecodedUleb128;

pub mod reader;
pub mod writer;

pub const RECON_GAIN_MASK_BITS: usize = 12;

/// Mix gain animation over one subblock. The variant is serialized as a
/// ULEB128 `animation_type` tag followed by the control points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixGainParameterData {
    Step {
        start_point_value: i16,
    },
    Linear {
        start_point_value: i16,
        end_point_value: i16,
    },
    Bezier {
        start_point_value: i16,
        end_point_value: i16,
        control_point_value: i16,
        /// Maps [0, 255] onto the relative time [0, 1].
        control_point_relative_time: u8,
    },
}

impl MixGainParameterData {
    pub fn animation_type(&self) -> DecodedUleb128 {
        match self {
            Self::Step { .. } => 0,
            Self::Linear { .. } => 1,
            Self::Bezier { .. } => 2,
        }
    }

    /// Samples the animated gain at tick `t` within a subblock of
    /// `duration` ticks, in the raw int16 domain.
    pub fn gain_at(&self, t: u32, duration: u32) -> f64 {
        match *self {
            Self::Step { start_point_value } => f64::from(start_point_value),
            Self::Linear {
                start_point_value,
                end_point_value,
            } => {
                if duration == 0 {
                    return f64::from(start_point_value);
                }
                let alpha = f64::from(t) / f64::from(duration);
                f64::from(start_point_value)
                    + (f64::from(end_point_value) - f64::from(start_point_value)) * alpha
            }
            Self::Bezier {
                start_point_value,
                end_point_value,
                control_point_value,
                control_point_relative_time,
            } => {
                if duration == 0 {
                    return f64::from(start_point_value);
                }
                // Quadratic Bezier with the control point at relative time
                // p: x(s) = 2ps + s^2 (1 - 2p). Solve for the curve
                // parameter s at x = t / duration, then evaluate the gain.
                let p = f64::from(control_point_relative_time) / 255.0;
                let x = f64::from(t) / f64::from(duration);
                let a = 1.0 - 2.0 * p;
                let s = if a.abs() < 1e-9 {
                    x
                } else {
                    (-p + (p * p + a * x).sqrt()) / a
                };
                (1.0 - s) * (1.0 - s) * f64::from(start_point_value)
                    + 2.0 * (1.0 - s) * s * f64::from(control_point_value)
                    + s * s * f64::from(end_point_value)
            }
        }
    }
}

/// @see: IAMF v1.0, Demixing Info Parameter Data.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DMixPMode {
    Mode1 = 0,
    Mode2 = 1,
    Mode3 = 2,
    Reserved3 = 3,
    Mode1N = 4,
    Mode2N = 5,
    Mode3N = 6,
}

impl From<DMixPMode> for u8 {
    fn from(value: DMixPMode) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for DMixPMode {
    type Error = IAMFCodecError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DMixPMode::Mode1),
            1 => Ok(DMixPMode::Mode2),
            2 => Ok(DMixPMode::Mode3),
            3 => Ok(DMixPMode::Reserved3),
            4 => Ok(DMixPMode::Mode1N),
            5 => Ok(DMixPMode::Mode2N),
            6 => Ok(DMixPMode::Mode3N),
            _ => Err(IAMFCodecError::UnknownDMixPMode(value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemixingInfoParameterData {
    pub dmixp_mode: DMixPMode, // 3 bits
    pub reserved: u8,          // 5 bits
}

/// One layer of recon gain info: a 12 bit presence mask and the 8 bit gain
/// at every set position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconGainElement {
    pub recon_gain_flag: DecodedUleb128,
    pub recon_gain: [u8; RECON_GAIN_MASK_BITS],
}

impl ReconGainElement {
    /// A bit is set in the flag iff its position holds a nonzero gain.
    pub fn validate(&self) -> IAMFCodecResult<()> {
        if self.recon_gain_flag >> RECON_GAIN_MASK_BITS != 0 {
            return Err(IAMFCodecError::ReconGainBitPosition(self.recon_gain_flag));
        }
        for (bit, gain) in self.recon_gain.iter().enumerate() {
            let flagged = self.recon_gain_flag & (1 << bit) != 0;
            if flagged != (*gain != 0) {
                return Err(IAMFCodecError::ReconGainFlagInconsistent {
                    flag: self.recon_gain_flag,
                    bit: bit as u8,
                });
            }
        }
        Ok(())
    }
}

/// Per-layer recon gain payload. Layers whose audio element layer has
/// `recon_gain_is_present` cleared carry `None` and are skipped on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReconGainInfoParameterData {
    pub recon_gain_elements: Vec<Option<ReconGainElement>>,
}
