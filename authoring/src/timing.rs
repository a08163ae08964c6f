//! Per-parameter-id clock handing out contiguous `[start, end)` intervals.

use std::collections::HashMap;

use codec_iamf::leb128::DecodedUleb128;

use crate::errors::{AuthoringError, AuthoringResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimingState {
    /// Next emit must claim exactly this start timestamp.
    Expect(i32),
    /// A gap or overlap was observed; no further emits are accepted.
    Fatal,
}

/// Tracks, for every parameter id, the start timestamp the next parameter
/// block must claim. Timestamps are 32 bit signed ticks of the parameter
/// rate, starting at 0.
#[derive(Debug, Default)]
pub struct GlobalTimingModule {
    parameter_states: HashMap<DecodedUleb128, TimingState>,
}

impl GlobalTimingModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `claimed_start` against the expected timeline of
    /// `parameter_id` and returns the `[start, end)` interval covering
    /// `duration` ticks.
    pub fn get_next_parameter_block_timestamps(
        &mut self,
        parameter_id: DecodedUleb128,
        claimed_start: i32,
        duration: u32,
    ) -> AuthoringResult<(i32, i32)> {
        let state = self
            .parameter_states
            .entry(parameter_id)
            .or_insert(TimingState::Expect(0));
        let expected = match *state {
            TimingState::Expect(expected) => expected,
            TimingState::Fatal => return Err(AuthoringError::TimingFatal(parameter_id)),
        };
        if claimed_start != expected {
            *state = TimingState::Fatal;
            return Err(AuthoringError::TimingGap {
                parameter_id,
                expected,
                claimed: claimed_start,
            });
        }
        let end = i32::try_from(duration)
            .ok()
            .and_then(|duration| expected.checked_add(duration))
            .ok_or(AuthoringError::TimestampOverflow {
                parameter_id,
                start: claimed_start,
                duration,
            })?;
        *state = TimingState::Expect(end);
        Ok((claimed_start, end))
    }
}
