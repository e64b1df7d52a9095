//! User-entered timer parameters and field validation.

use crate::constants::{frame::FRAME_MS, input::MAX_FIELD_DIGITS};
use crate::error::FieldError;
use serde::{Deserialize, Serialize};

/// The three numeric fields a user can edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Lag offset in milliseconds
    Lag,
    /// Frame the countdown should land on
    TargetFrame,
    /// Frame actually reached on the last attempt
    FrameHit,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Lag, Field::TargetFrame, Field::FrameHit];
}

/// Check a proposed field value.
///
/// Empty input is accepted (it means 0); otherwise only ASCII digits are
/// allowed, up to [`MAX_FIELD_DIGITS`] of them.
pub fn validate_field(text: &str) -> Result<(), FieldError> {
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FieldError::NonDigit);
    }
    if text.len() > MAX_FIELD_DIGITS {
        return Err(FieldError::TooLong {
            len: text.len(),
            max: MAX_FIELD_DIGITS,
        });
    }
    Ok(())
}

/// Parse a validated field; empty input is 0.
fn parse_field(text: &str) -> Result<u32, FieldError> {
    validate_field(text)?;
    if text.is_empty() {
        return Ok(0);
    }
    // At most seven digits, always fits.
    text.parse().map_err(|_| FieldError::NonDigit)
}

/// Parameters driving the countdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerParams {
    /// Calibrated lag correction in milliseconds. Only the correction formula
    /// can drive this below zero.
    pub lag_offset_ms: i64,
    pub target_frame: u32,
    pub observed_hit_frame: u32,
}

impl TimerParams {
    /// Apply a text edit to one field. Rejected edits leave the params untouched.
    pub fn set(&mut self, field: Field, text: &str) -> Result<(), FieldError> {
        let value = parse_field(text)?;
        match field {
            Field::Lag => self.lag_offset_ms = i64::from(value),
            Field::TargetFrame => self.target_frame = value,
            Field::FrameHit => self.observed_hit_frame = value,
        }
        Ok(())
    }

    /// Current value of a field, used to render its text.
    pub fn value(&self, field: Field) -> i64 {
        match field {
            Field::Lag => self.lag_offset_ms,
            Field::TargetFrame => i64::from(self.target_frame),
            Field::FrameHit => i64::from(self.observed_hit_frame),
        }
    }

    /// Countdown length for the current parameters, never negative.
    pub fn duration_ms(&self) -> f64 {
        (f64::from(self.target_frame) * FRAME_MS + self.lag_offset_ms as f64).max(0.0)
    }

    /// Shift the lag estimate by the frame error between the target and the
    /// observed hit. Returns `false` without changes when no hit was entered.
    pub fn update_lag(&mut self) -> bool {
        if self.observed_hit_frame == 0 {
            return false;
        }
        let frame_error = i64::from(self.target_frame) - i64::from(self.observed_hit_frame);
        let corrected = self.lag_offset_ms as f64 + frame_error as f64 * FRAME_MS;
        self.lag_offset_ms = corrected.round() as i64;
        true
    }
}
