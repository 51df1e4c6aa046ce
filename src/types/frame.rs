//! TDMA frame numbers within the GSM hyperframe

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{AttackError, Result};

/// Number of TDMA frames in a hyperframe (2048 superframes of 1326 frames).
pub const HYPERFRAME: u32 = 2_715_648;

/// TDMA frame number, always in `0..HYPERFRAME`.
///
/// Arithmetic wraps around the hyperframe. Ordering with [`Ord`] is numeric;
/// use [`FrameNumber::is_before`] for wrap-aware "earlier than" comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct FrameNumber(u32);

impl FrameNumber {
    /// Create a frame number, reducing the value modulo the hyperframe.
    pub const fn new(value: u32) -> Self {
        Self(value % HYPERFRAME)
    }

    /// Get the raw frame number.
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Move by `delta` frames in either direction, wrapping around the hyperframe.
    pub fn offset(self, delta: i64) -> Self {
        let wrapped = (i64::from(self.0) + delta).rem_euclid(i64::from(HYPERFRAME));
        Self(wrapped as u32)
    }

    /// Number of frames from `earlier` forward to `self`, modulo the hyperframe.
    pub fn frames_since(self, earlier: FrameNumber) -> u32 {
        (self.0 + HYPERFRAME - earlier.0) % HYPERFRAME
    }

    /// Returns true if `self` precedes `other` under the half-range rule.
    ///
    /// A frame counts as earlier when it lies less than half a hyperframe behind.
    pub fn is_before(self, other: FrameNumber) -> bool {
        let behind = other.frames_since(self);
        behind != 0 && behind < HYPERFRAME / 2
    }
}

impl TryFrom<u32> for FrameNumber {
    type Error = AttackError;

    fn try_from(value: u32) -> Result<Self> {
        if value >= HYPERFRAME {
            return Err(AttackError::parse(
                "Frame number",
                format!("{} is outside the hyperframe (0..{})", value, HYPERFRAME),
            ));
        }
        Ok(Self(value))
    }
}

impl From<FrameNumber> for u32 {
    fn from(frame: FrameNumber) -> Self {
        frame.0
    }
}

impl fmt::Display for FrameNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
