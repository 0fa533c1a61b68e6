//! Conversions between frame counts and clock time.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A frame rate in Hz.
pub type SampleRate = u32;

/// A point in stream time in nanoseconds.
///
/// Displays as `H:MM:SS.NNNNNNNNN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct ClockTime(u64);

impl ClockTime {
    pub const ZERO: Self = Self(0);
    pub const SECOND: Self = Self(1_000_000_000);

    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    pub const fn nanos(self) -> u64 {
        self.0
    }

    pub fn seconds_f64(self) -> f64 {
        self.0 as f64 * 1e-9
    }

    /// Converts a whole frame count, rounding to the nearest nanosecond.
    pub fn from_frames(frames: u64, sample_rate: SampleRate) -> Self {
        Self(scale_round(frames, Self::SECOND.0, u64::from(sample_rate)))
    }

    /// Converts a fractional frame count. Negative positions clamp to [ClockTime::ZERO].
    pub fn from_frames_f64(frames: f64, sample_rate: SampleRate) -> Self {
        if !(frames > 0.) || sample_rate == 0 {
            return Self::ZERO;
        }

        let nanos = (frames * 1e9 / f64::from(sample_rate)).round();
        if nanos >= u64::MAX as f64 {
            Self(u64::MAX)
        } else {
            Self(nanos as u64)
        }
    }

    /// Converts back to the frame that contains this point in time.
    pub fn to_frames(self, sample_rate: SampleRate) -> u64 {
        let frames = u128::from(self.0) * u128::from(sample_rate) / u128::from(Self::SECOND.0);
        u64::try_from(frames).unwrap_or(u64::MAX)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let second = Self::SECOND.0;
        let total_secs = self.0 / second;

        write!(
            f,
            "{}:{:02}:{:02}.{:09}",
            total_secs / 3600,
            (total_secs / 60) % 60,
            total_secs % 60,
            self.0 % second
        )
    }
}

/// Returns the duration of `frames` at `sample_rate` in seconds.
pub fn frames_to_seconds(frames: f64, sample_rate: SampleRate) -> f64 {
    frames / f64::from(sample_rate)
}

/// `val * num / denom` rounded half up, without intermediate overflow.
///
/// Saturates at `u64::MAX`; a zero `denom` yields `0`.
pub fn scale_round(val: u64, num: u64, denom: u64) -> u64 {
    if denom == 0 {
        return 0;
    }

    let denom = u128::from(denom);
    let scaled = (u128::from(val) * u128::from(num) + denom / 2) / denom;
    u64::try_from(scaled).unwrap_or(u64::MAX)
}
