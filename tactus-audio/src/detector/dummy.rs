//! Detectors which don't look at the samples at all.
//!
//! Useful for tests and for wiring up a host before a real detector is available.
use std::collections::VecDeque;

use super::{PitchDetector, TempoDetector};

/// Reports the same pitch for every hop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantPitch {
    freq: f32,
}

impl ConstantPitch {
    pub fn new(freq: f32) -> Self {
        Self { freq }
    }
}

impl PitchDetector for ConstantPitch {
    fn detect_pitch(&mut self, _hop: &[f32]) -> f32 {
        self.freq
    }
}

/// Replays a fixed list of raw tempo results, one per hop.
///
/// Reports `0` (no beat) once the list is exhausted.
#[derive(Debug, Clone, Default)]
pub struct ScriptedBeats {
    results: VecDeque<f32>,
}

impl ScriptedBeats {
    pub fn new(results: impl IntoIterator<Item = f32>) -> Self {
        Self {
            results: results.into_iter().collect(),
        }
    }

    /// Reports a beat with the given fraction every `period` hops, starting with hop
    /// `period - 1`, for `hops` hops.
    pub fn every(period: usize, fraction: f32, hops: usize) -> Self {
        let period = period.max(1);

        Self::new((0..hops).map(|idx| if (idx + 1) % period == 0 { fraction } else { 0. }))
    }

    /// The amount of results which haven't been replayed yet.
    pub fn remaining(&self) -> usize {
        self.results.len()
    }
}

impl TempoDetector for ScriptedBeats {
    fn detect_beat(&mut self, _hop: &[f32]) -> f32 {
        self.results.pop_front().unwrap_or(0.)
    }
}
