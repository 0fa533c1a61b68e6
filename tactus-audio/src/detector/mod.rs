//! The interface to the external pitch and tempo detectors.
//!
//! This crate doesn't analyse audio itself. An analyzer hands every completed
//! hop to a detector which implements one of the traits below and only works
//! with the value it gets back. A detector is created once through a builder
//! closure which receives the [DetectorParams] of the analyzer and is destroyed
//! when the analyzer is dropped.
pub mod dummy;

use serde::{Deserialize, Serialize};

use crate::{
    time::SampleRate,
    util::{freq_to_midi_note, BoxError},
};

/// Everything a detector needs to know on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorParams<M> {
    /// The amount of samples the detector analyses at once.
    pub window_size: usize,
    /// The amount of samples of each hop which is passed to the detector.
    pub hop_size: usize,
    pub sample_rate: SampleRate,
    pub method: M,
    /// Only set for pitch detectors.
    pub tolerance: Option<f32>,
}

/// Estimates the fundamental frequency of each hop.
pub trait PitchDetector {
    /// Returns the pitch in Hz of the window which ends with `hop`.
    /// `0` means that no pitch has been found.
    fn detect_pitch(&mut self, hop: &[f32]) -> f32;
}

/// Looks for beats within each hop.
pub trait TempoDetector {
    /// Returns the first output value of the detector for `hop`.
    ///
    /// How this value has to be read is decided by the [BeatConvention] of the analyzer.
    fn detect_beat(&mut self, hop: &[f32]) -> f32;
}

impl<D: PitchDetector + ?Sized> PitchDetector for Box<D> {
    fn detect_pitch(&mut self, hop: &[f32]) -> f32 {
        (**self).detect_pitch(hop)
    }
}

impl<D: TempoDetector + ?Sized> TempoDetector for Box<D> {
    fn detect_beat(&mut self, hop: &[f32]) -> f32 {
        (**self).detect_beat(hop)
    }
}

/// Pitch estimation algorithms of the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PitchMethod {
    Yin,
    #[default]
    YinFft,
    Mcomb,
    Fcomb,
    Schmitt,
}

/// Onset detection functions the tempo detector can be built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnsetMethod {
    Energy,
    SpecDiff,
    Hfc,
    Complex,
    Phase,
    #[default]
    Kl,
    Mkl,
    SpecFlux,
}

/// The unit of the reported pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PitchUnit {
    #[default]
    Hz,
    /// MIDI note number with a fractional part.
    Midi,
}

impl PitchUnit {
    /// Converts a frequency in Hz into this unit.
    pub fn convert(self, freq: f32) -> f32 {
        match self {
            Self::Hz => freq,
            Self::Midi if freq > 0. => freq_to_midi_note(freq),
            Self::Midi => 0.,
        }
    }
}

/// How the raw value of a [TempoDetector] is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeatConvention {
    /// The value is the offset of the beat within the hop. A positive value
    /// marks a beat.
    #[default]
    Fraction,
    /// Any non-zero value marks a beat somewhere in the hop. The beat is placed
    /// at the first frame of the hop.
    Flag,
}

impl BeatConvention {
    /// Returns the fraction to pass to [crate::BeatTracker::on_beat] or `None`
    /// if `raw` doesn't mark a beat.
    pub fn beat_fraction(self, raw: f32) -> Option<f32> {
        match self {
            Self::Fraction if raw > 0. => Some(raw),
            Self::Flag if raw != 0. && !raw.is_nan() => Some(1.),
            _ => None,
        }
    }
}

/// Creates a detector for the given parameters.
pub(crate) fn build<M, D, E, B>(params: &DetectorParams<M>, build: B) -> Result<D, BoxError>
where
    B: FnOnce(&DetectorParams<M>) -> Result<D, E>,
    E: Into<BoxError>,
{
    build(params).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod beat_convention {
        use super::*;

        #[test]
        fn fraction() {
            let convention = BeatConvention::Fraction;

            assert_eq!(convention.beat_fraction(0.), None);
            assert_eq!(convention.beat_fraction(-0.5), None);
            assert_eq!(convention.beat_fraction(0.25), Some(0.25));
            assert_eq!(convention.beat_fraction(1.), Some(1.));
        }

        #[test]
        fn flag() {
            let convention = BeatConvention::Flag;

            assert_eq!(convention.beat_fraction(0.), None);
            assert_eq!(convention.beat_fraction(f32::NAN), None);
            assert_eq!(convention.beat_fraction(1.), Some(1.));
            assert_eq!(convention.beat_fraction(0.25), Some(1.));
            assert_eq!(convention.beat_fraction(-1.), Some(1.));
        }
    }

    #[test]
    fn midi_unit() {
        assert_eq!(PitchUnit::Hz.convert(440.), 440.);
        assert!((PitchUnit::Midi.convert(440.) - 69.).abs() < 1e-4);
        assert_eq!(PitchUnit::Midi.convert(0.), 0.);
    }

    #[test]
    fn builder_errors_are_boxed() {
        let params = DetectorParams {
            window_size: 1024,
            hop_size: 256,
            sample_rate: 44_100,
            method: OnsetMethod::Hfc,
            tolerance: None,
        };

        let result: Result<dummy::ScriptedBeats, _> =
            build(&params, |_| Err::<dummy::ScriptedBeats, _>("unsupported method"));

        assert_eq!(result.err().map(|err| err.to_string()).as_deref(), Some("unsupported method"));
    }
}
