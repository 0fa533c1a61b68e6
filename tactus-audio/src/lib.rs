//! # Description
//! A crate which takes care of the streaming side of pitch and tempo analysis:
//! it cuts an incoming stream of interleaved samples into hops, hands each hop
//! to an external detector and turns the results into timestamped events.
//!
//! The detectors themselves are not part of this crate. They are plugged in
//! through the [detector::PitchDetector] and [detector::TempoDetector] traits.
//!
//! # Example
//!
//! ## Tempo
//! ```
//! use tactus_audio::{detector::dummy::ScriptedBeats, Chunk, TempoAnalyzer, TempoConfig};
//!
//! // the default hop size is 128 frames at 44.1kHz
//! let config = TempoConfig::default();
//!
//! // a detector which reports a beat every 100th hop
//! let mut analyzer = TempoAnalyzer::new(config, |_params| {
//!     Ok::<_, std::convert::Infallible>(ScriptedBeats::every(100, 1., 300))
//! })
//! .unwrap();
//!
//! let silence = vec![0f32; 1024];
//! let mut events = Vec::new();
//! // 38 chunks of 1024 frames cover the 300 scripted hops
//! for idx in 0..38 {
//!     let samples = analyzer.process(Chunk::new(&silence, idx * 1024), |event| events.push(event));
//!
//!     // the samples are passed through unchanged
//!     assert_eq!(samples.len(), 1024);
//! }
//!
//! assert_eq!(events.len(), 3);
//! assert_eq!(events[0].bpm, 0.);
//! // 100 hops of 128 frames at 44.1kHz
//! assert!((events[1].bpm - 60. * 44_100. / 12_800.).abs() < 1e-9);
//! ```
//!
//! ## Multiple channels
//! Only the first channel is analysed unless [StreamConfig::downmix] is set.
//!
//! ```
//! use tactus_audio::{detector::dummy::ConstantPitch, Chunk, PitchAnalyzer, PitchConfig};
//!
//! let mut config = PitchConfig::default();
//! config.stream.channels = 2;
//! config.stream.downmix = true;
//!
//! let mut analyzer = PitchAnalyzer::new(config, |_params| {
//!     Ok::<_, std::convert::Infallible>(ConstantPitch::new(440.))
//! })
//! .unwrap();
//!
//! // 256 stereo frames complete exactly one hop
//! let samples = vec![0.5f32; 2 * 256];
//! let mut frames = Vec::new();
//! analyzer.process(Chunk::new(&samples, 0), |event| frames.push(event.frame));
//!
//! assert_eq!(frames, vec![255]);
//! ```
pub mod config;
pub mod detector;
pub mod time;
pub mod util;

mod analyzer;
mod beat_tracker;
mod hop_accumulator;

pub use analyzer::{
    AnalyzerError, Chunk, FrameDispatcher, HopContext, PitchAnalyzer, PitchEvent, TempoAnalyzer,
    TempoEvent,
};
pub use beat_tracker::{beat_position, BeatEvent, BeatTracker};
pub use config::{ConfigError, PitchConfig, StreamConfig, TempoConfig};
pub use detector::{BeatConvention, OnsetMethod, PitchMethod, PitchUnit};
pub use hop_accumulator::{HopAccumulator, HopStatus};
pub use time::{ClockTime, SampleRate};

/// The sample rate the default configs assume.
pub const DEFAULT_SAMPLE_RATE: SampleRate = 44_100;
