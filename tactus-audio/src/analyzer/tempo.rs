use serde::Serialize;
use tracing::{debug, trace};

use super::{AnalyzerError, Chunk, FrameDispatcher};
use crate::{
    beat_tracker::BeatTracker,
    config::TempoConfig,
    detector::{self, DetectorParams, OnsetMethod, TempoDetector},
    time::ClockTime,
    util::BoxError,
};

/// A detected beat together with the current tempo estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TempoEvent {
    /// Stream time of the beat.
    pub beat: ClockTime,
    /// Position of the beat in frames since the start of the stream.
    pub position: f64,
    pub bpm: f64,
}

/// Runs a [TempoDetector] on every hop of the stream and tracks the beats it reports.
pub struct TempoAnalyzer<D: TempoDetector> {
    config: TempoConfig,
    dispatcher: FrameDispatcher,
    detector: D,
    tracker: BeatTracker,
}

impl<D: TempoDetector> TempoAnalyzer<D> {
    /// Validates `config` and creates the detector with `build`.
    pub fn new<B, E>(config: TempoConfig, build: B) -> Result<Self, AnalyzerError>
    where
        B: FnOnce(&DetectorParams<OnsetMethod>) -> Result<D, E>,
        E: Into<BoxError>,
    {
        let dispatcher = FrameDispatcher::new(&config.stream)?;

        let params = DetectorParams {
            window_size: config.stream.window_size,
            hop_size: config.stream.hop_size,
            sample_rate: config.stream.sample_rate,
            method: config.method,
            tolerance: None,
        };
        let detector = detector::build(&params, build).map_err(AnalyzerError::Detector)?;

        debug!(
            "Created tempo analyzer: {:?} ({:?}), window {}, hop {}, {} Hz",
            config.method,
            config.convention,
            params.window_size,
            params.hop_size,
            params.sample_rate
        );

        Ok(Self {
            tracker: BeatTracker::new(config.stream.hop_size, config.stream.sample_rate),
            config,
            dispatcher,
            detector,
        })
    }

    /// Analyses every completed hop of `chunk`. `on_event` is called for each
    /// detected beat as long as [TempoConfig::emit_events] is set.
    ///
    /// Returns the samples of the chunk unchanged.
    pub fn process<'a, F>(&mut self, chunk: Chunk<'a>, mut on_event: F) -> &'a [f32]
    where
        F: FnMut(TempoEvent),
    {
        let Self {
            config,
            dispatcher,
            detector,
            tracker,
        } = self;

        dispatcher.process(chunk, |ctx, hop| {
            let raw = detector.detect_beat(hop);
            let Some(fraction) = config.convention.beat_fraction(raw) else {
                return;
            };

            let beat = tracker.on_beat(fraction, ctx.chunk_start, ctx.index_in_chunk);
            let event = TempoEvent {
                beat: beat.time(config.stream.sample_rate),
                position: beat.position,
                bpm: beat.bpm,
            };

            if !config.silent {
                println!("{}", console_line(&event));
            }

            trace!("beat {}, bpm {:.2}", event.beat, event.bpm);

            if config.emit_events {
                on_event(event);
            }
        })
    }

    pub fn config(&self) -> &TempoConfig {
        &self.config
    }

    pub fn set_silent(&mut self, silent: bool) {
        self.config.silent = silent;
    }

    pub fn set_emit_events(&mut self, emit_events: bool) {
        self.config.emit_events = emit_events;
    }

    /// The tempo computed for the most recent beat, `0` if it couldn't be computed.
    pub fn bpm(&self) -> f64 {
        self.tracker.bpm()
    }

    /// Position of the most recent beat in frames.
    pub fn last_beat(&self) -> Option<f64> {
        self.tracker.last_beat()
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Forgets the beat history, drops the incomplete hop and restarts the frame count.
    pub fn reset(&mut self) {
        debug!("Resetting tempo analyzer");
        self.dispatcher.reset();
        self.tracker.reset();
    }
}

fn console_line(event: &TempoEvent) -> String {
    format!("beat: {:.6} | bpm: {:.6}", event.beat.seconds_f64(), event.bpm)
}
