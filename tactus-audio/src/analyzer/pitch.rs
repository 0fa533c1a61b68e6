use serde::Serialize;
use tracing::{debug, trace};

use super::{AnalyzerError, Chunk, FrameDispatcher};
use crate::{
    config::PitchConfig,
    detector::{self, DetectorParams, PitchDetector, PitchMethod},
    time::ClockTime,
    util::BoxError,
};

/// The pitch of one hop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PitchEvent {
    /// Stream time of the frame which completed the hop.
    pub time: ClockTime,
    /// Stream index of that frame.
    pub frame: u64,
    /// In the unit of [PitchConfig::unit].
    pub pitch: f32,
}

/// Runs a [PitchDetector] on every hop of the stream.
pub struct PitchAnalyzer<D: PitchDetector> {
    config: PitchConfig,
    dispatcher: FrameDispatcher,
    detector: D,

    last_pitch: Option<PitchEvent>,
}

impl<D: PitchDetector> PitchAnalyzer<D> {
    /// Validates `config` and creates the detector with `build`.
    ///
    /// # Example
    /// ```
    /// use tactus_audio::{detector::dummy::ConstantPitch, Chunk, PitchAnalyzer, PitchConfig};
    ///
    /// let mut analyzer = PitchAnalyzer::new(PitchConfig::default(), |_params| {
    ///     Ok::<_, std::convert::Infallible>(ConstantPitch::new(440.))
    /// })
    /// .unwrap();
    ///
    /// let samples = vec![0f32; 512];
    /// let mut pitches = Vec::new();
    /// analyzer.process(Chunk::new(&samples, 0), |event| pitches.push(event.pitch));
    ///
    /// // the default hop size is 256
    /// assert_eq!(pitches, vec![440., 440.]);
    /// ```
    pub fn new<B, E>(config: PitchConfig, build: B) -> Result<Self, AnalyzerError>
    where
        B: FnOnce(&DetectorParams<PitchMethod>) -> Result<D, E>,
        E: Into<BoxError>,
    {
        let dispatcher = FrameDispatcher::new(&config.stream)?;

        let params = DetectorParams {
            window_size: config.stream.window_size,
            hop_size: config.stream.hop_size,
            sample_rate: config.stream.sample_rate,
            method: config.method,
            tolerance: Some(config.tolerance),
        };
        let detector = detector::build(&params, build).map_err(AnalyzerError::Detector)?;

        debug!(
            "Created pitch analyzer: {:?}, window {}, hop {}, {} Hz",
            config.method, params.window_size, params.hop_size, params.sample_rate
        );

        Ok(Self {
            config,
            dispatcher,
            detector,
            last_pitch: None,
        })
    }

    /// Analyses every completed hop of `chunk` and calls `on_pitch` with each result.
    ///
    /// Returns the samples of the chunk unchanged.
    pub fn process<'a, F>(&mut self, chunk: Chunk<'a>, mut on_pitch: F) -> &'a [f32]
    where
        F: FnMut(PitchEvent),
    {
        let Self {
            config,
            dispatcher,
            detector,
            last_pitch,
        } = self;

        dispatcher.process(chunk, |ctx, hop| {
            let freq = detector.detect_pitch(hop);
            let frame = ctx.frame();

            let event = PitchEvent {
                time: ClockTime::from_frames(frame, config.stream.sample_rate),
                frame,
                pitch: config.unit.convert(freq),
            };

            if !config.silent {
                println!("{}", console_line(&event));
            }

            trace!("pitch {}, freq {:.2}", event.time, freq);

            on_pitch(event);
            *last_pitch = Some(event);
        })
    }

    pub fn config(&self) -> &PitchConfig {
        &self.config
    }

    pub fn set_silent(&mut self, silent: bool) {
        self.config.silent = silent;
    }

    /// The result of the most recently analysed hop.
    pub fn last_pitch(&self) -> Option<PitchEvent> {
        self.last_pitch
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Drops the incomplete hop and restarts the frame count. The detector keeps its state.
    pub fn reset(&mut self) {
        debug!("Resetting pitch analyzer");
        self.dispatcher.reset();
        self.last_pitch = None;
    }
}

fn console_line(event: &PitchEvent) -> String {
    format!("{}\tpitch: {:.3}", event.time, event.pitch)
}
