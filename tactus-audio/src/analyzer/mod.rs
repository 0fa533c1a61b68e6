//! The analyzers which connect a detector to the incoming stream.
mod dispatcher;
mod pitch;
mod tempo;

pub use dispatcher::{Chunk, FrameDispatcher, HopContext};
pub use pitch::{PitchAnalyzer, PitchEvent};
pub use tempo::{TempoAnalyzer, TempoEvent};

use crate::{config::ConfigError, util::BoxError};

/// Errors which can occur while setting up an analyzer.
#[derive(thiserror::Error, Debug)]
pub enum AnalyzerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Couldn't create the detector: {0}")]
    Detector(#[source] BoxError),
}
