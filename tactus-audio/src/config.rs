//! Configuration of the analyzers.
//!
//! Every config can be read from and written to TOML. Missing keys fall back to
//! the defaults of the respective analyzer. The stream layout lives in its own
//! `[stream]` table which, if present, has to be complete.
use std::{io, path::Path};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::{
    detector::{BeatConvention, OnsetMethod, PitchMethod, PitchUnit},
    time::SampleRate,
    DEFAULT_SAMPLE_RATE,
};

/// Raised when a configuration can't be loaded or doesn't describe a usable stream.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("The hop size must be greater than 0")]
    ZeroHopSize,

    #[error("The sample rate must be greater than 0")]
    ZeroSampleRate,

    #[error("The stream must have at least one channel")]
    ZeroChannels,

    #[error("The window size ({window_size}) must not be smaller than the hop size ({hop_size})")]
    WindowSmallerThanHop { window_size: usize, hop_size: usize },

    #[error(transparent)]
    IO(#[from] io::Error),

    #[error(transparent)]
    Serde(#[from] toml::de::Error),
}

/// The fixed layout of the analysed stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// The amount of samples the detector looks at for each analysis.
    pub window_size: usize,

    /// The amount of frames between two analyses.
    pub hop_size: usize,

    pub sample_rate: SampleRate,

    /// The amount of interleaved channels of the incoming chunks.
    pub channels: u16,

    /// Analyse the mean of all channels instead of only the first one.
    #[serde(default)]
    pub downmix: bool,
}

impl StreamConfig {
    fn with_sizes(window_size: usize, hop_size: usize) -> Self {
        Self {
            window_size,
            hop_size,
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: 1,
            downmix: false,
        }
    }

    /// Checks that the layout can be processed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hop_size == 0 {
            return Err(ConfigError::ZeroHopSize);
        }

        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }

        if self.channels == 0 {
            return Err(ConfigError::ZeroChannels);
        }

        if self.window_size < self.hop_size {
            return Err(ConfigError::WindowSmallerThanHop {
                window_size: self.window_size,
                hop_size: self.hop_size,
            });
        }

        Ok(())
    }
}

/// Config of the [crate::PitchAnalyzer].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchConfig {
    /// Don't print a line to stdout for each result.
    pub silent: bool,

    pub method: PitchMethod,

    pub unit: PitchUnit,

    /// Passed to the detector, its meaning depends on [PitchConfig::method].
    pub tolerance: f32,

    pub stream: StreamConfig,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            silent: true,
            method: PitchMethod::default(),
            unit: PitchUnit::default(),
            tolerance: 0.7,
            stream: StreamConfig::with_sizes(2048, 256),
        }
    }
}

/// Config of the [crate::TempoAnalyzer].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TempoConfig {
    /// Don't print a line to stdout for each beat.
    pub silent: bool,

    /// Hand a [crate::TempoEvent] to the caller for each beat.
    pub emit_events: bool,

    pub method: OnsetMethod,

    /// How the raw output of the tempo detector has to be read.
    pub convention: BeatConvention,

    pub stream: StreamConfig,
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            silent: true,
            emit_events: true,
            method: OnsetMethod::default(),
            convention: BeatConvention::default(),
            stream: StreamConfig::with_sizes(1024, 128),
        }
    }
}

macro_rules! impl_toml_io {
    ($config:ty) => {
        impl $config {
            /// Parses the config from a TOML document.
            pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
                parse(content)
            }

            /// Reads the config from the given file.
            pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
                let path = path.as_ref();
                debug!("Loading config from {}", path.display());

                let content = std::fs::read_to_string(path)?;
                parse(&content)
            }

            /// Writes the config to the given file.
            pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
                let string = toml::to_string(self)
                    .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

                std::fs::write(path, string)
            }
        }
    };
}

impl_toml_io!(PitchConfig);
impl_toml_io!(TempoConfig);

fn parse<C: DeserializeOwned>(content: &str) -> Result<C, ConfigError> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod stream {
        use super::*;

        #[test]
        fn defaults_are_valid() {
            assert!(PitchConfig::default().stream.validate().is_ok());
            assert!(TempoConfig::default().stream.validate().is_ok());
        }

        #[test]
        fn zero_hop_size() {
            let mut config = TempoConfig::default().stream;
            config.hop_size = 0;

            assert!(matches!(config.validate(), Err(ConfigError::ZeroHopSize)));
        }

        #[test]
        fn zero_sample_rate() {
            let mut config = TempoConfig::default().stream;
            config.sample_rate = 0;

            assert!(matches!(config.validate(), Err(ConfigError::ZeroSampleRate)));
        }

        #[test]
        fn zero_channels() {
            let mut config = PitchConfig::default().stream;
            config.channels = 0;

            assert!(matches!(config.validate(), Err(ConfigError::ZeroChannels)));
        }

        #[test]
        fn window_smaller_than_hop() {
            let mut config = PitchConfig::default().stream;
            config.window_size = 128;

            assert!(matches!(
                config.validate(),
                Err(ConfigError::WindowSmallerThanHop {
                    window_size: 128,
                    hop_size: 256
                })
            ));
        }
    }

    #[test]
    fn tempo_defaults() {
        let config = TempoConfig::default();

        assert_eq!(config.stream.window_size, 1024);
        assert_eq!(config.stream.hop_size, 128);
        assert_eq!(config.stream.sample_rate, 44_100);
        assert_eq!(config.stream.channels, 1);
        assert!(config.silent);
        assert!(config.emit_events);
        assert_eq!(config.method, OnsetMethod::Kl);
        assert_eq!(config.convention, BeatConvention::Fraction);
    }

    #[test]
    fn pitch_defaults() {
        let config = PitchConfig::default();

        assert_eq!(config.stream.window_size, 2048);
        assert_eq!(config.stream.hop_size, 256);
        assert!(config.silent);
        assert_eq!(config.method, PitchMethod::YinFft);
        assert_eq!(config.unit, PitchUnit::Hz);
        assert_eq!(config.tolerance, 0.7);
    }

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(TempoConfig::from_toml_str("").unwrap(), TempoConfig::default());
        assert_eq!(PitchConfig::from_toml_str("").unwrap(), PitchConfig::default());
    }

    #[test]
    fn partial_document() {
        let config = TempoConfig::from_toml_str(
            r#"
            silent = false
            method = "specflux"
            convention = "flag"

            [stream]
            hop_size = 256
            window_size = 512
            sample_rate = 48000
            channels = 2
            downmix = true
            "#,
        )
        .unwrap();

        assert!(!config.silent);
        assert!(config.emit_events);
        assert_eq!(config.stream.hop_size, 256);
        assert_eq!(config.stream.window_size, 512);
        assert_eq!(config.stream.sample_rate, 48_000);
        assert_eq!(config.stream.channels, 2);
        assert!(config.stream.downmix);
        assert_eq!(config.method, OnsetMethod::SpecFlux);
        assert_eq!(config.convention, BeatConvention::Flag);
    }

    #[test]
    fn incomplete_stream_table_is_rejected() {
        let result = TempoConfig::from_toml_str("[stream]\nhop_size = 64");
        assert!(matches!(result, Err(ConfigError::Serde(_))));
    }

    #[test]
    fn unknown_method_is_rejected() {
        let result = PitchConfig::from_toml_str(r#"method = "autocorrelation""#);
        assert!(matches!(result, Err(ConfigError::Serde(_))));
    }

    #[test]
    fn save_and_load() {
        let path = std::env::temp_dir().join(format!("tactus-pitch-{}.toml", std::process::id()));
        let config = PitchConfig {
            unit: PitchUnit::Midi,
            silent: false,
            ..Default::default()
        };

        config.save(&path).unwrap();
        let loaded = PitchConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn load_missing_file() {
        let result = TempoConfig::load("/this/path/does/not/exist.toml");
        assert!(matches!(result, Err(ConfigError::IO(_))));
    }
}
