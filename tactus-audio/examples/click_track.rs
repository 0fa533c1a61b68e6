//! Synthesises a click track and runs the tempo analyzer over it.
//!
//! ```sh
//! cargo run --example click_track -- --bpm 96 --seconds 8
//! RUST_LOG=tactus_audio=trace cargo run --example click_track
//! ```
use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use tactus_audio::{
    detector::{DetectorParams, OnsetMethod, TempoDetector},
    Chunk, TempoAnalyzer, TempoConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Detects the beats of a synthetic click track")]
struct Cli {
    /// Tempo of the generated clicks.
    #[arg(long, default_value_t = 120.)]
    bpm: f64,

    /// Length of the click track.
    #[arg(long, default_value_t = 5.)]
    seconds: f64,

    /// Amount of frames which the "host" delivers at once.
    #[arg(long, default_value_t = 1000)]
    chunk_frames: usize,

    /// Amount of interleaved channels of the click track.
    #[arg(long, default_value_t = 2)]
    channels: u16,

    /// Load the tempo config from a TOML file instead of using the defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Don't print the per beat console lines of the analyzer.
    #[arg(long)]
    quiet: bool,
}

/// Reports a beat at the first sample of a hop which rises above the threshold
/// after the previous hop stayed below it.
struct ClickDetector {
    threshold: f32,
    above: bool,
}

impl ClickDetector {
    fn new(params: &DetectorParams<OnsetMethod>) -> anyhow::Result<Self> {
        if params.method != OnsetMethod::Energy {
            info!("{:?} isn't available here, detecting clicks by energy", params.method);
        }

        Ok(Self {
            threshold: 0.5,
            above: false,
        })
    }
}

impl TempoDetector for ClickDetector {
    fn detect_beat(&mut self, hop: &[f32]) -> f32 {
        let onset = hop.iter().position(|sample| sample.abs() > self.threshold);
        let was_above = std::mem::replace(&mut self.above, onset.is_some());

        match onset {
            // place the beat at the click: fraction 1 is the first frame of the hop
            Some(idx) if !was_above => 1. + idx as f32 / hop.len() as f32,
            _ => 0.,
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    if cli.bpm <= 0. || cli.seconds <= 0. || cli.chunk_frames == 0 || cli.channels == 0 {
        bail!("bpm, seconds, chunk frames and channels must be positive");
    }

    let mut config = match &cli.config {
        Some(path) => TempoConfig::load(path)?,
        None => TempoConfig::default(),
    };
    config.silent = cli.quiet;
    config.stream.channels = cli.channels;

    let sample_rate = config.stream.sample_rate;
    let samples = click_track(cli.bpm, cli.seconds, sample_rate, cli.channels);
    info!(
        "Generated {:.1}s of clicks at {} bpm ({} Hz, {} channels)",
        cli.seconds, cli.bpm, sample_rate, cli.channels
    );

    let mut analyzer = TempoAnalyzer::new(config, ClickDetector::new)?;

    let chunk_len = cli.chunk_frames * usize::from(cli.channels);
    let mut beats = Vec::new();
    for (idx, chunk) in samples.chunks(chunk_len).enumerate() {
        let offset = (idx * cli.chunk_frames) as u64;
        analyzer.process(Chunk::new(chunk, offset), |event| beats.push(event));
    }

    let tempos: Vec<f64> = beats.iter().map(|event| event.bpm).filter(|&bpm| bpm > 0.).collect();
    if tempos.is_empty() {
        bail!("Couldn't find two consecutive beats");
    }

    let mean = tempos.iter().sum::<f64>() / tempos.len() as f64;
    info!("{} beats, mean tempo {:.3} bpm (expected {})", beats.len(), mean, cli.bpm);

    Ok(())
}

fn click_track(bpm: f64, seconds: f64, sample_rate: u32, channels: u16) -> Vec<f32> {
    let rate = f64::from(sample_rate);
    let frames = (seconds * rate) as usize;
    let period = 60. / bpm * rate;
    let click_len = (rate / 1000.) as usize;

    let mut samples = vec![0f32; frames * usize::from(channels)];
    let mut click = 0.;
    while (click as usize) < frames {
        let start = click as usize;
        for frame in start..(start + click_len).min(frames) {
            let offset = frame * usize::from(channels);
            samples[offset..offset + usize::from(channels)].fill(0.9);
        }

        click += period;
    }

    samples
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or(EnvFilter::builder().parse("click_track=info,tactus_audio=info").unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .init();
}
