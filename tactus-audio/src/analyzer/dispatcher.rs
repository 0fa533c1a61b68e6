use tracing::debug;

use crate::{
    config::{ConfigError, StreamConfig},
    hop_accumulator::{HopAccumulator, HopStatus},
};

/// A block of interleaved samples as delivered by the host.
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    pub samples: &'a [f32],
    /// Stream index of the first frame which starts in this chunk. `None` if
    /// the host doesn't know it, the frames are counted by the dispatcher then.
    pub offset: Option<u64>,
}

impl<'a> Chunk<'a> {
    pub fn new(samples: &'a [f32], offset: u64) -> Self {
        Self {
            samples,
            offset: Some(offset),
        }
    }

    pub fn without_offset(samples: &'a [f32]) -> Self {
        Self {
            samples,
            offset: None,
        }
    }
}

/// Where the frame which completed a hop lies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HopContext {
    /// Stream index of the first frame of the chunk.
    pub chunk_start: u64,
    /// Index of the completing frame within the chunk. `-1` if the frame
    /// started in the previous chunk.
    pub index_in_chunk: i64,
}

impl HopContext {
    /// Stream index of the frame which completed the hop.
    pub fn frame(&self) -> u64 {
        self.chunk_start.saturating_add_signed(self.index_in_chunk)
    }
}

/// Walks through the frames of each chunk and feeds the analysed channel into
/// a [HopAccumulator].
#[derive(Debug, Clone)]
pub struct FrameDispatcher {
    accumulator: HopAccumulator,
    channels: usize,
    downmix: bool,

    // samples of a frame which got cut off at the end of the previous chunk
    partial: Vec<f32>,
    // stream index of the next frame which starts in a new chunk
    next_frame: u64,
    frames_processed: u64,
}

impl FrameDispatcher {
    pub fn new(config: &StreamConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let channels = usize::from(config.channels);

        Ok(Self {
            accumulator: HopAccumulator::new(config.hop_size)?,
            channels,
            downmix: config.downmix,
            partial: Vec::with_capacity(channels),
            next_frame: 0,
            frames_processed: 0,
        })
    }

    /// Visits every frame of `chunk` in order and calls `on_hop` with the
    /// completed hop whenever a frame completes one.
    ///
    /// Returns the samples of the chunk unchanged.
    pub fn process<'a, F>(&mut self, chunk: Chunk<'a>, mut on_hop: F) -> &'a [f32]
    where
        F: FnMut(HopContext, &[f32]),
    {
        let samples = chunk.samples;
        let mut rest = samples;

        let carried = !self.partial.is_empty();
        let chunk_start = chunk
            .offset
            .unwrap_or(self.next_frame + u64::from(carried));

        if carried {
            let take = (self.channels - self.partial.len()).min(rest.len());
            self.partial.extend_from_slice(&rest[..take]);
            rest = &rest[take..];

            if self.partial.len() < self.channels {
                return samples;
            }

            let sample = analysis_sample(&self.partial, self.downmix);
            self.partial.clear();
            self.feed(
                sample,
                HopContext {
                    chunk_start,
                    index_in_chunk: -1,
                },
                &mut on_hop,
            );
        }

        let frames = rest.chunks_exact(self.channels);
        let remainder = frames.remainder();
        let frame_count = frames.len() as u64;

        for (idx, frame) in frames.enumerate() {
            let sample = analysis_sample(frame, self.downmix);
            self.feed(
                sample,
                HopContext {
                    chunk_start,
                    index_in_chunk: idx as i64,
                },
                &mut on_hop,
            );
        }

        if !remainder.is_empty() {
            debug!(
                "Chunk ends within a frame, deferring {} of {} samples",
                remainder.len(),
                self.channels
            );
            self.partial.extend_from_slice(remainder);
        }

        self.next_frame = chunk_start + frame_count;
        samples
    }

    fn feed<F>(&mut self, sample: f32, ctx: HopContext, on_hop: &mut F)
    where
        F: FnMut(HopContext, &[f32]),
    {
        self.frames_processed += 1;

        if let HopStatus::Ready(hop) = self.accumulator.write(sample) {
            on_hop(ctx, hop);
        }
    }

    pub fn hop_size(&self) -> usize {
        self.accumulator.hop_size()
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// The amount of frames which have been fed to the accumulator since creation or the last reset.
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Drops incomplete hops and frames and starts counting frames from zero again.
    pub fn reset(&mut self) {
        self.accumulator.reset();
        self.partial.clear();
        self.next_frame = 0;
        self.frames_processed = 0;
    }
}

fn analysis_sample(frame: &[f32], downmix: bool) -> f32 {
    if downmix {
        frame.iter().sum::<f32>() / frame.len() as f32
    } else {
        frame[0]
    }
}
