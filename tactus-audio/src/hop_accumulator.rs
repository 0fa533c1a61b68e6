use crate::config::ConfigError;

/// What happened to the sample passed to [HopAccumulator::write].
#[derive(Debug, PartialEq)]
pub enum HopStatus<'a> {
    /// The sample completed a hop. Contains the whole hop in stream order.
    Ready(&'a [f32]),
    /// The hop still needs more samples.
    Pending,
}

impl HopStatus<'_> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Collects single samples into a window of `hop_size` samples.
///
/// Signals exactly once for every `hop_size` writes, no matter how the caller
/// slices its input.
#[derive(Debug, Clone)]
pub struct HopAccumulator {
    window: Box<[f32]>,
    // index of the next write, always within `0..window.len()`
    pos: usize,
}

impl HopAccumulator {
    /// Creates an accumulator for hops of `hop_size` samples.
    pub fn new(hop_size: usize) -> Result<Self, ConfigError> {
        if hop_size == 0 {
            return Err(ConfigError::ZeroHopSize);
        }

        Ok(Self {
            window: vec![0f32; hop_size].into_boxed_slice(),
            pos: 0,
        })
    }

    /// Stores `sample` in the current hop.
    pub fn write(&mut self, sample: f32) -> HopStatus<'_> {
        self.window[self.pos] = sample;

        if self.pos == self.window.len() - 1 {
            self.pos = 0;
            HopStatus::Ready(&self.window)
        } else {
            self.pos += 1;
            HopStatus::Pending
        }
    }

    pub fn hop_size(&self) -> usize {
        self.window.len()
    }

    /// The amount of samples of the current, incomplete hop.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Drops the incomplete hop.
    pub fn reset(&mut self) {
        self.window.fill(0.);
        self.pos = 0;
    }
}
