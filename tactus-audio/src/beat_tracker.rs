use serde::Serialize;
use tracing::debug;

use crate::time::{frames_to_seconds, ClockTime, SampleRate};

/// A beat which has been placed on the stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BeatEvent {
    /// Position of the beat in frames since the start of the stream.
    pub position: f64,
    /// Tempo derived from the distance to the previous beat, `0` if there's no usable previous beat.
    pub bpm: f64,
}

impl BeatEvent {
    /// Returns the position of the beat as stream time.
    pub fn time(&self, sample_rate: SampleRate) -> ClockTime {
        ClockTime::from_frames_f64(self.position, sample_rate)
    }
}

/// Places a beat reported for a hop on the stream.
///
/// `index_in_chunk` is the index of the frame which completed the hop, relative
/// to the frame at `chunk_start`. Going back `hop_size - 1` frames from there
/// leads to the first frame of the hop, `raw_fraction` is then applied relative
/// to the preceding hop: `1` keeps the beat at the first frame, `0` moves it one
/// whole hop back.
pub fn beat_position(raw_fraction: f32, chunk_start: u64, index_in_chunk: i64, hop_size: usize) -> f64 {
    let hop_size = hop_size as f64;

    chunk_start as f64 + index_in_chunk as f64 - hop_size
        + 1.
        + (f64::from(raw_fraction) - 1.) * hop_size
}

/// Turns beats reported by a tempo detector into stream positions and keeps
/// a tempo estimate from the distance between consecutive beats.
#[derive(Debug, Clone)]
pub struct BeatTracker {
    hop_size: usize,
    sample_rate: SampleRate,

    last_beat: Option<f64>,
    bpm: f64,
}

impl BeatTracker {
    pub fn new(hop_size: usize, sample_rate: SampleRate) -> Self {
        Self {
            hop_size,
            sample_rate,
            last_beat: None,
            bpm: 0.,
        }
    }

    /// Registers the beat reported for the hop which has been completed by
    /// frame `index_in_chunk` of the chunk starting at `chunk_start`.
    ///
    /// See [beat_position] for how the position is computed.
    pub fn on_beat(&mut self, raw_fraction: f32, chunk_start: u64, index_in_chunk: i64) -> BeatEvent {
        let position = beat_position(raw_fraction, chunk_start, index_in_chunk, self.hop_size);

        self.bpm = match self.last_beat {
            Some(prev) if position > prev => {
                60. / frames_to_seconds(position - prev, self.sample_rate)
            }
            _ => 0.,
        };
        self.last_beat = Some(position);

        BeatEvent {
            position,
            bpm: self.bpm,
        }
    }

    /// The position of the most recent beat.
    pub fn last_beat(&self) -> Option<f64> {
        self.last_beat
    }

    /// The tempo computed for the most recent beat.
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Forgets every beat, as if the tracker has just been created.
    pub fn reset(&mut self) {
        debug!("Resetting beat history");
        self.last_beat = None;
        self.bpm = 0.;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod position {
        use super::*;

        #[test]
        fn full_fraction_at_the_end_of_the_first_hop() {
            assert_eq!(beat_position(1., 0, 255, 256), 0.);
        }

        #[test]
        fn fraction_moves_back_within_the_previous_hop() {
            // first frame of the hop is 256, a fraction of 0.5 goes back half a hop
            assert_eq!(beat_position(0.5, 0, 511, 256), 128.);
            assert_eq!(beat_position(0., 0, 511, 256), 0.);
        }

        #[test]
        fn chunk_start_is_added() {
            assert_eq!(beat_position(1., 44_100, 127, 128), 44_100.);
        }

        #[test]
        fn hop_completed_by_a_carried_frame() {
            assert_eq!(beat_position(1., 1000, -1, 4), 996.);
        }
    }

    #[test]
    fn first_beat_has_no_tempo() {
        let mut tracker = BeatTracker::new(256, 44_100);
        assert_eq!(tracker.hop_size(), 256);
        assert_eq!(tracker.sample_rate(), 44_100);

        let event = tracker.on_beat(1., 0, 255);

        assert_eq!(event, BeatEvent { position: 0., bpm: 0. });
        assert_eq!(tracker.last_beat(), Some(0.));
    }

    #[test]
    fn one_second_apart_is_sixty_bpm() {
        let mut tracker = BeatTracker::new(256, 44_100);
        tracker.on_beat(1., 0, 255);
        let event = tracker.on_beat(1., 44_100, 255);

        assert_eq!(event.position, 44_100.);
        assert_eq!(event.bpm, 60.);
        assert_eq!(tracker.bpm(), 60.);
    }

    #[test]
    fn half_a_second_apart_is_120_bpm() {
        let mut tracker = BeatTracker::new(128, 48_000);
        tracker.on_beat(1., 0, 127);
        let event = tracker.on_beat(1., 24_000, 127);

        assert_eq!(event.bpm, 120.);
        assert_eq!(event.time(48_000), ClockTime::from_nanos(500_000_000));
    }

    #[test]
    fn non_monotonic_beats_reset_the_tempo() {
        let mut tracker = BeatTracker::new(256, 44_100);
        tracker.on_beat(1., 44_100, 255);

        let same = tracker.on_beat(1., 44_100, 255);
        assert_eq!(same.bpm, 0.);

        let earlier = tracker.on_beat(1., 0, 255);
        assert_eq!(earlier.bpm, 0.);
        // the history follows the latest beat nevertheless
        assert_eq!(tracker.last_beat(), Some(0.));

        let later = tracker.on_beat(1., 22_050, 255);
        assert_eq!(later.bpm, 120.);
    }

    #[test]
    fn same_input_and_history_gives_the_same_event() {
        let mut a = BeatTracker::new(512, 44_100);
        let mut b = a.clone();
        a.on_beat(0.3, 1024, 600);
        b.on_beat(0.3, 1024, 600);

        let event_a = a.on_beat(0.7, 40_000, 1023);
        let event_b = b.on_beat(0.7, 40_000, 1023);

        assert_eq!(event_a, event_b);
    }

    #[test]
    fn reset_forgets_the_previous_beat() {
        let mut tracker = BeatTracker::new(256, 44_100);
        tracker.on_beat(1., 0, 255);
        tracker.reset();

        assert_eq!(tracker.last_beat(), None);
        assert_eq!(tracker.on_beat(1., 44_100, 255).bpm, 0.);
    }

    #[test]
    fn negative_positions_map_to_stream_start() {
        let mut tracker = BeatTracker::new(256, 44_100);
        let event = tracker.on_beat(0.5, 0, 255);

        assert_eq!(event.position, -128.);
        assert_eq!(event.time(44_100), ClockTime::ZERO);
    }
}
