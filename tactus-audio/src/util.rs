//! Small helpers which don't belong to a specific module.

/// The error type detector builders are allowed to return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Converts a frequency in Hz to a MIDI note number (with a fractional part).
pub fn freq_to_midi_note(freq: f32) -> f32 {
    12. * (freq / 440.).log2() + 69.
}
