//! Continuous wrist mappings: height → volume, pitch, or a discrete step.
//!
//! These complement the discrete triggers of the gesture engine; a raised
//! hand (small `y`) always means "more": louder, higher, further along.

/// Lowest pitch of the wrist range, at the bottom of the frame (A2).
pub const BOTTOM_HZ: f32 = 110.0;
/// Highest pitch of the wrist range, at the top of the frame (A5).
pub const TOP_HZ: f32 = 880.0;

/// `y = 0` (top) → `1.0`, `y = 1` (bottom) → `0.0`.
pub fn y_to_volume(y: f32) -> f32 {
    (1.0 - y).clamp(0.0, 1.0)
}

/// Linear pitch between [`BOTTOM_HZ`] and [`TOP_HZ`].
pub fn y_to_pitch_hz(y: f32) -> f32 {
    let t = y_to_volume(y);
    BOTTOM_HZ + (TOP_HZ - BOTTOM_HZ) * t
}

/// Nearest MIDI note number for a frequency (A4 = 440 Hz = 69).
pub fn hz_to_midi_note(hz: f32) -> u8 {
    if !(hz > 0.0) { return 0; }
    let n = 69.0 + 12.0 * (hz / 440.0).log2();
    n.round().clamp(0.0, 127.0) as u8
}

/// Index of one of `steps` evenly spaced positions, `0` at the bottom.
///
/// Same rounding as a slider over a note list: `round(t · (steps − 1))`.
pub fn y_to_step(y: f32, steps: usize) -> usize {
    if steps == 0 { return 0; }
    let t = y_to_volume(y);
    ((t * (steps - 1) as f32).round() as usize).min(steps - 1)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
