//! # wrist_drums
//!
//! Play drums and chords by moving your wrists in front of a camera.
//!
//! Pose keypoints arrive one frame at a time (a JSON-lines capture, stdin,
//! or the built-in swing simulator), are normalized against the frame
//! height, and drive one gesture state machine per hand.
//!
//! ## Gesture → Sound mapping
//!
//! | Gesture | Hand | Sound |
//! |---|---|---|
//! | Sweep up past the eye line | Either | Open hi-hat |
//! | Sweep down past the shoulder line | Either | Snare |
//! | Sweep down past the mid-torso line | Either | Tambourine |
//! | Both hands, together | Both | Major chord (G high, C middle, F low) |
//! | Both hands, apart | Both | Relative minor (Em, Am, Dm) |
//! | Raise both hands (optional) | Both | Louder |
//! | Any drum hit, with `lead` on | Other hand | Lead note pitched by its height |
//!
//! Sweeps only count when the wrist moves faster than the configured
//! sensitivity; chords are spaced by a cooldown.
//!
//! ## Output
//!
//! * (default) — **MIDI**: drums on GM channel 10, chords on a melodic
//!   channel, through the first software synthesiser port found.
//! * `--dry-run` — **Trace**: no audio; the calls that would have been made
//!   are printed at the end of the session.

pub mod app;
pub mod error;
pub mod player;
pub mod source;

pub use app::{run, AppConfig, AppState, SessionStats};
pub use error::{AppError, Result};
pub use player::{MidiConfig, MidiSoundDevice};
pub use source::{JsonLinesSource, PoseSource, SimSwingSource, SourceEvent};
