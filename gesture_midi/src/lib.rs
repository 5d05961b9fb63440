//! # gesture_midi
//!
//! Turns the strikes of a [`dual_hand::GestureEngine`] into musical triggers
//! and sends them to a [`SoundDevice`]:
//!
//! * **Per-hand strike** → drum [`Voice`] (High → open hi-hat, Mid → snare,
//!   Low → tambourine, on the General MIDI percussion channel)
//! * **Both hands** → [`Chord`], chosen by where the hands are and whether
//!   they move together, spaced by a cooldown
//! * **Lead** (optional, [`LeadMode`]) → a melodic note with each drum hit,
//!   pitched by the height of the other wrist
//!
//! ## Quick start
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use dual_hand::{GestureConfig, GestureEngine};
//! use gesture_midi::{ChordConfig, Dispatcher, SoundCall, TraceDevice, Voice};
//! use pose_lines::NormalizedLandmarks;
//!
//! let mut engine = GestureEngine::new(GestureConfig::default());
//! let mut disp   = Dispatcher::new(ChordConfig { enabled: false, ..Default::default() });
//! let mut device = TraceDevice::ready();
//!
//! let frame = |y| NormalizedLandmarks {
//!     y_l: Some(y), y_r: None,
//!     eye_y: Some(0.3), shoulder_y: Some(0.5), mid_y: Some(0.7),
//! };
//! let t0 = Instant::now();
//! disp.process_frame(&mut engine, &frame(0.45), t0, &mut device);
//! disp.process_frame(&mut engine, &frame(0.55), t0 + Duration::from_millis(16), &mut device);
//!
//! assert_eq!(device.calls(), &[SoundCall::Voice { voice: Voice::Mid }]);
//! ```

pub mod chord;
pub mod device;
pub mod dispatch;
pub mod message;
pub mod voice;

pub use chord::{bucket, Chord, ChordConfig, ChordSelector};
pub use device::{Readiness, SoundCall, SoundDevice, TraceDevice};
pub use dispatch::{Dispatcher, Source, TriggerEvent, TriggerKind, LEAD_VALUE};
pub use message::{gain_to_cc, MidiMessage, GM_DRUM_CHANNEL};
pub use voice::{DrumMap, Instrument, LeadMode, NoteValue, Voice, LEAD_SCALE, TICKS_PER_QUARTER};
