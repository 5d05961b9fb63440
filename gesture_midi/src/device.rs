//! The sound device seam and an in-memory device that records what it was
//! asked to play.

use serde::Serialize;
use tracing::debug;

use crate::chord::Chord;
use crate::voice::{NoteValue, Voice};

/// Anything that can sound drum voices and chords.
///
/// Every call is fire-and-forget: a device that is not ready drops it.
pub trait SoundDevice {
    /// Audio output is started and instruments are loaded.
    fn is_ready(&self) -> bool;
    fn play_voice(&mut self, voice: Voice);
    fn play_chord(&mut self, chord: Chord, value: NoteValue);
    /// One melodic note, voiced like the chords.
    fn play_note(&mut self, note: u8, value: NoteValue);
    /// Output gain in `[0, 1]`.
    fn set_gain(&mut self, gain: f32);
    fn set_muted(&mut self, muted: bool);
}

/// The two steps a device goes through before it will make sound.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Readiness {
    pub audio_started:  bool,
    pub samples_loaded: bool,
}

impl Readiness {
    pub fn is_ready(self) -> bool {
        self.audio_started && self.samples_loaded
    }

    /// Which step is still missing, for log lines.
    pub fn blocker(self) -> Option<&'static str> {
        if !self.audio_started {
            Some("audio not started")
        } else if !self.samples_loaded {
            Some("samples not loaded")
        } else {
            None
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TraceDevice
// ════════════════════════════════════════════════════════════════════════════

/// One accepted device call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum SoundCall {
    Voice { voice: Voice },
    Chord { chord: Chord, value: NoteValue },
    Note  { note: u8, value: NoteValue },
    Gain  { gain: f32 },
    Muted { muted: bool },
}

/// A device with no audio behind it.  Accepted calls are kept in order;
/// calls made before [`TraceDevice::start`] and
/// [`TraceDevice::finish_loading`] are counted and dropped.
#[derive(Clone, Debug, Default)]
pub struct TraceDevice {
    state:   Readiness,
    calls:   Vec<SoundCall>,
    dropped: usize,
}

impl TraceDevice {
    pub fn new() -> Self { Self::default() }

    /// Already started and loaded.
    pub fn ready() -> Self {
        let mut d = Self::default();
        d.start();
        d.finish_loading();
        d
    }

    pub fn start(&mut self)          { self.state.audio_started  = true; }
    pub fn finish_loading(&mut self) { self.state.samples_loaded = true; }

    pub fn calls(&self) -> &[SoundCall]  { &self.calls }
    pub fn dropped(&self) -> usize       { self.dropped }

    /// Hand back the recorded calls, leaving the log empty.
    pub fn take_calls(&mut self) -> Vec<SoundCall> {
        std::mem::take(&mut self.calls)
    }

    fn record(&mut self, call: SoundCall) {
        match self.state.blocker() {
            None => self.calls.push(call),
            Some(why) => {
                debug!(?call, why, "trace device dropped call");
                self.dropped += 1;
            }
        }
    }
}

impl SoundDevice for TraceDevice {
    fn is_ready(&self) -> bool { self.state.is_ready() }

    fn play_voice(&mut self, voice: Voice) {
        self.record(SoundCall::Voice { voice });
    }

    fn play_chord(&mut self, chord: Chord, value: NoteValue) {
        self.record(SoundCall::Chord { chord, value });
    }

    fn play_note(&mut self, note: u8, value: NoteValue) {
        self.record(SoundCall::Note { note: note.min(127), value });
    }

    fn set_gain(&mut self, gain: f32) {
        let gain = if gain.is_nan() { 0.0 } else { gain.clamp(0.0, 1.0) };
        self.record(SoundCall::Gain { gain });
    }

    fn set_muted(&mut self, muted: bool) {
        self.record(SoundCall::Muted { muted });
    }
}
