//! Real-time General MIDI sound device.
//!
//! Note-ons are written as soon as a trigger arrives; the matching note-offs
//! are timed by a playback thread so the frame loop never sleeps.  Drums go
//! to the GM percussion channel, chords to a melodic channel.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use gesture_midi::{
    Chord, DrumMap, Instrument, MidiMessage, NoteValue, Readiness, SoundDevice, Voice,
    GM_DRUM_CHANNEL,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};

// ════════════════════════════════════════════════════════════════════════════
// MidiConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiConfig {
    /// Zero-based; 9 is GM channel 10.
    pub drum_channel:  u8,
    pub chord_channel: u8,
    pub instrument:    Instrument,
    pub drums:         DrumMap,
    /// Note-on velocity, 1–127.
    pub velocity:      u8,
    pub tempo_bpm:     u32,
    /// How long a drum hit sounds.
    pub drum_value:    NoteValue,
    /// Case-insensitive substring of the output port to prefer.
    pub port_hint:     Option<String>,
}

impl Default for MidiConfig {
    fn default() -> Self {
        MidiConfig {
            drum_channel:  GM_DRUM_CHANNEL,
            chord_channel: 0,
            instrument:    Instrument::default(),
            drums:         DrumMap::default(),
            velocity:      100,
            tempo_bpm:     120,
            drum_value:    NoteValue::Eighth,
            port_hint:     None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MidiOut — abstraction over midir / null
// ════════════════════════════════════════════════════════════════════════════

pub trait MidiOut: Send {
    fn send(&mut self, msg: MidiMessage);
}

// ── midir backend ─────────────────────────────────────────────────────────

struct MidirOut {
    conn: midir::MidiOutputConnection,
}

impl MidiOut for MidirOut {
    fn send(&mut self, msg: MidiMessage) {
        if let Err(e) = self.conn.send(&msg.to_bytes()) {
            debug!(error = %e, ?msg, "MIDI send failed");
        }
    }
}

// ── null backend (used when no MIDI port is available) ────────────────────

pub struct NullOut;

impl MidiOut for NullOut {
    fn send(&mut self, _msg: MidiMessage) {}
}

// ════════════════════════════════════════════════════════════════════════════
// Port selection
// ════════════════════════════════════════════════════════════════════════════

/// Names of the visible MIDI output ports.
pub fn list_ports() -> Result<Vec<String>> {
    let midi_out = midir::MidiOutput::new("wrist_drums")
        .map_err(|e| AppError::Midi(e.to_string()))?;
    Ok(midi_out.ports().iter()
        .map(|p| midi_out.port_name(p).unwrap_or_else(|_| "Unknown".to_string()))
        .collect())
}

/// Index of the port to open: the first matching `hint`, else the first
/// that looks like a software synthesiser, else the first.
fn pick_port(names: &[String], hint: Option<&str>) -> Option<usize> {
    const SOFT_SYNTHS: [&str; 5] = ["fluid", "timidity", "microsoft", "gm", "synth"];

    if names.is_empty() {
        return None;
    }
    let lower: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
    hint.map(str::to_lowercase)
        .and_then(|h| lower.iter().position(|n| n.contains(h.as_str())))
        .or_else(|| lower.iter().position(|n| SOFT_SYNTHS.iter().any(|s| n.contains(s))))
        .or(Some(0))
}

fn connect(hint: Option<&str>) -> Result<Box<dyn MidiOut>> {
    let midi_out = midir::MidiOutput::new("wrist_drums")
        .map_err(|e| AppError::Midi(e.to_string()))?;
    let ports = midi_out.ports();
    let names: Vec<String> = ports.iter()
        .map(|p| midi_out.port_name(p).unwrap_or_else(|_| "Unknown".to_string()))
        .collect();

    let idx = pick_port(&names, hint)
        .ok_or_else(|| AppError::Midi("no MIDI output ports found".into()))?;
    info!(port = %names[idx], "opening MIDI port");
    let conn = midi_out.connect(&ports[idx], "wrist-drums-out")
        .map_err(|e| AppError::Midi(e.to_string()))?;
    Ok(Box::new(MidirOut { conn }))
}

/// Open the preferred MIDI output, falling back to [`NullOut`].
fn open_midi_output(hint: Option<&str>) -> Box<dyn MidiOut> {
    match connect(hint) {
        Ok(out) => out,
        Err(e) => {
            warn!(error = %e, "using null MIDI output");
            warn!("install a synthesiser such as `fluidsynth` or `timidity -iA` to hear output");
            Box::new(NullOut)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Playback thread
// ════════════════════════════════════════════════════════════════════════════

enum PlayerCommand {
    /// Send now.
    Send(MidiMessage),
    /// Note-on now, note-off after `hold`.
    Note { channel: u8, note: u8, velocity: u8, hold: Duration },
    /// Release everything sounding and exit.
    Quit,
}

fn player_thread(mut out: Box<dyn MidiOut>, rx: Receiver<PlayerCommand>, channels: [u8; 2]) {
    // (due, channel, note)
    let mut pending: Vec<(Instant, u8, u8)> = Vec::new();

    loop {
        let cmd = match pending.iter().map(|p| p.0).min() {
            None      => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            Some(due) => rx.recv_timeout(due.saturating_duration_since(Instant::now())),
        };

        match cmd {
            Ok(PlayerCommand::Send(msg)) => out.send(msg),
            Ok(PlayerCommand::Note { channel, note, velocity, hold }) => {
                // a retriggered note keeps sounding until its latest release
                pending.retain(|&(_, c, n)| !(c == channel && n == note));
                out.send(MidiMessage::NoteOn { channel, note, velocity });
                pending.push((Instant::now() + hold, channel, note));
            }
            Ok(PlayerCommand::Quit) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        let now = Instant::now();
        pending.retain(|&(due, channel, note)| {
            if due <= now {
                out.send(MidiMessage::NoteOff { channel, note });
                false
            } else {
                true
            }
        });
    }

    for (_, channel, note) in pending.drain(..) {
        out.send(MidiMessage::NoteOff { channel, note });
    }
    for ch in channels {
        out.send(MidiMessage::all_notes_off(ch));
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MidiSoundDevice
// ════════════════════════════════════════════════════════════════════════════

/// [`SoundDevice`] that plays through a MIDI output port.
///
/// Lifecycle: [`start`](Self::start) opens the port and the playback thread,
/// [`load`](Self::load) selects the chord instrument, and
/// [`dispose`](Self::dispose) (or drop) releases every sounding note and
/// joins the thread.
pub struct MidiSoundDevice {
    cfg:       MidiConfig,
    state:     Readiness,
    tx:        Option<Sender<PlayerCommand>>,
    handle:    Option<JoinHandle<()>>,
    gain:      f32,
    muted:     bool,
}

impl MidiSoundDevice {
    pub fn new(cfg: MidiConfig) -> Self {
        MidiSoundDevice {
            cfg,
            state:  Readiness::default(),
            tx:     None,
            handle: None,
            gain:   1.0,
            muted:  false,
        }
    }

    /// Open the configured port (or the null output) and start playback.
    pub fn start(&mut self) {
        let out = open_midi_output(self.cfg.port_hint.as_deref());
        self.start_with(out);
    }

    /// Start playback on an already-open output.
    pub fn start_with(&mut self, out: Box<dyn MidiOut>) {
        if self.state.audio_started {
            return;
        }
        let (tx, rx) = mpsc::channel();
        let channels = [self.cfg.drum_channel, self.cfg.chord_channel];
        self.handle = Some(thread::spawn(move || player_thread(out, rx, channels)));
        self.tx = Some(tx);
        self.state.audio_started = true;
        info!("MIDI playback started");
        if self.state.samples_loaded {
            self.send_setup();
        }
    }

    /// Select the chord instrument and apply the current gain.
    pub fn load(&mut self) {
        self.state.samples_loaded = true;
        if self.state.audio_started {
            self.send_setup();
        }
        info!(instrument = self.cfg.instrument.name(), "instruments loaded");
    }

    /// Stop playback and join the thread.  Safe to call more than once.
    pub fn dispose(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(PlayerCommand::Quit);
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("MIDI playback thread panicked");
            }
        }
        self.state = Readiness::default();
    }

    fn send_setup(&self) {
        self.send(PlayerCommand::Send(MidiMessage::ProgramChange {
            channel: self.cfg.chord_channel,
            program: self.cfg.instrument.program(),
        }));
        self.send_volume();
    }

    fn send_volume(&self) {
        let gain = if self.muted { 0.0 } else { self.gain };
        for channel in [self.cfg.drum_channel, self.cfg.chord_channel] {
            self.send(PlayerCommand::Send(MidiMessage::volume(channel, gain)));
        }
    }

    fn send(&self, cmd: PlayerCommand) {
        if let Some(tx) = &self.tx {
            if tx.send(cmd).is_err() {
                warn!("MIDI playback thread is gone");
            }
        }
    }

    fn hold(&self, value: NoteValue) -> Duration {
        Duration::from_millis(value.millis(self.cfg.tempo_bpm))
    }

    fn ready_or_log(&self, what: &str) -> bool {
        match self.state.blocker() {
            None => true,
            Some(why) => {
                debug!(call = what, why, "MIDI device not ready");
                false
            }
        }
    }
}

impl SoundDevice for MidiSoundDevice {
    fn is_ready(&self) -> bool { self.state.is_ready() }

    fn play_voice(&mut self, voice: Voice) {
        if !self.ready_or_log("play_voice") {
            return;
        }
        self.send(PlayerCommand::Note {
            channel:  self.cfg.drum_channel,
            note:     self.cfg.drums.note_for(voice),
            velocity: self.cfg.velocity.clamp(1, 127),
            hold:     self.hold(self.cfg.drum_value),
        });
    }

    fn play_chord(&mut self, chord: Chord, value: NoteValue) {
        if !self.ready_or_log("play_chord") {
            return;
        }
        let hold = self.hold(value);
        for note in chord.notes() {
            self.send(PlayerCommand::Note {
                channel:  self.cfg.chord_channel,
                note,
                velocity: self.cfg.velocity.clamp(1, 127),
                hold,
            });
        }
    }

    /// Lead notes share the chord channel and instrument.
    fn play_note(&mut self, note: u8, value: NoteValue) {
        if !self.ready_or_log("play_note") {
            return;
        }
        self.send(PlayerCommand::Note {
            channel:  self.cfg.chord_channel,
            note:     note.min(127),
            velocity: self.cfg.velocity.clamp(1, 127),
            hold:     self.hold(value),
        });
    }

    /// The gain is remembered even when not ready and applied on
    /// [`load`](MidiSoundDevice::load).
    fn set_gain(&mut self, gain: f32) {
        self.gain = if gain.is_nan() { 0.0 } else { gain.clamp(0.0, 1.0) };
        if self.ready_or_log("set_gain") {
            self.send_volume();
        }
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if self.ready_or_log("set_muted") {
            self.send_volume();
        }
    }
}

impl Drop for MidiSoundDevice {
    fn drop(&mut self) {
        self.dispose();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Output that keeps every message for inspection.
    #[derive(Clone, Default)]
    struct Recording(Arc<Mutex<Vec<MidiMessage>>>);

    impl MidiOut for Recording {
        fn send(&mut self, msg: MidiMessage) {
            self.0.lock().unwrap().push(msg);
        }
    }

    impl Recording {
        fn messages(&self) -> Vec<MidiMessage> {
            self.0.lock().unwrap().clone()
        }
    }

    fn ready_device() -> (MidiSoundDevice, Recording) {
        let rec = Recording::default();
        let mut dev = MidiSoundDevice::new(MidiConfig::default());
        dev.start_with(Box::new(rec.clone()));
        dev.load();
        (dev, rec)
    }

    #[test]
    fn setup_selects_instrument_and_volume() {
        let (mut dev, rec) = ready_device();
        dev.dispose();
        let msgs = rec.messages();
        assert_eq!(msgs[0], MidiMessage::ProgramChange { channel: 0, program: 48 });
        assert_eq!(msgs[1], MidiMessage::volume(9, 1.0));
        assert_eq!(msgs[2], MidiMessage::volume(0, 1.0));
    }

    #[test]
    fn drum_hit_on_percussion_channel() {
        let (mut dev, rec) = ready_device();
        dev.play_voice(Voice::Mid);
        dev.dispose();
        let msgs = rec.messages();
        assert!(msgs.contains(&MidiMessage::NoteOn { channel: 9, note: 38, velocity: 100 }));
        let offs = msgs.iter()
            .filter(|m| **m == MidiMessage::NoteOff { channel: 9, note: 38 })
            .count();
        assert_eq!(offs, 1);
    }

    #[test]
    fn chord_is_a_triad() {
        let (mut dev, rec) = ready_device();
        dev.play_chord(Chord::AMinor, NoteValue::Half);
        dev.dispose();
        let ons: Vec<u8> = rec.messages().iter()
            .filter_map(|m| match m {
                MidiMessage::NoteOn { channel: 0, note, .. } => Some(*note),
                _ => None,
            })
            .collect();
        assert_eq!(ons, Chord::AMinor.notes().to_vec());
    }

    #[test]
    fn lead_note_on_chord_channel() {
        let (mut dev, rec) = ready_device();
        dev.play_note(60, NoteValue::Quarter);
        dev.dispose();
        let msgs = rec.messages();
        assert!(msgs.contains(&MidiMessage::NoteOn { channel: 0, note: 60, velocity: 100 }));
        assert!(msgs.contains(&MidiMessage::NoteOff { channel: 0, note: 60 }));
    }

    #[test]
    fn note_off_arrives_after_hold() {
        let rec = Recording::default();
        let mut dev = MidiSoundDevice::new(MidiConfig { tempo_bpm: 600, ..Default::default() });
        dev.start_with(Box::new(rec.clone()));
        dev.load();
        // eighth at 600 bpm = 50 ms
        dev.play_voice(Voice::High);
        thread::sleep(Duration::from_millis(400));
        assert!(rec.messages().contains(&MidiMessage::NoteOff { channel: 9, note: 46 }));
        dev.dispose();
    }

    #[test]
    fn mute_restores_gain() {
        let (mut dev, rec) = ready_device();
        dev.set_gain(0.5);
        dev.set_muted(true);
        dev.set_muted(false);
        dev.dispose();
        let drum_volumes: Vec<MidiMessage> = rec.messages().into_iter()
            .filter(|m| matches!(m, MidiMessage::ControlChange { channel: 9, controller: 7, .. }))
            .collect();
        assert_eq!(drum_volumes, vec![
            MidiMessage::volume(9, 1.0),
            MidiMessage::volume(9, 0.5),
            MidiMessage::volume(9, 0.0),
            MidiMessage::volume(9, 0.5),
        ]);
    }

    #[test]
    fn silent_before_load() {
        let rec = Recording::default();
        let mut dev = MidiSoundDevice::new(MidiConfig::default());
        dev.start_with(Box::new(rec.clone()));
        assert!(!dev.is_ready());
        dev.play_voice(Voice::Low);
        dev.dispose();
        assert!(!rec.messages().iter().any(|m| matches!(m, MidiMessage::NoteOn { .. })));
    }

    #[test]
    fn dispose_is_idempotent_and_releases() {
        let (mut dev, rec) = ready_device();
        dev.play_chord(Chord::CMajor, NoteValue::Whole);
        dev.dispose();
        dev.dispose();
        assert!(!dev.is_ready());
        let msgs = rec.messages();
        assert!(msgs.contains(&MidiMessage::all_notes_off(9)));
        assert!(msgs.contains(&MidiMessage::all_notes_off(0)));
    }

    #[test]
    fn port_preference() {
        let names = vec!["Midi Through".to_string(), "FLUID Synth (1234)".to_string()];
        assert_eq!(pick_port(&names, None), Some(1));
        assert_eq!(pick_port(&names, Some("through")), Some(0));
        assert_eq!(pick_port(&names, Some("nope")), Some(1));
        assert_eq!(pick_port(&[], None), None);
    }
}
