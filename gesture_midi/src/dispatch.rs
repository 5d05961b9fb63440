//! Per-frame pipeline: strikes and chords out of the engine, calls into a
//! [`SoundDevice`].

use std::time::Instant;

use dual_hand::{GestureEngine, Hand};
use pose_lines::NormalizedLandmarks;
use serde::Serialize;
use tracing::debug;

use crate::chord::{Chord, ChordConfig, ChordSelector};
use crate::device::SoundDevice;
use crate::voice::{LeadMode, NoteValue, Voice};

/// Length of a lead note.
pub const LEAD_VALUE: NoteValue = NoteValue::Quarter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Left,
    Right,
    Both,
}

impl From<Hand> for Source {
    fn from(hand: Hand) -> Self {
        match hand {
            Hand::Left  => Source::Left,
            Hand::Right => Source::Right,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Voice(Voice),
    Chord(Chord),
    /// Melodic note (MIDI number) played alongside a drum hit.
    Lead(u8),
}

/// A musical trigger produced this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TriggerEvent {
    pub source: Source,
    pub kind:   TriggerKind,
}

/// Routes engine output to a sound device.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    chords:  ChordSelector,
    lead:    LeadMode,
    skipped: u64,
}

impl Dispatcher {
    pub fn new(chords: ChordConfig) -> Self {
        Dispatcher { chords: ChordSelector::new(chords), lead: LeadMode::Off, skipped: 0 }
    }

    /// Pair every drum hit with a lead note picked by the other wrist.
    pub fn with_lead(mut self, lead: LeadMode) -> Self {
        self.lead = lead;
        self
    }

    pub fn set_chords_enabled(&mut self, enabled: bool) {
        self.chords.set_enabled(enabled);
    }

    /// Triggers dropped because the device was not ready.
    pub fn skipped(&self) -> u64 { self.skipped }

    pub fn reset(&mut self) {
        self.chords.reset();
        self.skipped = 0;
    }

    /// Run one frame through the engine and the chord selector, sounding
    /// every trigger the device is ready for.
    ///
    /// All triggers are returned, including ones the device dropped; nothing
    /// is queued for later.
    pub fn process_frame<D: SoundDevice + ?Sized>(
        &mut self,
        engine: &mut GestureEngine,
        lm:     &NormalizedLandmarks,
        now:    Instant,
        device: &mut D,
    ) -> Vec<TriggerEvent> {
        let mut events = Vec::new();
        for (hand, strike) in engine.process_frame(lm, now).iter() {
            events.push(TriggerEvent { source: hand.into(), kind: TriggerKind::Voice(strike.zone.into()) });
            if let Some(note) = self.lead_note(hand, lm) {
                events.push(TriggerEvent { source: hand.into(), kind: TriggerKind::Lead(note) });
            }
        }

        if let Some(chord) = self.chords.update(lm, now) {
            events.push(TriggerEvent { source: Source::Both, kind: TriggerKind::Chord(chord) });
        }

        for ev in &events {
            self.sound(ev, device);
        }
        events
    }

    /// The striking hand's partner sets the pitch; a lone hand uses its own
    /// height.
    fn lead_note(&self, hand: Hand, lm: &NormalizedLandmarks) -> Option<u8> {
        let (own, other) = match hand {
            Hand::Left  => (lm.y_l, lm.y_r),
            Hand::Right => (lm.y_r, lm.y_l),
        };
        other.or(own).and_then(|y| self.lead.note_for(y))
    }

    fn sound<D: SoundDevice + ?Sized>(&mut self, ev: &TriggerEvent, device: &mut D) {
        if !device.is_ready() {
            debug!(?ev, "device not ready, trigger skipped");
            self.skipped += 1;
            return;
        }
        match ev.kind {
            TriggerKind::Voice(v) => device.play_voice(v),
            TriggerKind::Chord(c) => device.play_chord(c, self.chords.config().value),
            TriggerKind::Lead(n)  => device.play_note(n, LEAD_VALUE),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{SoundCall, TraceDevice};
    use crate::voice::NoteValue;
    use dual_hand::GestureConfig;
    use std::time::Duration;

    fn lm(y_l: Option<f32>, y_r: Option<f32>) -> NormalizedLandmarks {
        NormalizedLandmarks {
            y_l, y_r,
            eye_y: Some(0.3), shoulder_y: Some(0.5), mid_y: Some(0.7),
        }
    }

    fn no_chords() -> ChordConfig {
        ChordConfig { enabled: false, ..Default::default() }
    }

    #[test]
    fn strike_sounds_matching_voice() {
        let mut engine = GestureEngine::new(GestureConfig::default());
        let mut disp   = Dispatcher::new(no_chords());
        let mut dev    = TraceDevice::ready();
        let t0 = Instant::now();

        disp.process_frame(&mut engine, &lm(None, Some(0.60)), t0, &mut dev);
        let ev = disp.process_frame(&mut engine, &lm(None, Some(0.80)),
                                    t0 + Duration::from_millis(16), &mut dev);

        assert_eq!(ev, vec![TriggerEvent { source: Source::Right, kind: TriggerKind::Voice(Voice::Low) }]);
        assert_eq!(dev.calls(), &[SoundCall::Voice { voice: Voice::Low }]);
    }

    #[test]
    fn not_ready_skips_without_queueing() {
        let mut engine = GestureEngine::new(GestureConfig::default());
        let mut disp   = Dispatcher::new(no_chords());
        let mut dev    = TraceDevice::new();
        let t0 = Instant::now();

        disp.process_frame(&mut engine, &lm(Some(0.45), None), t0, &mut dev);
        let ev = disp.process_frame(&mut engine, &lm(Some(0.55), None),
                                    t0 + Duration::from_millis(16), &mut dev);
        assert_eq!(ev.len(), 1);
        assert_eq!(disp.skipped(), 1);

        // becoming ready later does not replay the missed hit
        dev.start();
        dev.finish_loading();
        disp.process_frame(&mut engine, &lm(Some(0.56), None),
                           t0 + Duration::from_millis(32), &mut dev);
        assert!(dev.calls().is_empty());
    }

    #[test]
    fn both_hands_add_chord() {
        let mut engine = GestureEngine::new(GestureConfig::default());
        let mut disp   = Dispatcher::new(ChordConfig::default());
        let mut dev    = TraceDevice::ready();

        let ev = disp.process_frame(&mut engine, &lm(Some(0.50), Some(0.52)), Instant::now(), &mut dev);
        assert_eq!(ev, vec![TriggerEvent { source: Source::Both, kind: TriggerKind::Chord(Chord::CMajor) }]);
        assert_eq!(dev.calls(), &[SoundCall::Chord { chord: Chord::CMajor, value: NoteValue::Half }]);
    }

    #[test]
    fn voices_before_chord() {
        let mut engine = GestureEngine::new(GestureConfig::default());
        let mut disp   = Dispatcher::new(ChordConfig::default());
        let mut dev    = TraceDevice::ready();
        let t0 = Instant::now();

        // one hand only: no chord yet
        disp.process_frame(&mut engine, &lm(Some(0.45), None), t0, &mut dev);
        let ev = disp.process_frame(&mut engine, &lm(Some(0.55), Some(0.56)),
                                    t0 + Duration::from_millis(16), &mut dev);
        let kinds: Vec<TriggerKind> = ev.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![TriggerKind::Voice(Voice::Mid), TriggerKind::Chord(Chord::CMajor)]);
    }

    #[test]
    fn lead_follows_the_other_wrist() {
        let mut engine = GestureEngine::new(GestureConfig::default());
        let mut disp   = Dispatcher::new(no_chords()).with_lead(LeadMode::Scale);
        let mut dev    = TraceDevice::ready();
        let t0 = Instant::now();

        // right hand sweeps down past the shoulders, left wrist held at the top
        disp.process_frame(&mut engine, &lm(Some(0.0), Some(0.45)), t0, &mut dev);
        let ev = disp.process_frame(&mut engine, &lm(Some(0.0), Some(0.55)),
                                    t0 + Duration::from_millis(16), &mut dev);
        assert_eq!(ev, vec![
            TriggerEvent { source: Source::Right, kind: TriggerKind::Voice(Voice::Mid) },
            TriggerEvent { source: Source::Right, kind: TriggerKind::Lead(60) },
        ]);
        assert_eq!(dev.calls(), &[
            SoundCall::Voice { voice: Voice::Mid },
            SoundCall::Note { note: 60, value: LEAD_VALUE },
        ]);
    }

    #[test]
    fn lone_hand_leads_itself() {
        let mut engine = GestureEngine::new(GestureConfig::default());
        let mut disp   = Dispatcher::new(no_chords()).with_lead(LeadMode::Glide);
        let mut dev    = TraceDevice::ready();
        let t0 = Instant::now();

        disp.process_frame(&mut engine, &lm(None, Some(0.60)), t0, &mut dev);
        let ev = disp.process_frame(&mut engine, &lm(None, Some(0.80)),
                                    t0 + Duration::from_millis(16), &mut dev);
        let expected = LeadMode::Glide.note_for(0.80).unwrap();
        assert_eq!(ev[1].kind, TriggerKind::Lead(expected));
    }

    #[test]
    fn lead_off_by_default() {
        let mut engine = GestureEngine::new(GestureConfig::default());
        let mut disp   = Dispatcher::new(no_chords());
        let mut dev    = TraceDevice::ready();
        let t0 = Instant::now();

        disp.process_frame(&mut engine, &lm(Some(0.2), Some(0.45)), t0, &mut dev);
        let ev = disp.process_frame(&mut engine, &lm(Some(0.2), Some(0.55)),
                                    t0 + Duration::from_millis(16), &mut dev);
        assert!(ev.iter().all(|e| !matches!(e.kind, TriggerKind::Lead(_))));
    }

    #[test]
    fn missing_eye_line_is_silent() {
        let mut engine = GestureEngine::new(GestureConfig::default());
        let mut disp   = Dispatcher::new(ChordConfig::default());
        let mut dev    = TraceDevice::ready();
        let t0 = Instant::now();

        let mut a = lm(Some(0.2), Some(0.9));
        a.eye_y = None;
        let mut b = lm(Some(0.9), Some(0.2));
        b.eye_y = None;
        disp.process_frame(&mut engine, &a, t0, &mut dev);
        let ev = disp.process_frame(&mut engine, &b, t0 + Duration::from_millis(16), &mut dev);
        assert!(ev.is_empty());
        assert!(dev.calls().is_empty());
    }
}
