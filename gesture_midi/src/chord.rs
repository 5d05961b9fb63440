//! Two-hand chord selection.
//!
//! Where both wrists sit relative to the body lines picks the harmony
//! (High → G, Mid → C, Low → F); whether they move together picks the
//! quality.  Synchronized hands give the major chord, desynchronized hands
//! give its relative minor.

use std::time::{Duration, Instant};

use dual_hand::{ConfigError, Zone};
use pose_lines::{NormalizedLandmarks, ReferenceLines};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::voice::NoteValue;

// ════════════════════════════════════════════════════════════════════════════
// Chord
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chord {
    CMajor,
    AMinor,
    GMajor,
    EMinor,
    FMajor,
    DMinor,
}

impl Chord {
    /// The chord for a height bucket; `synchronized` picks major over minor.
    pub fn for_bucket(bucket: Zone, synchronized: bool) -> Chord {
        match (bucket, synchronized) {
            (Zone::High, true)  => Chord::GMajor,
            (Zone::High, false) => Chord::EMinor,
            (Zone::Mid,  true)  => Chord::CMajor,
            (Zone::Mid,  false) => Chord::AMinor,
            (Zone::Low,  true)  => Chord::FMajor,
            (Zone::Low,  false) => Chord::DMinor,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Chord::CMajor => "C",
            Chord::AMinor => "Am",
            Chord::GMajor => "G",
            Chord::EMinor => "Em",
            Chord::FMajor => "F",
            Chord::DMinor => "Dm",
        }
    }

    pub fn is_minor(self) -> bool {
        matches!(self, Chord::AMinor | Chord::EMinor | Chord::DMinor)
    }

    /// Root-position triad in the second octave (C2 = 36).
    pub fn notes(self) -> [u8; 3] {
        let root: u8 = match self {
            Chord::CMajor => 36,
            Chord::DMinor => 38,
            Chord::EMinor => 40,
            Chord::FMajor => 41,
            Chord::GMajor => 43,
            Chord::AMinor => 45,
        };
        let third = if self.is_minor() { 3 } else { 4 };
        [root, root + third, root + 7]
    }
}

/// Height bucket of the hands' average: at or above the eye line is High,
/// at or below the mid-torso line is Low.
pub fn bucket(avg_y: f32, lines: &ReferenceLines) -> Zone {
    if avg_y <= lines.eye_y {
        Zone::High
    } else if avg_y >= lines.mid_y {
        Zone::Low
    } else {
        Zone::Mid
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ChordConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChordConfig {
    pub enabled:        bool,
    /// Largest `|yL - yR|` still counted as moving together.
    pub sync_threshold: f32,
    pub cooldown_ms:    u64,
    /// How long each chord is held.
    pub value:          NoteValue,
}

impl Default for ChordConfig {
    fn default() -> Self {
        ChordConfig {
            enabled:        true,
            sync_threshold: 0.15,
            cooldown_ms:    500,
            value:          NoteValue::Half,
        }
    }
}

impl ChordConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.sync_threshold) {
            return Err(ConfigError::OutOfRange { name: "sync_threshold", value: self.sync_threshold });
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ChordSelector
// ════════════════════════════════════════════════════════════════════════════

/// Picks at most one chord per cooldown window.
#[derive(Clone, Debug)]
pub struct ChordSelector {
    cfg:          ChordConfig,
    last_chord_t: Option<Instant>,
}

impl ChordSelector {
    pub fn new(cfg: ChordConfig) -> Self {
        ChordSelector { cfg, last_chord_t: None }
    }

    pub fn config(&self) -> &ChordConfig { &self.cfg }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.cfg.enabled = enabled;
    }

    pub fn reset(&mut self) {
        self.last_chord_t = None;
    }

    /// The chord to play this frame, if any.
    ///
    /// Needs both wrists and all three reference lines; a chord starts the
    /// cooldown window.
    pub fn update(&mut self, lm: &NormalizedLandmarks, now: Instant) -> Option<Chord> {
        if !self.cfg.enabled {
            return None;
        }
        let (y_l, y_r) = lm.wrists()?;
        let lines = lm.lines()?;

        let cooled = self.last_chord_t
            .map_or(true, |t| now.saturating_duration_since(t) >= self.cfg.cooldown());
        if !cooled {
            return None;
        }

        let avg  = (y_l + y_r) / 2.0;
        let diff = (y_l - y_r).abs();
        let chord = Chord::for_bucket(bucket(avg, &lines), diff < self.cfg.sync_threshold);

        debug!(chord = chord.name(), avg, diff, "chord");
        self.last_chord_t = Some(now);
        Some(chord)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
