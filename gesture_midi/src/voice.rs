//! Drum voices, their General MIDI percussion notes, note values and the
//! melodic instruments a chord can be voiced on.

use dual_hand::Zone;
use pose_lines::{hz_to_midi_note, y_to_pitch_hz, y_to_step};
use serde::{Deserialize, Serialize};

/// Ticks per quarter note used for every duration calculation.
pub const TICKS_PER_QUARTER: u32 = 480;

// ════════════════════════════════════════════════════════════════════════════
// Voice — one drum sound per zone
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Voice {
    Low,
    Mid,
    High,
}

impl Voice {
    pub fn name(self) -> &'static str {
        match self {
            Voice::Low  => "low",
            Voice::Mid  => "mid",
            Voice::High => "high",
        }
    }
}

impl From<Zone> for Voice {
    fn from(zone: Zone) -> Self {
        match zone {
            Zone::High => Voice::High,
            Zone::Mid  => Voice::Mid,
            Zone::Low  => Voice::Low,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DrumMap — Voice → GM percussion key
// ════════════════════════════════════════════════════════════════════════════

/// General MIDI percussion key for each voice (channel 10).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrumMap {
    pub low:  u8,
    pub mid:  u8,
    pub high: u8,
}

impl Default for DrumMap {
    /// Tambourine, acoustic snare, open hi-hat.
    fn default() -> Self {
        DrumMap { low: 54, mid: 38, high: 46 }
    }
}

impl DrumMap {
    pub fn note_for(&self, voice: Voice) -> u8 {
        let note = match voice {
            Voice::Low  => self.low,
            Voice::Mid  => self.mid,
            Voice::High => self.high,
        };
        note.min(127)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// NoteValue — musical durations ("8n", "2n", ...)
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteValue {
    #[serde(rename = "32n")] ThirtySecond,
    #[serde(rename = "16n")] Sixteenth,
    #[serde(rename = "8n")]  Eighth,
    #[serde(rename = "4n")]  Quarter,
    #[serde(rename = "2n")]  Half,
    #[serde(rename = "1n")]  Whole,
}

impl NoteValue {
    /// Notation string, e.g. `"8n"` for an eighth note.
    pub fn notation(self) -> &'static str {
        match self {
            NoteValue::ThirtySecond => "32n",
            NoteValue::Sixteenth    => "16n",
            NoteValue::Eighth       => "8n",
            NoteValue::Quarter      => "4n",
            NoteValue::Half         => "2n",
            NoteValue::Whole        => "1n",
        }
    }

    pub fn parse(s: &str) -> Option<NoteValue> {
        [
            NoteValue::ThirtySecond, NoteValue::Sixteenth, NoteValue::Eighth,
            NoteValue::Quarter, NoteValue::Half, NoteValue::Whole,
        ]
        .into_iter()
        .find(|v| v.notation() == s.trim())
    }

    /// Notes of this value per whole note.
    fn divisions(self) -> u32 {
        match self {
            NoteValue::ThirtySecond => 32,
            NoteValue::Sixteenth    => 16,
            NoteValue::Eighth       => 8,
            NoteValue::Quarter      => 4,
            NoteValue::Half         => 2,
            NoteValue::Whole        => 1,
        }
    }

    pub fn ticks(self, ticks_per_quarter: u32) -> u32 {
        ticks_per_quarter * 4 / self.divisions()
    }

    /// Wall-clock length at `bpm`, never shorter than 50 ms.
    pub fn millis(self, bpm: u32) -> u64 {
        ticks_to_ms(self.ticks(TICKS_PER_QUARTER), TICKS_PER_QUARTER, bpm)
    }
}

/// ms = ticks · (60 000 / bpm) / tpq, floored at 50 ms.
fn ticks_to_ms(ticks: u32, tpq: u32, bpm: u32) -> u64 {
    let ms_per_beat = 60_000u64 / bpm.max(1) as u64;
    (ticks as u64 * ms_per_beat / tpq.max(1) as u64).max(50)
}

// ════════════════════════════════════════════════════════════════════════════
// LeadMode — wrist height → melodic note
// ════════════════════════════════════════════════════════════════════════════

/// C major from C3 to C4, the notes a raised wrist steps through.
pub const LEAD_SCALE: [u8; 8] = [48, 50, 52, 53, 55, 57, 59, 60];

/// How a wrist height picks the lead note played alongside a drum hit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadMode {
    #[default]
    Off,
    /// Snap to one of the eight [`LEAD_SCALE`] notes.
    Scale,
    /// Nearest semitone on the continuous A2–A5 range.
    Glide,
}

impl LeadMode {
    pub fn name(self) -> &'static str {
        match self {
            LeadMode::Off   => "off",
            LeadMode::Scale => "scale",
            LeadMode::Glide => "glide",
        }
    }

    /// `None` when the lead is off or `y` is not a position.
    pub fn note_for(self, y: f32) -> Option<u8> {
        if !y.is_finite() {
            return None;
        }
        match self {
            LeadMode::Off   => None,
            LeadMode::Scale => Some(LEAD_SCALE[y_to_step(y, LEAD_SCALE.len())]),
            LeadMode::Glide => Some(hz_to_midi_note(y_to_pitch_hz(y))),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Instrument — GM programs suited to sustained chords
// ════════════════════════════════════════════════════════════════════════════

/// General MIDI program numbers (0-indexed, as sent in Program Change).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Instrument {
    AcousticGrandPiano = 0,
    ElectricPiano1     = 4,
    #[default]
    StringEnsemble1    = 48,
    SynthStrings1      = 50,
    ChoirAahs          = 52,
    Pad2Warm           = 89,
}

impl Instrument {
    pub fn all() -> &'static [Instrument] {
        &[
            Instrument::AcousticGrandPiano,
            Instrument::ElectricPiano1,
            Instrument::StringEnsemble1,
            Instrument::SynthStrings1,
            Instrument::ChoirAahs,
            Instrument::Pad2Warm,
        ]
    }

    pub fn program(self) -> u8 { self as u8 }

    pub fn name(self) -> &'static str {
        match self {
            Instrument::AcousticGrandPiano => "Acoustic Grand Piano",
            Instrument::ElectricPiano1     => "Electric Piano 1",
            Instrument::StringEnsemble1    => "String Ensemble 1",
            Instrument::SynthStrings1      => "Synth Strings 1",
            Instrument::ChoirAahs          => "Choir Aahs",
            Instrument::Pad2Warm           => "Pad 2 (warm)",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
