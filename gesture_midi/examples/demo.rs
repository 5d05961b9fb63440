//! Plays a two-hand swing through the dispatcher into a trace device.

use std::time::{Duration, Instant};

use dual_hand::{GestureConfig, GestureEngine};
use gesture_midi::{
    ChordConfig, Dispatcher, DrumMap, LeadMode, MidiMessage, SoundCall, TraceDevice, GM_DRUM_CHANNEL,
};
use pose_lines::NormalizedLandmarks;

fn frame(y_l: f32, y_r: f32) -> NormalizedLandmarks {
    NormalizedLandmarks {
        y_l: Some(y_l), y_r: Some(y_r),
        eye_y: Some(0.30), shoulder_y: Some(0.50), mid_y: Some(0.70),
    }
}

/// Hands together, then apart, then together low.
const SWING: [(f32, f32); 8] = [
    (0.40, 0.42), (0.55, 0.56), (0.60, 0.62), (0.25, 0.75),
    (0.20, 0.80), (0.74, 0.76), (0.78, 0.80), (0.80, 0.81),
];

fn main() {
    println!("\n=== Gesture → MIDI Demo ===\n");

    // ── 1. Drums and chords ───────────────────────────────────────────────
    println!("1. Swing at 200 ms per frame (chord cooldown 500 ms)");
    let mut engine = GestureEngine::new(GestureConfig::default());
    let mut disp   = Dispatcher::new(ChordConfig::default()).with_lead(LeadMode::Scale);
    let mut device = TraceDevice::ready();
    let t0 = Instant::now();
    for (i, &(l, r)) in SWING.iter().enumerate() {
        let now = t0 + Duration::from_millis(i as u64 * 200);
        for ev in disp.process_frame(&mut engine, &frame(l, r), now, &mut device) {
            println!("   frame {}: {:?} from {:?}", i, ev.kind, ev.source);
        }
    }
    println!();

    // ── 2. What the device recorded ───────────────────────────────────────
    println!("2. Device calls as JSON");
    for call in device.take_calls() {
        let json = serde_json::to_string(&call).unwrap_or_default();
        if let SoundCall::Voice { voice } = call {
            println!("   {}  → GM key {}", json, DrumMap::default().note_for(voice));
        } else {
            println!("   {}", json);
        }
    }
    println!();

    // ── 3. Wire bytes ─────────────────────────────────────────────────────
    println!("3. Raw MIDI for a snare hit at half volume");
    for msg in [
        MidiMessage::volume(GM_DRUM_CHANNEL, 0.5),
        MidiMessage::NoteOn { channel: GM_DRUM_CHANNEL, note: 38, velocity: 100 },
        MidiMessage::NoteOff { channel: GM_DRUM_CHANNEL, note: 38 },
    ] {
        println!("   {:<60} {:02X?}", format!("{:?}", msg), msg.to_bytes());
    }
    println!();
}
