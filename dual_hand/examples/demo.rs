//! Runs the same wrist sweep through both strategies.

use std::time::{Duration, Instant};

use dual_hand::{GestureConfig, GestureEngine, Hand, Strategy};
use pose_lines::ReferenceLines;

/// Eyes 0.30, shoulders 0.50, mid-torso 0.70.
const LINES: ReferenceLines = ReferenceLines { eye_y: 0.30, shoulder_y: 0.50, mid_y: 0.70 };

/// One up-and-down swing of the right wrist at 30 fps.
const SWEEP: [f32; 12] = [0.85, 0.75, 0.62, 0.52, 0.40, 0.28, 0.22, 0.35, 0.48, 0.58, 0.68, 0.80];

fn play(label: &str, cfg: GestureConfig, frame_ms: u64) {
    let mut engine = GestureEngine::new(cfg);
    let t0 = Instant::now();
    let hits: Vec<String> = SWEEP.iter().enumerate()
        .filter_map(|(i, &y)| {
            let now = t0 + Duration::from_millis(i as u64 * frame_ms);
            engine.process_hand(Hand::Right, y, now, Some(LINES))
                .map(|s| format!("{}@{}ms ({:.1}/s)", s.zone.name(), i as u64 * frame_ms, s.velocity))
        })
        .collect();
    println!("   {:<28} {}", label, if hits.is_empty() { "-".to_string() } else { hits.join("  ") });
}

fn main() {
    println!("\n=== Dual Hand Strategy Demo ===\n");

    // ── 1. Default line crossing ──────────────────────────────────────────
    println!("1. Line crossing (default threshold 0.55/s)");
    play("33 ms frames", GestureConfig::default(), 33);
    println!();

    // ── 2. Zone + hysteresis ──────────────────────────────────────────────
    println!("2. Zone + hysteresis, 150 ms refractory");
    let zone = GestureConfig { strategy: Strategy::ZoneHysteresis, ..Default::default() };
    play("33 ms frames", zone.clone(), 33);
    play("no refractory", GestureConfig { refractory_ms: 0, ..zone }, 33);
    println!();

    // ── 3. Velocity gate ──────────────────────────────────────────────────
    println!("3. The same sweep played slowly");
    play("400 ms frames", GestureConfig::default(), 400);
    play("400 ms, threshold 0.1", GestureConfig { velocity_threshold: 0.1, ..Default::default() }, 400);
    println!();
}
