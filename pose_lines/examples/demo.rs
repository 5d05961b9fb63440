//! Normalizes a few hand-made frames and shows the continuous wrist mappings.

use pose_lines::{
    hz_to_midi_note, y_to_pitch_hz, y_to_step, y_to_volume, Keypoint, NormalizedLandmarks,
    Normalizer, PoseFrame,
};

const HEIGHT: f32 = 480.0;

fn body(wrist_l: f32, wrist_r: f32, wrist_score: f32) -> PoseFrame {
    let kp = |name: &str, y: f32, score: f32| Keypoint::new(name, 320.0, y, Some(score));
    PoseFrame::new(vec![
        kp("left_eye",       144.0, 0.95),
        kp("right_eye",      144.0, 0.95),
        kp("left_shoulder",  240.0, 0.90),
        kp("right_shoulder", 240.0, 0.90),
        kp("left_hip",       432.0, 0.80),
        kp("right_hip",      432.0, 0.80),
        kp("left_wrist",     wrist_l, wrist_score),
        kp("right_wrist",    wrist_r, wrist_score),
    ])
}

fn show(label: &str, lm: &NormalizedLandmarks) {
    let f = |v: Option<f32>| v.map_or("  –  ".to_string(), |y| format!("{:.3}", y));
    println!("   {:<22} yL={} yR={} eye={} shoulder={} mid={}",
             label, f(lm.y_l), f(lm.y_r), f(lm.eye_y), f(lm.shoulder_y), f(lm.mid_y));
}

fn main() {
    println!("\n=== Pose Lines Demo ===\n");
    let n = Normalizer::default();

    // ── 1. Full body ──────────────────────────────────────────────────────
    println!("1. Full body, wrists at 1/4 and 3/4 of the frame");
    let lm = n.normalize(Some(&body(120.0, 360.0, 0.9)), HEIGHT);
    show("normalized", &lm);
    println!("   reference lines present: {}\n", lm.lines().is_some());

    // ── 2. Confidence floor ───────────────────────────────────────────────
    println!("2. Same body, wrists scored 0.1 (below the 0.2 floor)");
    show("normalized", &n.normalize(Some(&body(120.0, 360.0, 0.1)), HEIGHT));
    println!();

    // ── 3. Nobody in frame, or a broken height ────────────────────────────
    println!("3. Missing person and zero frame height");
    show("no pose", &n.normalize(None, HEIGHT));
    show("height 0", &n.normalize(Some(&body(120.0, 360.0, 0.9)), 0.0));
    println!();

    // ── 4. Continuous mappings ────────────────────────────────────────────
    println!("4. Wrist height → volume, pitch, slider step (8 positions)");
    for y in [0.0, 0.25, 0.5, 0.75, 1.0] {
        let hz = y_to_pitch_hz(y);
        println!("   y={:.2}  volume={:.2}  pitch={:>5.1} Hz (note {:>2})  step={}",
                 y, y_to_volume(y), hz, hz_to_midi_note(hz), y_to_step(y, 8));
    }
    println!();
}
