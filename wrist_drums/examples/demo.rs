//! A dry run of the simulated swing, with each option switched on in turn.

use gesture_midi::{LeadMode, SoundCall, TraceDevice};
use wrist_drums::{run, AppConfig, AppState, SimSwingSource};

fn session(label: &str, cfg: AppConfig) {
    let mut app = AppState::new(cfg, TraceDevice::ready());
    let stats = run(&mut app, Box::new(SimSwingSource { frames: 150, ..Default::default() }));
    let gains = app.device().calls().iter()
        .filter(|c| matches!(c, SoundCall::Gain { .. }))
        .count();
    println!("   {:<24} {} frames  {} hits  {} chords  {} leads  {} gain changes",
             label, stats.frames, stats.voices, stats.chords, stats.leads, gains);
}

fn main() {
    println!("\n=== Wrist Drums Dry Run Demo ===\n");

    // ── 1. Configurations ─────────────────────────────────────────────────
    println!("1. Five seconds of simulated swing");
    session("defaults", AppConfig::default());

    let mut drums = AppConfig::default();
    drums.chords.enabled = false;
    session("drums only", drums);

    session("scale lead", AppConfig { lead: LeadMode::Scale, ..Default::default() });
    session("volume follows hands", AppConfig { volume_follows_hands: true, ..Default::default() });
    println!();

    // ── 2. Partial JSON config ────────────────────────────────────────────
    println!("2. Config file with two keys, everything else defaulted");
    let json = r#"{"gesture":{"strategy":"zone_hysteresis"},"lead":"glide"}"#;
    match serde_json::from_str::<AppConfig>(json) {
        Ok(cfg) => {
            println!("   {}", json);
            session("zone + glide", cfg);
        }
        Err(e) => println!("   bad config: {}", e),
    }
    println!();
}
