//! wrist_drums — command-line entry point.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use dual_hand::Strategy;
use gesture_midi::{Instrument, LeadMode, NoteValue, SoundCall, SoundDevice, TraceDevice};
use tracing::{error, info};
use wrist_drums::{
    run, AppConfig, AppError, AppState, JsonLinesSource, MidiSoundDevice, PoseSource,
    SessionStats, SimSwingSource,
};

#[derive(Parser, Debug)]
#[command(name = "wrist_drums", about = "Play drums and chords with your wrists")]
struct Cli {
    /// Skip the prompts and use the default configuration
    #[arg(long)]
    quick: bool,

    /// JSON configuration file (every key optional)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON-lines pose capture to play, `-` for stdin
    #[arg(long)]
    input: Option<PathBuf>,

    /// Use the built-in swing simulator (the default without --input)
    #[arg(long)]
    sim: bool,

    /// Simulator length in frames
    #[arg(long, default_value_t = 300)]
    frames: usize,

    /// Pace frames at their capture timestamps
    #[arg(long)]
    realtime: bool,

    /// Play the input this many times, each pass a fresh session
    #[arg(long, default_value_t = 1)]
    repeat: u32,

    /// Velocity threshold in frame heights per second, overriding the config
    #[arg(long)]
    sensitivity: Option<f32>,

    /// Drums only, even if the config enables chords
    #[arg(long)]
    no_chords: bool,

    /// Lead note with each drum hit: off, scale or glide
    #[arg(long, value_parser = parse_lead)]
    lead: Option<LeadMode>,

    /// Print the sound calls instead of playing MIDI
    #[arg(long)]
    dry_run: bool,

    /// Prefer the MIDI output port whose name contains this
    #[arg(long)]
    port: Option<String>,

    /// List MIDI output ports and exit
    #[arg(long)]
    list_ports: bool,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wrist_drums=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = try_main(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn try_main(cli: Cli) -> Result<(), AppError> {
    if cli.list_ports {
        for (i, name) in wrist_drums::player::list_ports()?.iter().enumerate() {
            println!("  {}. {}", i + 1, name);
        }
        return Ok(());
    }

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Wrist Drums — Pose Driven Drum & Chord Controller     ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    // frames on stdin leave no room for prompts
    let stdin_input = cli.input.as_deref().is_some_and(|p| p.as_os_str() == "-");

    let mut cfg = match &cli.config {
        Some(path) => AppConfig::from_json_file(path)?,
        None if cli.quick || stdin_input => {
            println!("  Quick-start: line crossing, strings, 120 BPM\n");
            AppConfig::default()
        }
        None => configure_interactively(),
    };
    if cli.port.is_some() {
        cfg.midi.port_hint = cli.port.clone();
    }
    if let Some(lead) = cli.lead {
        cfg.lead = lead;
    }
    cfg.validate()?;

    if cli.dry_run {
        let mut app = AppState::new(cfg, TraceDevice::ready());
        play(&mut app, &cli)?;
        for call in app.device().calls() {
            match call {
                SoundCall::Voice { voice }        => println!("  ♩ {}", voice.name()),
                SoundCall::Chord { chord, value } => println!("  ♪ {} ({})", chord.name(), value.notation()),
                SoundCall::Note  { note, value }  => println!("  ♫ note {} ({})", note, value.notation()),
                SoundCall::Gain  { gain }         => println!("  ◐ gain {:.2}", gain),
                SoundCall::Muted { muted }        => println!("  ◌ muted {}", muted),
            }
        }
        return Ok(());
    }

    let mut device = MidiSoundDevice::new(cfg.midi.clone());
    device.start();
    device.load();
    let mut app = AppState::new(cfg, device);
    let played = play(&mut app, &cli);
    app.device_mut().dispose();
    played
}

/// Apply the live overrides, then run every pass, resetting between them.
fn play<D: SoundDevice>(app: &mut AppState<D>, cli: &Cli) -> Result<(), AppError> {
    if let Some(level) = cli.sensitivity {
        app.set_sensitivity(level);
    }
    if cli.no_chords {
        app.set_chords_enabled(false);
    }
    for pass in 1..=cli.repeat.max(1) {
        if pass > 1 {
            app.reset();
            info!(pass, "replaying input");
        }
        let stats = run(app, open_source(cli)?);
        print_stats(&stats);
    }
    Ok(())
}

fn open_source(cli: &Cli) -> Result<Box<dyn PoseSource>, AppError> {
    Ok(match &cli.input {
        Some(path) if !cli.sim => {
            info!(input = %path.display(), "reading pose capture");
            Box::new(JsonLinesSource::open(path, cli.realtime)?)
        }
        _ => {
            info!(frames = cli.frames, "using simulated swing");
            Box::new(SimSwingSource { frames: cli.frames, realtime: cli.realtime, ..Default::default() })
        }
    })
}

fn parse_lead(s: &str) -> Result<LeadMode, String> {
    [LeadMode::Off, LeadMode::Scale, LeadMode::Glide]
        .into_iter()
        .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| format!("unknown lead mode `{}` (off, scale, glide)", s))
}

fn print_stats(stats: &SessionStats) {
    println!();
    println!("  {} frames ({} empty)  ·  {} drum hits  ·  {} chords  ·  {} lead notes  ·  {} skipped",
             stats.frames, stats.empty, stats.voices, stats.chords, stats.leads, stats.skipped);
    println!();
}

fn configure_interactively() -> AppConfig {
    let mut cfg = AppConfig::default();

    println!("  Detection: 1=Line crossing (default)  2=Zone + hysteresis");
    if read_line("  Choice: ").trim() == "2" {
        cfg.gesture.strategy = Strategy::ZoneHysteresis;
    }

    cfg.gesture.velocity_threshold = read_line("  Sensitivity, heights/s (default 0.55): ")
        .trim().parse::<f32>().ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(0.55);

    cfg.chords.enabled = !read_line("  Two-hand chords? (Y/n): ").trim().eq_ignore_ascii_case("n");
    if cfg.chords.enabled {
        cfg.midi.instrument = pick_instrument();
        if let Some(value) = NoteValue::parse(&read_line("  Chord length 1n/2n/4n/8n (default 2n): ")) {
            cfg.chords.value = value;
        }
    }

    let lead = read_line("  Lead note: 1=off (default)  2=scale  3=glide: ");
    cfg.lead = match lead.trim() {
        "2" => LeadMode::Scale,
        "3" => LeadMode::Glide,
        _   => LeadMode::Off,
    };

    cfg.midi.tempo_bpm = read_line("  Tempo BPM (default 120): ")
        .trim().parse::<u32>().unwrap_or(120).clamp(20, 300);
    cfg.midi.velocity = read_line("  Velocity 1–127 (default 100): ")
        .trim().parse::<u8>().unwrap_or(100).clamp(1, 127);
    cfg.volume_follows_hands =
        read_line("  Raise hands for volume? (y/N): ").trim().eq_ignore_ascii_case("y");

    cfg
}

fn pick_instrument() -> Instrument {
    println!("  Chord instrument:");
    for (i, inst) in Instrument::all().iter().enumerate() {
        println!("    {}. {}", i + 1, inst.name());
    }
    read_line("  Choice (default 3): ")
        .trim().parse::<usize>().ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| Instrument::all().get(i).copied())
        .unwrap_or_default()
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
