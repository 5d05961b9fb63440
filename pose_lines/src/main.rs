//! Print the normalized wrist and body lines of a JSON-lines pose capture.
//!
//! Usage: `pose_lines [capture.jsonl] [--min-confidence 0.2]` (stdin when no
//! file is given, or when the file is `-`).

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use clap::Parser;
use pose_lines::{CameraFrame, Normalizer, DEFAULT_MIN_CONFIDENCE};
use tracing::{error, warn};

#[derive(Parser, Debug)]
#[command(name = "pose_lines", about = "Show the normalized wrists and reference lines of a pose capture")]
struct Cli {
    /// JSON-lines pose capture, `-` or nothing for stdin
    input: Option<PathBuf>,

    /// Keypoints scored below this are treated as not detected
    #[arg(long, default_value_t = DEFAULT_MIN_CONFIDENCE)]
    min_confidence: f32,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pose_lines=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let reader = match open_input(cli.input.as_deref()) {
        Ok(r)  => r,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let normalizer = Normalizer::new(cli.min_confidence);

    println!();
    println!("  ┌────────┬───────┬───────┬───────┬──────────┬───────┐");
    println!("  │  t ms  │  yL   │  yR   │  eye  │ shoulder │  mid  │");
    println!("  ├────────┼───────┼───────┼───────┼──────────┼───────┤");

    let mut frames  = 0usize;
    let mut with_lines = 0usize;
    for (lineno, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l)  => l,
            Err(e) => { warn!("read error at line {}: {}", lineno + 1, e); break; }
        };
        if line.trim().is_empty() { continue; }

        let frame: CameraFrame = match serde_json::from_str(&line) {
            Ok(f)  => f,
            Err(e) => { warn!("skipping line {}: {}", lineno + 1, e); continue; }
        };
        let lm = normalizer.normalize(frame.pose.as_ref(), frame.height);
        frames += 1;
        if lm.lines().is_some() { with_lines += 1; }

        println!("  │ {:>6} │ {} │ {} │ {} │  {}   │ {} │",
                 frame.t_ms, cell(lm.y_l), cell(lm.y_r),
                 cell(lm.eye_y), cell(lm.shoulder_y), cell(lm.mid_y));
    }

    println!("  └────────┴───────┴───────┴───────┴──────────┴───────┘");
    println!("  {} frames, {} with all reference lines", frames, with_lines);
    println!();
}

/// The capture file, or stdin for `-` or no path.
fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>, String> {
    match path {
        Some(p) if p.as_os_str() != "-" => File::open(p)
            .map(|f| Box::new(BufReader::new(f)) as Box<dyn BufRead>)
            .map_err(|e| format!("cannot open {}: {}", p.display(), e)),
        _ => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn cell(v: Option<f32>) -> String {
    match v {
        Some(y) => format!("{:.3}", y),
        None    => "  –  ".to_string(),
    }
}
