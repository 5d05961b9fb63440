//! Interactive sweep menu: drive either hand through scripted wrist
//! movements and watch which strikes fire.

use dual_hand::{GestureConfig, GestureEngine, Hand, Strategy};
use pose_lines::ReferenceLines;
use std::io::{self, Write};
use std::time::{Duration, Instant};

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║              Dual Hand Gesture Sweep Explorer            ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    let mut cfg    = GestureConfig::default();
    let mut engine = GestureEngine::new(cfg.clone());
    let mut lines  = Some(ReferenceLines::new(0.30, 0.50, 0.70));
    let mut frame  = Duration::from_millis(33);
    let start      = Instant::now();
    let mut clock  = Duration::ZERO;

    println!("  ✓  {}\n", status(&engine, lines, frame));

    loop {
        print_ops_menu();
        let choice = read_line("Command: ").trim().to_ascii_lowercase();

        match choice.as_str() {
            "1" | "2" => {
                let hand = pick_hand();
                let (a, b) = if choice == "1" { (0.2, 0.9) } else { (0.9, 0.2) };
                let from  = read_f32("  From y", a);
                let to    = read_f32("  To y  ", b);
                let steps = read_line("  Steps (default 8): ").trim().parse::<usize>().unwrap_or(8).max(1);
                for i in 0..=steps {
                    let y = from + (to - from) * i as f32 / steps as f32;
                    clock += frame;
                    let hit = engine.process_hand(hand, y, start + clock, lines);
                    match hit {
                        Some(s) => println!("    t={:>6}ms  y={:.3}  ▶ {:<4} ({:.2}/s)",
                                            clock.as_millis(), y, s.zone.name(), s.velocity),
                        None    => println!("    t={:>6}ms  y={:.3}", clock.as_millis(), y),
                    }
                }
            }
            "3" => {
                let hand = pick_hand();
                let y = read_f32("  y", 0.5);
                clock += frame;
                match engine.process_hand(hand, y, start + clock, lines) {
                    Some(s) => println!("  ▶ {} strike, {:.2}/s", s.zone.name(), s.velocity),
                    None    => println!("  (no strike)"),
                }
            }
            "4" => {
                let ms = read_line("  Frame interval ms (default 33): ").trim().parse::<u64>().unwrap_or(33);
                frame = Duration::from_millis(ms.max(1));
                println!("  Frame interval now {}ms.", frame.as_millis());
            }
            "5" => {
                cfg.strategy = match cfg.strategy {
                    Strategy::LineCrossing   => Strategy::ZoneHysteresis,
                    Strategy::ZoneHysteresis => Strategy::LineCrossing,
                };
                cfg.velocity_threshold = engine.config().velocity_threshold;
                engine = GestureEngine::new(cfg.clone());
                println!("  Strategy now {} (hand state reset).", cfg.strategy.name());
            }
            "6" => {
                if read_line("  Remove reference lines? (y/N): ").trim().eq_ignore_ascii_case("y") {
                    lines = None;
                    println!("  No reference lines: strikes are suppressed.");
                } else {
                    let eye      = read_f32("  Eye line     ", 0.30);
                    let shoulder = read_f32("  Shoulder line", 0.50);
                    let mid      = read_f32("  Mid line     ", 0.70);
                    lines = Some(ReferenceLines::new(eye, shoulder, mid));
                }
            }
            "7" => {
                let v = read_f32("  Velocity threshold (heights/s)", 0.55);
                engine.set_velocity_threshold(v);
                println!("  Threshold now {:.2}.", engine.config().velocity_threshold);
            }
            "8" => {
                engine.reset();
                println!("  Both hands reset.");
            }
            "9" => {
                println!("  {}", status(&engine, lines, frame));
                for hand in [Hand::Left, Hand::Right] {
                    let st = engine.state(hand);
                    println!("    {:<5}  last y {:>7}  zone {}",
                             hand.name(),
                             st.last_y.map_or("-".into(), |y| format!("{y:.3}")),
                             st.last_zone.map_or("-", |z| z.name()));
                }
            }
            "q" | "quit" => {
                println!("\nGoodbye!\n");
                break;
            }
            _ => println!("  ⚠  Unknown command."),
        }
        println!();
    }
}

fn status(engine: &GestureEngine, lines: Option<ReferenceLines>, frame: Duration) -> String {
    let lines = match lines {
        Some(l) => format!("eye {:.2} / shoulder {:.2} / mid {:.2}", l.eye_y, l.shoulder_y, l.mid_y),
        None    => "no reference lines".into(),
    };
    format!("{}  |  threshold {:.2}/s  |  {}  |  {}ms frames",
            engine.config().strategy.name(),
            engine.config().velocity_threshold,
            lines,
            frame.as_millis())
}

fn print_ops_menu() {
    println!("  ┌─────────────────────────────────────────────────────────┐");
    println!("  │  1. Sweep down               5. Toggle strategy         │");
    println!("  │  2. Sweep up                 6. Set reference lines     │");
    println!("  │  3. Single sample            7. Velocity threshold      │");
    println!("  │  4. Frame interval           8. Reset hands             │");
    println!("  │                              9. Status    q. Quit       │");
    println!("  └─────────────────────────────────────────────────────────┘");
}

fn pick_hand() -> Hand {
    loop {
        match read_line("  Hand (l/r): ").trim().to_ascii_lowercase().as_str() {
            "l" | "left"  => break Hand::Left,
            "r" | "right" => break Hand::Right,
            _             => println!("  ⚠  Please enter l or r."),
        }
    }
}

fn read_f32(prompt: &str, default: f32) -> f32 {
    read_line(&format!("{} (default {}): ", prompt, default))
        .trim().parse::<f32>().unwrap_or(default)
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
