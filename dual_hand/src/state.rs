//! Per-hand gesture state and its update function.
//!
//! [`step`] is the whole state machine: it reads and writes one
//! [`HandState`] and returns at most one [`Strike`] per call.  It holds no
//! state of its own, so any number of hands can be tracked by keeping one
//! `HandState` each.

use std::time::{Duration, Instant};

use pose_lines::ReferenceLines;

use crate::config::{GestureConfig, Strategy};
use crate::zone::Zone;

/// Time floor for the velocity estimate, so back-to-back samples never
/// divide by zero.
const MIN_DT: Duration = Duration::from_millis(1);

/// Everything remembered about one hand between frames.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HandState {
    pub last_y:         Option<f32>,
    pub last_t:         Option<Instant>,
    pub last_trigger_t: Option<Instant>,
    /// Zone currently held (zone strategy) or last struck (line crossing).
    pub last_zone:      Option<Zone>,
}

/// A fired gesture: which zone, and how fast the wrist was moving.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Strike {
    pub zone:     Zone,
    /// Frame heights per second.
    pub velocity: f32,
}

/// Wrist speed between two samples, in frame heights per second.
pub fn velocity(prev_y: f32, prev_t: Instant, y: f32, now: Instant) -> f32 {
    let dt = now.saturating_duration_since(prev_t).max(MIN_DT);
    (y - prev_y).abs() / (dt.as_secs_f32() * 1000.0) * 1000.0
}

/// Feed one sample of one hand.
///
/// * A non-finite `y` means the wrist was not seen: the state is untouched.
/// * `y` is clamped into `[0, 1]`.
/// * Without reference lines nothing can fire; position and time are still
///   recorded so the next frame's velocity is measured from here.
/// * Position and time are recorded on every other path, fired or not.
pub fn step(
    state: &mut HandState,
    y:     f32,
    now:   Instant,
    lines: Option<ReferenceLines>,
    cfg:   &GestureConfig,
) -> Option<Strike> {
    if !y.is_finite() {
        return None;
    }
    let y = y.clamp(0.0, 1.0);

    let strike = match (lines, state.last_y, state.last_t) {
        (Some(lines), Some(prev_y), Some(prev_t)) => {
            let v = velocity(prev_y, prev_t, y, now);
            let zone = match cfg.strategy {
                Strategy::LineCrossing => {
                    crossing(prev_y, y, &lines).filter(|_| v > cfg.velocity_threshold)
                }
                Strategy::ZoneHysteresis => zone_change(state, y, now, v, cfg),
            };
            zone.map(|zone| Strike { zone, velocity: v })
        }
        (Some(_), _, _) => {
            if cfg.strategy == Strategy::ZoneHysteresis {
                state.last_zone = Some(cfg.edges().classify(y));
            }
            None
        }
        (None, _, _) => None,
    };

    if let Some(s) = strike {
        state.last_trigger_t = Some(now);
        state.last_zone = Some(s.zone);
    }
    state.last_y = Some(y);
    state.last_t = Some(now);
    strike
}

/// Which reference line, if any, the wrist passed between two samples.
///
/// Checked in priority order so a fast swipe over several lines in one frame
/// fires only once.
fn crossing(prev_y: f32, y: f32, lines: &ReferenceLines) -> Option<Zone> {
    if prev_y > lines.eye_y && y <= lines.eye_y {
        Some(Zone::High)
    } else if prev_y < lines.shoulder_y && y >= lines.shoulder_y {
        Some(Zone::Mid)
    } else if prev_y < lines.mid_y && y >= lines.mid_y {
        Some(Zone::Low)
    } else {
        None
    }
}

/// Zone strategy: update the held zone and report it if a gated change
/// happened.
fn zone_change(
    state: &mut HandState,
    y:     f32,
    now:   Instant,
    v:     f32,
    cfg:   &GestureConfig,
) -> Option<Zone> {
    let prev = state.last_zone;
    let zone = cfg.edges().classify_from(y, prev);
    state.last_zone = Some(zone);

    let changed  = prev.is_some_and(|p| p != zone);
    let rested   = state.last_trigger_t
        .map_or(true, |t| now.saturating_duration_since(t) > cfg.refractory());

    (changed && v > cfg.velocity_threshold && rested).then_some(zone)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Strategy;
    use proptest::prelude::*;

    const FRAME_MS: u64 = 16;

    fn lines() -> Option<ReferenceLines> {
        Some(ReferenceLines::new(0.3, 0.5, 0.7))
    }

    fn zone_cfg() -> GestureConfig {
        GestureConfig { strategy: Strategy::ZoneHysteresis, ..Default::default() }
    }

    /// Feed `ys` at a fixed frame interval and collect the fired zones.
    fn run(ys: &[f32], frame_ms: u64, lines: Option<ReferenceLines>, cfg: &GestureConfig)
        -> Vec<Zone>
    {
        let t0 = Instant::now();
        let mut st = HandState::default();
        ys.iter().enumerate()
            .filter_map(|(i, &y)| {
                let now = t0 + Duration::from_millis(i as u64 * frame_ms);
                step(&mut st, y, now, lines, cfg).map(|s| s.zone)
            })
            .collect()
    }

    fn sweep(from: f32, to: f32, frames: usize) -> Vec<f32> {
        (0..=frames)
            .map(|i| from + (to - from) * i as f32 / frames as f32)
            .collect()
    }

    // ── line crossing ─────────────────────────────────────────────────────
    #[test]
    fn downward_sweep_fires_mid_then_low_once_each() {
        let fired = run(&sweep(0.30, 0.90, 12), FRAME_MS, lines(), &GestureConfig::default());
        assert_eq!(fired, vec![Zone::Mid, Zone::Low]);
    }

    #[test]
    fn upward_sweep_fires_high_once() {
        let fired = run(&sweep(0.90, 0.20, 14), FRAME_MS, lines(), &GestureConfig::default());
        assert_eq!(fired, vec![Zone::High]);
    }

    #[test]
    fn swipe_over_two_lines_in_one_frame_fires_once() {
        let fired = run(&[0.45, 0.75], FRAME_MS, lines(), &GestureConfig::default());
        assert_eq!(fired, vec![Zone::Mid]);
    }

    #[test]
    fn slow_sweep_is_gated() {
        // 0.05 per second, far below 0.55
        let fired = run(&sweep(0.30, 0.90, 12), 1000, lines(), &GestureConfig::default());
        assert!(fired.is_empty());
        let fired = run(&sweep(0.90, 0.20, 14), 1000, lines(), &GestureConfig::default());
        assert!(fired.is_empty());
    }

    #[test]
    fn hovering_on_a_line_does_not_refire() {
        let ys = [0.45, 0.55, 0.52, 0.56, 0.51, 0.58];
        let fired = run(&ys, FRAME_MS, lines(), &GestureConfig::default());
        assert_eq!(fired, vec![Zone::Mid]);
    }

    #[test]
    fn recrossing_fires_again() {
        let ys = [0.45, 0.55, 0.40, 0.55];
        let fired = run(&ys, FRAME_MS, lines(), &GestureConfig::default());
        assert_eq!(fired, vec![Zone::Mid, Zone::Mid]);
    }

    #[test]
    fn first_sample_never_fires() {
        let mut st = HandState::default();
        let s = step(&mut st, 0.9, Instant::now(), lines(), &GestureConfig::default());
        assert!(s.is_none());
        assert_eq!(st.last_y, Some(0.9));
    }

    #[test]
    fn strike_records_trigger_time_and_zone() {
        let cfg = GestureConfig::default();
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_millis(FRAME_MS);
        let mut st = HandState::default();
        step(&mut st, 0.45, t0, lines(), &cfg);
        let s = step(&mut st, 0.55, t1, lines(), &cfg).unwrap();
        assert_eq!(s.zone, Zone::Mid);
        assert!((s.velocity - 6.25).abs() < 1e-3);
        assert_eq!(st.last_trigger_t, Some(t1));
        assert_eq!(st.last_zone, Some(Zone::Mid));
        assert_eq!(st.last_t, Some(t1));
    }

    #[test]
    fn missing_lines_record_but_never_fire() {
        let t0 = Instant::now();
        let mut st = HandState::default();
        let cfg = GestureConfig::default();
        for (i, y) in sweep(0.9, 0.1, 8).into_iter().enumerate() {
            let now = t0 + Duration::from_millis(i as u64 * FRAME_MS);
            assert!(step(&mut st, y, now, None, &cfg).is_none());
            assert_eq!(st.last_y, Some(y.clamp(0.0, 1.0)));
            assert_eq!(st.last_t, Some(now));
        }
        assert_eq!(st.last_trigger_t, None);
    }

    #[test]
    fn out_of_range_is_clamped() {
        let mut st = HandState::default();
        step(&mut st, 1.4, Instant::now(), lines(), &GestureConfig::default());
        assert_eq!(st.last_y, Some(1.0));
        step(&mut st, -0.3, Instant::now(), lines(), &GestureConfig::default());
        assert_eq!(st.last_y, Some(0.0));
    }

    #[test]
    fn nan_sample_leaves_state_alone() {
        let mut st = HandState::default();
        let t0 = Instant::now();
        step(&mut st, 0.4, t0, lines(), &GestureConfig::default());
        let before = st;
        step(&mut st, f32::NAN, t0 + Duration::from_millis(5), lines(), &GestureConfig::default());
        assert_eq!(st, before);
    }

    #[test]
    fn zero_dt_uses_one_millisecond_floor() {
        let t = Instant::now();
        assert!((velocity(0.4, t, 0.5, t) - 100.0).abs() < 1e-3);
    }

    // ── zone + hysteresis ─────────────────────────────────────────────────
    #[test]
    fn hysteresis_oscillation_never_changes_zone() {
        let ys: Vec<f32> = (0..40).map(|i| if i % 2 == 0 { 0.715 } else { 0.725 }).collect();
        let t0 = Instant::now();
        let mut st = HandState::default();
        let cfg = zone_cfg();
        for (i, &y) in ys.iter().enumerate() {
            let now = t0 + Duration::from_millis(i as u64 * FRAME_MS);
            assert!(step(&mut st, y, now, lines(), &cfg).is_none());
            assert_eq!(st.last_zone, Some(Zone::Mid));
        }
    }

    #[test]
    fn zone_change_fires_new_zone() {
        let fired = run(&[0.60, 0.80], FRAME_MS, lines(), &zone_cfg());
        assert_eq!(fired, vec![Zone::Low]);
        let fired = run(&[0.60, 0.30], FRAME_MS, lines(), &zone_cfg());
        assert_eq!(fired, vec![Zone::High]);
    }

    #[test]
    fn refractory_window_suppresses_quick_refire() {
        // mid → low at 16 ms fires; low → mid at 32 ms is inside 150 ms
        let fired = run(&[0.60, 0.80, 0.60], FRAME_MS, lines(), &zone_cfg());
        assert_eq!(fired, vec![Zone::Low]);
        // same moves 200 ms apart fire both (0.2 / 0.2 s = 1.0 > 0.55)
        let fired = run(&[0.60, 0.80, 0.60], 200, lines(), &zone_cfg());
        assert_eq!(fired, vec![Zone::Low, Zone::Mid]);
    }

    #[test]
    fn slow_zone_change_moves_zone_without_firing() {
        let t0 = Instant::now();
        let mut st = HandState::default();
        let cfg = zone_cfg();
        step(&mut st, 0.60, t0, lines(), &cfg);
        let s = step(&mut st, 0.80, t0 + Duration::from_secs(2), lines(), &cfg);
        assert!(s.is_none());
        assert_eq!(st.last_zone, Some(Zone::Low));
    }

    #[test]
    fn zone_strategy_also_needs_lines() {
        let fired = run(&[0.60, 0.90, 0.30, 0.90], FRAME_MS, None, &zone_cfg());
        assert!(fired.is_empty());
    }

    // ── properties ────────────────────────────────────────────────────────
    fn samples() -> impl proptest::strategy::Strategy<Value = Vec<(f32, u64)>> {
        proptest::collection::vec((-0.2f32..1.2, 0u64..120), 1..80)
    }

    fn replay(seq: &[(f32, u64)], lines: Option<ReferenceLines>, cfg: &GestureConfig)
        -> Vec<(usize, Zone)>
    {
        let t0 = Instant::now();
        let mut st = HandState::default();
        let mut t = t0;
        let mut out = Vec::new();
        for (i, &(y, dt)) in seq.iter().enumerate() {
            t += Duration::from_millis(dt);
            if let Some(s) = step(&mut st, y, t, lines, cfg) {
                out.push((i, s.zone));
            }
        }
        out
    }

    proptest! {
        #[test]
        fn identical_input_identical_events(seq in samples(), zone in any::<bool>()) {
            let cfg = if zone { zone_cfg() } else { GestureConfig::default() };
            prop_assert_eq!(replay(&seq, lines(), &cfg), replay(&seq, lines(), &cfg));
        }

        #[test]
        fn no_lines_no_strikes(seq in samples(), zone in any::<bool>()) {
            let cfg = if zone { zone_cfg() } else { GestureConfig::default() };
            prop_assert!(replay(&seq, None, &cfg).is_empty());
        }

        #[test]
        fn recorded_position_is_always_in_range(seq in samples()) {
            let mut st = HandState::default();
            let mut t = Instant::now();
            for (y, dt) in seq {
                t += Duration::from_millis(dt);
                step(&mut st, y, t, lines(), &GestureConfig::default());
                let last = st.last_y.unwrap();
                prop_assert!((0.0..=1.0).contains(&last));
            }
        }
    }
}
