//! The two-hand engine: one [`HandState`] per hand plus the shared config.

use std::time::Instant;

use pose_lines::{NormalizedLandmarks, ReferenceLines};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GestureConfig;
use crate::state::{step, HandState, Strike};

// ════════════════════════════════════════════════════════════════════════════
// Hand
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn name(self) -> &'static str {
        match self {
            Hand::Left  => "left",
            Hand::Right => "right",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FrameStrikes
// ════════════════════════════════════════════════════════════════════════════

/// What each hand fired in one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStrikes {
    pub left:  Option<Strike>,
    pub right: Option<Strike>,
}

impl FrameStrikes {
    /// Fired strikes, left hand first.
    pub fn iter(&self) -> impl Iterator<Item = (Hand, Strike)> {
        [(Hand::Left, self.left), (Hand::Right, self.right)]
            .into_iter()
            .filter_map(|(hand, s)| s.map(|s| (hand, s)))
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureEngine
// ════════════════════════════════════════════════════════════════════════════

/// Owns both hands' state for the length of a session.
///
/// Call [`GestureEngine::process_frame`] once per camera frame, never
/// concurrently; [`GestureEngine::reset`] starts a fresh session.
#[derive(Clone, Debug)]
pub struct GestureEngine {
    cfg:   GestureConfig,
    left:  HandState,
    right: HandState,
}

impl GestureEngine {
    pub fn new(cfg: GestureConfig) -> Self {
        GestureEngine { cfg, left: HandState::default(), right: HandState::default() }
    }

    pub fn config(&self) -> &GestureConfig { &self.cfg }

    pub fn state(&self, hand: Hand) -> &HandState {
        match hand {
            Hand::Left  => &self.left,
            Hand::Right => &self.right,
        }
    }

    /// Change the velocity gate; negative or non-finite values become `0`.
    pub fn set_velocity_threshold(&mut self, threshold: f32) {
        self.cfg.velocity_threshold = if threshold.is_finite() { threshold.max(0.0) } else { 0.0 };
    }

    /// Forget both hands' history.
    pub fn reset(&mut self) {
        self.left  = HandState::default();
        self.right = HandState::default();
    }

    /// Feed one hand's wrist height.
    pub fn process_hand(
        &mut self,
        hand:  Hand,
        y:     f32,
        now:   Instant,
        lines: Option<ReferenceLines>,
    ) -> Option<Strike> {
        let state = match hand {
            Hand::Left  => &mut self.left,
            Hand::Right => &mut self.right,
        };
        let strike = step(state, y, now, lines, &self.cfg);
        if let Some(s) = strike {
            debug!(hand = hand.name(), zone = s.zone.name(), velocity = s.velocity, "strike");
        }
        strike
    }

    /// Feed a whole frame; a hand whose wrist is missing is skipped and
    /// keeps its previous state.
    pub fn process_frame(&mut self, lm: &NormalizedLandmarks, now: Instant) -> FrameStrikes {
        let lines = lm.lines();
        FrameStrikes {
            left:  lm.y_l.and_then(|y| self.process_hand(Hand::Left,  y, now, lines)),
            right: lm.y_r.and_then(|y| self.process_hand(Hand::Right, y, now, lines)),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::Zone;
    use std::time::Duration;

    fn frame(y_l: Option<f32>, y_r: Option<f32>) -> NormalizedLandmarks {
        NormalizedLandmarks {
            y_l, y_r,
            eye_y: Some(0.3), shoulder_y: Some(0.5), mid_y: Some(0.7),
        }
    }

    #[test]
    fn hands_are_independent() {
        let mut e = GestureEngine::new(GestureConfig::default());
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_millis(16);

        e.process_frame(&frame(Some(0.45), Some(0.60)), t0);
        let s = e.process_frame(&frame(Some(0.55), Some(0.80)), t1);

        assert_eq!(s.left.map(|s| s.zone),  Some(Zone::Mid));
        assert_eq!(s.right.map(|s| s.zone), Some(Zone::Low));
        let fired: Vec<Hand> = s.iter().map(|(h, _)| h).collect();
        assert_eq!(fired, vec![Hand::Left, Hand::Right]);
    }

    #[test]
    fn missing_wrist_keeps_state() {
        let mut e = GestureEngine::new(GestureConfig::default());
        let t0 = Instant::now();
        e.process_frame(&frame(Some(0.45), None), t0);
        let right_before = *e.state(Hand::Right);
        e.process_frame(&frame(Some(0.46), None), t0 + Duration::from_millis(16));
        assert_eq!(*e.state(Hand::Right), right_before);
        assert_eq!(e.state(Hand::Left).last_y, Some(0.46));
    }

    #[test]
    fn partial_body_never_fires() {
        let mut e = GestureEngine::new(GestureConfig::default());
        let t0 = Instant::now();
        let mut lm = frame(Some(0.45), Some(0.9));
        lm.eye_y = None;
        e.process_frame(&lm, t0);
        lm.y_l = Some(0.9);
        lm.y_r = Some(0.1);
        let s = e.process_frame(&lm, t0 + Duration::from_millis(16));
        assert!(s.is_empty());
    }

    #[test]
    fn reset_forgets_history() {
        let mut e = GestureEngine::new(GestureConfig::default());
        let t0 = Instant::now();
        e.process_hand(Hand::Left, 0.45, t0, frame(None, None).lines());
        e.reset();
        assert_eq!(*e.state(Hand::Left), HandState::default());
        // first sample after reset cannot fire
        let s = e.process_hand(Hand::Left, 0.55, t0 + Duration::from_millis(16),
                               frame(None, None).lines());
        assert!(s.is_none());
    }

    #[test]
    fn raising_threshold_gates_strikes() {
        let mut e = GestureEngine::new(GestureConfig::default());
        e.set_velocity_threshold(10.0);
        let t0 = Instant::now();
        let lines = frame(None, None).lines();
        e.process_hand(Hand::Right, 0.45, t0, lines);
        // 6.25 heights/s < 10
        assert!(e.process_hand(Hand::Right, 0.55, t0 + Duration::from_millis(16), lines).is_none());

        e.set_velocity_threshold(f32::NAN);
        assert_eq!(e.config().velocity_threshold, 0.0);
    }
}
