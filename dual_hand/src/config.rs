//! Tunables for the per-hand state machines.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::zone::ZoneEdges;

/// How a hand's height series is turned into strikes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Fire when the wrist sweeps past a body reference line.
    #[default]
    LineCrossing,
    /// Fire when the fixed-edge zone changes, with hysteresis and a
    /// refractory window.
    ZoneHysteresis,
}

impl Strategy {
    pub fn name(self) -> &'static str {
        match self {
            Strategy::LineCrossing   => "line crossing",
            Strategy::ZoneHysteresis => "zone + hysteresis",
        }
    }
}

/// Configuration shared by both hands.
///
/// Every field has a default, so a JSON config only needs the keys it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub strategy:           Strategy,
    /// Minimum wrist speed, in frame heights per second.
    pub velocity_threshold: f32,
    /// Minimum gap between strikes of one hand (zone strategy only).
    pub refractory_ms:      u64,
    pub edge_low:           f32,
    pub edge_mid:           f32,
    pub hysteresis:         f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        let edges = ZoneEdges::default();
        GestureConfig {
            strategy:           Strategy::LineCrossing,
            velocity_threshold: 0.55,
            refractory_ms:      150,
            edge_low:           edges.low,
            edge_mid:           edges.mid,
            hysteresis:         edges.hysteresis,
        }
    }
}

impl GestureConfig {
    pub fn refractory(&self) -> Duration {
        Duration::from_millis(self.refractory_ms)
    }

    pub fn edges(&self) -> ZoneEdges {
        ZoneEdges { low: self.edge_low, mid: self.edge_mid, hysteresis: self.hysteresis }
    }

    /// Reject settings the state machine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.velocity_threshold.is_finite() && self.velocity_threshold >= 0.0) {
            return Err(ConfigError::VelocityThreshold(self.velocity_threshold));
        }
        if !(0.0 < self.edge_mid && self.edge_mid < self.edge_low && self.edge_low < 1.0) {
            return Err(ConfigError::EdgeOrder { mid: self.edge_mid, low: self.edge_low });
        }
        let max = (self.edge_low - self.edge_mid) / 2.0;
        if !(self.hysteresis >= 0.0 && self.hysteresis < max) {
            return Err(ConfigError::Hysteresis { hysteresis: self.hysteresis, max });
        }
        Ok(())
    }
}

/// A configuration value outside what the gesture pipeline accepts.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("velocity threshold must be finite and >= 0, got {0}")]
    VelocityThreshold(f32),

    #[error("zone edges must satisfy 0 < edge_mid < edge_low < 1, got mid={mid} low={low}")]
    EdgeOrder { mid: f32, low: f32 },

    #[error("hysteresis {hysteresis} must be >= 0 and below half the mid band ({max})")]
    Hysteresis { hysteresis: f32, max: f32 },

    #[error("{name} must be within [0, 1], got {value}")]
    OutOfRange { name: &'static str, value: f32 },
}
