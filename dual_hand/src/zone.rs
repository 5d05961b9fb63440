//! Vertical zones and the fixed-edge classifier with hysteresis.

use serde::{Deserialize, Serialize};

/// A vertical band of the frame; `High` is the raised-hand band (small `y`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    High,
    Mid,
    Low,
}

impl Zone {
    pub fn name(self) -> &'static str {
        match self {
            Zone::High => "high",
            Zone::Mid  => "mid",
            Zone::Low  => "low",
        }
    }
}

/// Fixed zone boundaries plus the hysteresis half-width around each.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoneEdges {
    /// Boundary between `Mid` (above) and `Low` (below).
    pub low:        f32,
    /// Boundary between `High` (above) and `Mid` (below).
    pub mid:        f32,
    pub hysteresis: f32,
}

impl Default for ZoneEdges {
    fn default() -> Self {
        ZoneEdges { low: 0.72, mid: 0.48, hysteresis: 0.035 }
    }
}

impl ZoneEdges {
    /// Plain classification with no memory.
    pub fn classify(&self, y: f32) -> Zone {
        if y > self.low {
            Zone::Low
        } else if y > self.mid {
            Zone::Mid
        } else {
            Zone::High
        }
    }

    /// Classification that only leaves `prev` once `y` is past the edge by
    /// more than the hysteresis band.
    ///
    /// Moves at most one zone per call: from `Low`, a hand that jumps all the
    /// way up lands in `Mid` first.
    pub fn classify_from(&self, y: f32, prev: Option<Zone>) -> Zone {
        let h = self.hysteresis;
        match prev {
            None => self.classify(y),
            Some(Zone::Low) => {
                if y <= self.low - h { Zone::Mid } else { Zone::Low }
            }
            Some(Zone::Mid) => {
                if y >= self.low + h {
                    Zone::Low
                } else if y <= self.mid - h {
                    Zone::High
                } else {
                    Zone::Mid
                }
            }
            Some(Zone::High) => {
                if y >= self.mid + h { Zone::Mid } else { Zone::High }
            }
        }
    }
}
