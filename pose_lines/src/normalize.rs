//! Landmark normalizer — one frame of keypoints in, five vertical positions out.

use crate::keypoint::{KeypointName, PoseFrame};

/// Confidence floor below which a keypoint is treated as not detected.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.2;

// ════════════════════════════════════════════════════════════════════════════
// NormalizedLandmarks / ReferenceLines
// ════════════════════════════════════════════════════════════════════════════

/// Normalized vertical positions for one frame (`0` = top, `1` = bottom).
///
/// `None` means the channel could not be derived from this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NormalizedLandmarks {
    pub y_l:        Option<f32>,
    pub y_r:        Option<f32>,
    pub eye_y:      Option<f32>,
    pub shoulder_y: Option<f32>,
    /// Midpoint of the shoulder line and the hip line.
    pub mid_y:      Option<f32>,
}

/// The three body reference lines, all present.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReferenceLines {
    pub eye_y:      f32,
    pub shoulder_y: f32,
    pub mid_y:      f32,
}

impl ReferenceLines {
    pub fn new(eye_y: f32, shoulder_y: f32, mid_y: f32) -> Self {
        ReferenceLines { eye_y, shoulder_y, mid_y }
    }
}

impl NormalizedLandmarks {
    /// Reference lines, only when every one of them was resolved.
    pub fn lines(&self) -> Option<ReferenceLines> {
        Some(ReferenceLines {
            eye_y:      self.eye_y?,
            shoulder_y: self.shoulder_y?,
            mid_y:      self.mid_y?,
        })
    }

    /// Both wrists, when both were resolved.
    pub fn wrists(&self) -> Option<(f32, f32)> {
        Some((self.y_l?, self.y_r?))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Normalizer
// ════════════════════════════════════════════════════════════════════════════

/// Converts raw pixel keypoints into [`NormalizedLandmarks`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Normalizer {
    pub min_confidence: f32,
}

impl Default for Normalizer {
    fn default() -> Self {
        Normalizer { min_confidence: DEFAULT_MIN_CONFIDENCE }
    }
}

impl Normalizer {
    pub fn new(min_confidence: f32) -> Self {
        Normalizer { min_confidence }
    }

    /// Normalize one frame against its pixel height.
    ///
    /// An absent frame or a degenerate height yields all-`None`.
    pub fn normalize(&self, frame: Option<&PoseFrame>, height: f32) -> NormalizedLandmarks {
        let frame = match frame {
            Some(f) if height.is_finite() && height > 0.0 => f,
            _ => return NormalizedLandmarks::default(),
        };

        let point = |which| self.point_y(frame, which, height);
        let pair  = |l, r| Some((point(l)? + point(r)?) / 2.0);

        let shoulder_y = pair(KeypointName::LeftShoulder, KeypointName::RightShoulder);
        let hip_y      = pair(KeypointName::LeftHip,      KeypointName::RightHip);
        let mid_y = match (shoulder_y, hip_y) {
            (Some(s), Some(h)) => Some((s + h) / 2.0),
            _ => None,
        };

        NormalizedLandmarks {
            y_l:   point(KeypointName::LeftWrist),
            y_r:   point(KeypointName::RightWrist),
            eye_y: pair(KeypointName::LeftEye, KeypointName::RightEye),
            shoulder_y,
            mid_y,
        }
    }

    /// Normalized, clamped y of one keypoint if present and confident enough.
    fn point_y(&self, frame: &PoseFrame, which: KeypointName, height: f32) -> Option<f32> {
        let kp = frame.find(which)?;
        if kp.score.is_some_and(|s| !(s >= self.min_confidence)) {
            return None;
        }
        let y = kp.y / height;
        y.is_finite().then(|| y.clamp(0.0, 1.0))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
