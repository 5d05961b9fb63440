//! # pose_lines
//!
//! Turns one camera frame's worth of pose keypoints into the handful of
//! vertical positions the gesture engine works with:
//!
//! | Channel | Derived from | Rule |
//! |---|---|---|
//! | `y_l` / `y_r` | left / right wrist | individually, confidence-gated |
//! | `eye_y` | both eyes | average of the pair |
//! | `shoulder_y` | both shoulders | average of the pair |
//! | `mid_y` | shoulder line + both hips | average of shoulder line and hip line |
//!
//! Every value is normalized against the frame height (`0` = top, `1` =
//! bottom) and clamped into `[0, 1]`.  A channel whose keypoints are missing
//! or below the confidence floor is simply `None`; absence is the normal case
//! for a partially visible body, never an error.
//!
//! ## Quick start
//!
//! ```rust
//! use pose_lines::{Keypoint, Normalizer, PoseFrame};
//!
//! let frame = PoseFrame::new(vec![
//!     Keypoint::new("left_wrist",  100.0, 240.0, Some(0.9)),
//!     Keypoint::new("right_wrist", 500.0, 120.0, Some(0.9)),
//! ]);
//! let lm = Normalizer::default().normalize(Some(&frame), 480.0);
//! assert_eq!(lm.y_l, Some(0.5));
//! assert_eq!(lm.y_r, Some(0.25));
//! assert!(lm.lines().is_none()); // no eyes / shoulders / hips
//! ```

pub mod keypoint;
pub mod mapping;
pub mod normalize;

pub use keypoint::{CameraFrame, Keypoint, KeypointName, PoseFrame};
pub use mapping::{hz_to_midi_note, y_to_pitch_hz, y_to_step, y_to_volume};
pub use normalize::{NormalizedLandmarks, Normalizer, ReferenceLines, DEFAULT_MIN_CONFIDENCE};
