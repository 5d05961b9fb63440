//! Pose keypoints as delivered by an external pose model.
//!
//! Frames arrive as JSON; a keypoint carries its name, pixel position and an
//! optional confidence score.  Names follow the 17-point COCO layout used by
//! MoveNet (`left_wrist`), and the camel-case PoseNet spelling (`leftWrist`,
//! under a `part` key) is accepted as well.

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// KeypointName — the 17 COCO body points
// ════════════════════════════════════════════════════════════════════════════

/// One of the 17 COCO body keypoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeypointName {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl KeypointName {
    /// All 17 keypoints in COCO index order.
    pub fn all() -> [KeypointName; 17] {
        use KeypointName::*;
        [
            Nose, LeftEye, RightEye, LeftEar, RightEar,
            LeftShoulder, RightShoulder, LeftElbow, RightElbow,
            LeftWrist, RightWrist, LeftHip, RightHip,
            LeftKnee, RightKnee, LeftAnkle, RightAnkle,
        ]
    }

    /// Canonical snake-case name (`"left_wrist"`).
    pub fn name(self) -> &'static str {
        match self {
            KeypointName::Nose          => "nose",
            KeypointName::LeftEye       => "left_eye",
            KeypointName::RightEye      => "right_eye",
            KeypointName::LeftEar       => "left_ear",
            KeypointName::RightEar      => "right_ear",
            KeypointName::LeftShoulder  => "left_shoulder",
            KeypointName::RightShoulder => "right_shoulder",
            KeypointName::LeftElbow     => "left_elbow",
            KeypointName::RightElbow    => "right_elbow",
            KeypointName::LeftWrist     => "left_wrist",
            KeypointName::RightWrist    => "right_wrist",
            KeypointName::LeftHip       => "left_hip",
            KeypointName::RightHip      => "right_hip",
            KeypointName::LeftKnee      => "left_knee",
            KeypointName::RightKnee     => "right_knee",
            KeypointName::LeftAnkle     => "left_ankle",
            KeypointName::RightAnkle    => "right_ankle",
        }
    }

    /// Parse a model-supplied name.
    ///
    /// Case, underscores and hyphens are ignored, so `left_wrist`,
    /// `leftWrist` and `Left-Wrist` all resolve to [`KeypointName::LeftWrist`].
    pub fn parse(s: &str) -> Option<KeypointName> {
        let folded: String = s.chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        KeypointName::all().into_iter().find(|k| k.name().replace('_', "") == folded)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Keypoint / PoseFrame
// ════════════════════════════════════════════════════════════════════════════

/// A single detected keypoint in pixel coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    #[serde(alias = "part")]
    pub name:  String,
    #[serde(default)]
    pub x:     f32,
    pub y:     f32,
    /// Detection confidence in `[0, 1]`; models that don't report one omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl Keypoint {
    pub fn new(name: &str, x: f32, y: f32, score: Option<f32>) -> Self {
        Keypoint { name: name.to_string(), x, y, score }
    }

    /// Resolved keypoint kind, if the name is one we know.
    pub fn kind(&self) -> Option<KeypointName> {
        KeypointName::parse(&self.name)
    }
}

/// All keypoints detected in one camera frame for a single person.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    #[serde(default)]
    pub keypoints: Vec<Keypoint>,
}

impl PoseFrame {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        PoseFrame { keypoints }
    }

    /// First keypoint of the requested kind; unknown names never match.
    pub fn find(&self, which: KeypointName) -> Option<&Keypoint> {
        self.keypoints.iter().find(|k| k.kind() == Some(which))
    }

    pub fn is_empty(&self) -> bool { self.keypoints.is_empty() }
}

/// One line of a pose capture: a timestamped, possibly empty detection.
///
/// `t_ms` is monotonic milliseconds since the capture started and `height`
/// is the pixel height the keypoints were measured against.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraFrame {
    pub t_ms:   u64,
    pub height: f32,
    /// `None` when no person was detected in this frame.
    #[serde(default)]
    pub pose:   Option<PoseFrame>,
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_snake_and_camel() {
        assert_eq!(KeypointName::parse("left_wrist"), Some(KeypointName::LeftWrist));
        assert_eq!(KeypointName::parse("leftWrist"),  Some(KeypointName::LeftWrist));
        assert_eq!(KeypointName::parse("RIGHT-HIP"),  Some(KeypointName::RightHip));
        assert_eq!(KeypointName::parse("tail"),       None);
    }

    #[test]
    fn names_round_trip_through_parse() {
        for k in KeypointName::all() {
            assert_eq!(KeypointName::parse(k.name()), Some(k));
        }
    }

    #[test]
    fn find_skips_unknown_names() {
        let f = PoseFrame::new(vec![
            Keypoint::new("mystery", 1.0, 2.0, None),
            Keypoint::new("nose",    3.0, 4.0, Some(0.8)),
        ]);
        assert_eq!(f.find(KeypointName::Nose).map(|k| k.y), Some(4.0));
        assert!(f.find(KeypointName::LeftEye).is_none());
    }

    #[test]
    fn camera_frame_without_pose() {
        let f: CameraFrame = serde_json::from_str(r#"{"t_ms":33,"height":480}"#).unwrap();
        assert_eq!(f.t_ms, 33);
        assert!(f.pose.is_none());
    }

    #[test]
    fn deserialize_movenet_and_posenet_shapes() {
        let movenet = r#"{"keypoints":[{"name":"left_wrist","x":1,"y":2,"score":0.7}]}"#;
        let posenet = r#"{"keypoints":[{"part":"leftWrist","x":1,"y":2}]}"#;

        let a: PoseFrame = serde_json::from_str(movenet).unwrap();
        let b: PoseFrame = serde_json::from_str(posenet).unwrap();

        assert_eq!(a.find(KeypointName::LeftWrist).unwrap().score, Some(0.7));
        assert_eq!(b.find(KeypointName::LeftWrist).unwrap().score, None);
    }
}
