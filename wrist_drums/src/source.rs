//! Pose sources: recorded JSON-lines captures or a synthetic swing.
//!
//! The public interface is [`SourceEvent`] delivered over a `mpsc` channel.
//! The frame loop does not need to know whether frames came from a capture
//! file, stdin, or the simulator.

use std::f32::consts::TAU;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use pose_lines::{CameraFrame, Keypoint, PoseFrame};
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};

// ════════════════════════════════════════════════════════════════════════════
// SourceEvent
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum SourceEvent {
    /// One camera frame, pose already resolved.
    Frame(CameraFrame),
    /// The source has nothing more to deliver.
    End,
}

// ════════════════════════════════════════════════════════════════════════════
// PoseSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`SourceEvent`]s over a channel.
pub trait PoseSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>);
}

/// Spawn a pose source on its own thread and return the receiving end.
pub fn spawn_pose_source(source: Box<dyn PoseSource>) -> Receiver<SourceEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || source.run(tx));
    rx
}

/// Sleep until `t_ms` after `start`, for sources replayed at capture speed.
fn pace(start: Instant, t_ms: u64) {
    let due = start + Duration::from_millis(t_ms);
    let now = Instant::now();
    if due > now {
        thread::sleep(due - now);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// JsonLinesSource
// ════════════════════════════════════════════════════════════════════════════

/// One [`CameraFrame`] per line.  Blank lines are ignored; lines that do not
/// parse are logged and skipped.
pub struct JsonLinesSource {
    reader:   Box<dyn BufRead + Send>,
    realtime: bool,
}

impl JsonLinesSource {
    pub fn new(reader: Box<dyn BufRead + Send>, realtime: bool) -> Self {
        JsonLinesSource { reader, realtime }
    }

    /// Open a capture file, or stdin for `-`.
    pub fn open(path: &Path, realtime: bool) -> Result<Self> {
        if path.as_os_str() == "-" {
            return Ok(Self::new(Box::new(BufReader::new(io::stdin())), realtime));
        }
        let file = File::open(path)
            .map_err(|source| AppError::Open { path: path.to_path_buf(), source })?;
        Ok(Self::new(Box::new(BufReader::new(file)), realtime))
    }
}

impl PoseSource for JsonLinesSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        let start = Instant::now();
        let mut sent = 0usize;
        for (idx, line) in self.reader.lines().enumerate() {
            let line = match line {
                Ok(l)  => l,
                Err(e) => { warn!(line = idx + 1, error = %e, "capture read failed"); break; }
            };
            if line.trim().is_empty() {
                continue;
            }
            let frame: CameraFrame = match serde_json::from_str(&line) {
                Ok(f)  => f,
                Err(e) => { warn!(line = idx + 1, error = %e, "skipping malformed frame"); continue; }
            };
            if self.realtime {
                pace(start, frame.t_ms);
            }
            if tx.send(SourceEvent::Frame(frame)).is_err() {
                return;
            }
            sent += 1;
        }
        info!(frames = sent, "capture finished");
        let _ = tx.send(SourceEvent::End);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimSwingSource
// ════════════════════════════════════════════════════════════════════════════

/// Synthetic performer standing still with both arms swinging up and down,
/// out of phase.  Stands in for a camera when no capture is given.
#[derive(Clone, Debug)]
pub struct SimSwingSource {
    pub frames:   usize,
    pub fps:      u32,
    /// Length of one full swing.
    pub period:   Duration,
    pub realtime: bool,
}

impl Default for SimSwingSource {
    fn default() -> Self {
        SimSwingSource {
            frames:   300,
            fps:      30,
            period:   Duration::from_millis(1200),
            realtime: false,
        }
    }
}

/// Frame height of the simulated camera.
pub const SIM_HEIGHT: f32 = 480.0;

impl SimSwingSource {
    /// The `i`-th frame.  Eyes sit at 0.3, shoulders at 0.5 and hips at 0.9
    /// of the frame height (mid-torso line 0.7); wrists swing between 0.15
    /// and 0.95, the left a quarter period behind the right.
    pub fn frame(&self, i: usize) -> CameraFrame {
        let fps   = self.fps.max(1) as u64;
        let t_ms  = i as u64 * 1000 / fps;
        let phase = t_ms as f32 / self.period.as_millis().max(1) as f32;

        let wrist = |offset: f32| (0.55 + 0.40 * (TAU * (phase + offset)).sin()) * SIM_HEIGHT;
        let kp    = |name: &str, y: f32| Keypoint::new(name, 320.0, y, Some(0.9));

        let pose = PoseFrame::new(vec![
            kp("left_eye",       0.30 * SIM_HEIGHT),
            kp("right_eye",      0.30 * SIM_HEIGHT),
            kp("left_shoulder",  0.50 * SIM_HEIGHT),
            kp("right_shoulder", 0.50 * SIM_HEIGHT),
            kp("left_hip",       0.90 * SIM_HEIGHT),
            kp("right_hip",      0.90 * SIM_HEIGHT),
            kp("left_wrist",     wrist(-0.25)),
            kp("right_wrist",    wrist(0.0)),
        ]);
        CameraFrame { t_ms, height: SIM_HEIGHT, pose: Some(pose) }
    }
}

impl PoseSource for SimSwingSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        debug!(frames = self.frames, fps = self.fps, "simulated swing started");
        let start = Instant::now();
        for i in 0..self.frames {
            let frame = self.frame(i);
            if self.realtime {
                pace(start, frame.t_ms);
            }
            if tx.send(SourceEvent::Frame(frame)).is_err() {
                return;
            }
        }
        let _ = tx.send(SourceEvent::End);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use pose_lines::Normalizer;

    fn drain(rx: Receiver<SourceEvent>) -> Vec<SourceEvent> {
        rx.iter().collect()
    }

    #[test]
    fn json_lines_skip_bad_lines() {
        let capture = concat!(
            r#"{"t_ms":0,"height":480,"pose":null}"#, "\n",
            "not json\n",
            "\n",
            r#"{"t_ms":33,"height":480,"pose":{"keypoints":[{"name":"leftWrist","x":1,"y":240,"score":0.9}]}}"#, "\n",
        );
        let src = JsonLinesSource::new(Box::new(io::Cursor::new(capture.as_bytes().to_vec())), false);
        let events = drain(spawn_pose_source(Box::new(src)));

        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], SourceEvent::Frame(f) if f.pose.is_none()));
        assert!(matches!(&events[1], SourceEvent::Frame(f) if f.t_ms == 33));
        assert_eq!(events[2], SourceEvent::End);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = JsonLinesSource::open(Path::new("/nonexistent/capture.jsonl"), false);
        assert!(matches!(err, Err(AppError::Open { .. })));
    }

    #[test]
    fn sim_delivers_all_frames_then_end() {
        let src = SimSwingSource { frames: 10, ..Default::default() };
        let events = drain(spawn_pose_source(Box::new(src)));
        assert_eq!(events.len(), 11);
        assert_eq!(events.last(), Some(&SourceEvent::End));
    }

    #[test]
    fn sim_frames_have_full_body() {
        let src = SimSwingSource::default();
        let n   = Normalizer::default();
        for i in [0, 7, 19, 33] {
            let f  = src.frame(i);
            let lm = n.normalize(f.pose.as_ref(), f.height);
            let lines = lm.lines().expect("all reference lines present");
            assert!((lines.eye_y - 0.3).abs() < 1e-6);
            assert!((lines.shoulder_y - 0.5).abs() < 1e-6);
            assert!((lines.mid_y - 0.7).abs() < 1e-6);
            let (l, r) = lm.wrists().expect("both wrists present");
            assert!((0.0..=1.0).contains(&l) && (0.0..=1.0).contains(&r));
        }
    }

    #[test]
    fn sim_timestamps_follow_fps() {
        let src = SimSwingSource { fps: 25, ..Default::default() };
        assert_eq!(src.frame(0).t_ms, 0);
        assert_eq!(src.frame(25).t_ms, 1000);
    }
}
