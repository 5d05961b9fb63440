//! Top-level application state and frame loop.
//!
//! `AppState` owns the normalizer, the two-hand engine, the dispatcher and
//! the sound device.  It turns each [`CameraFrame`] into device calls.

use std::fs;
use std::path::Path;
use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use dual_hand::{ConfigError, GestureConfig, GestureEngine};
use gesture_midi::{ChordConfig, Dispatcher, LeadMode, SoundDevice, TriggerEvent, TriggerKind};
use pose_lines::{
    y_to_volume, CameraFrame, NormalizedLandmarks, Normalizer, PoseFrame, DEFAULT_MIN_CONFIDENCE,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::player::MidiConfig;
use crate::source::{spawn_pose_source, PoseSource, SourceEvent};

/// Smallest gain change worth a controller message.
const GAIN_STEP: f32 = 0.02;

/// How long the loop waits for a frame before logging that the source is
/// quiet.
const IDLE_LOG: Duration = Duration::from_secs(5);

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
///
/// Loaded from JSON; every key is optional.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gesture:              GestureConfig,
    pub chords:               ChordConfig,
    pub midi:                 MidiConfig,
    /// Melodic note paired with each drum hit, pitched by the other wrist.
    pub lead:                 LeadMode,
    /// Keypoints scored below this are treated as not detected.
    pub min_confidence:       f32,
    /// Output gain in `[0, 1]` at start-up.
    pub gain:                 f32,
    /// Raise the hands to play louder.
    pub volume_follows_hands: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            gesture:              GestureConfig::default(),
            chords:               ChordConfig::default(),
            midi:                 MidiConfig::default(),
            lead:                 LeadMode::Off,
            min_confidence:       DEFAULT_MIN_CONFIDENCE,
            gain:                 1.0,
            volume_follows_hands: false,
        }
    }
}

impl AppConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|source| AppError::Open { path: path.to_path_buf(), source })?;
        let cfg: AppConfig = serde_json::from_str(&text)
            .map_err(|source| AppError::ConfigFile { path: path.to_path_buf(), source })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.gesture.validate()?;
        self.chords.validate()?;
        for (name, value) in [("min_confidence", self.min_confidence), ("gain", self.gain)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange { name, value });
            }
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

/// Counters reported when a session ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub frames:  u64,
    /// Frames with no person detected.
    pub empty:   u64,
    pub voices:  u64,
    pub chords:  u64,
    pub leads:   u64,
    /// Triggers dropped because the device was not ready.
    pub skipped: u64,
}

pub struct AppState<D: SoundDevice> {
    normalizer:    Normalizer,
    engine:        GestureEngine,
    dispatcher:    Dispatcher,
    device:        D,
    session_start: Instant,
    follow_hands:  bool,
    sent_gain:     Option<f32>,
    stats:         SessionStats,
}

impl<D: SoundDevice> AppState<D> {
    pub fn new(cfg: AppConfig, mut device: D) -> Self {
        device.set_gain(cfg.gain);
        AppState {
            normalizer:    Normalizer::new(cfg.min_confidence),
            engine:        GestureEngine::new(cfg.gesture),
            dispatcher:    Dispatcher::new(cfg.chords).with_lead(cfg.lead),
            device,
            session_start: Instant::now(),
            follow_hands:  cfg.volume_follows_hands,
            sent_gain:     None,
            stats:         SessionStats::default(),
        }
    }

    // ── process one frame ────────────────────────────────────────────────

    /// Normalize, detect and sound one frame.
    ///
    /// The frame's `t_ms` is the clock: refractory and cooldown windows are
    /// measured against it, not against arrival time.
    pub fn handle_frame(&mut self, frame: &CameraFrame) -> Vec<TriggerEvent> {
        let lm  = self.normalizer.normalize(frame.pose.as_ref(), frame.height);
        let now = self.session_start + Duration::from_millis(frame.t_ms);

        self.stats.frames += 1;
        if frame.pose.as_ref().map_or(true, PoseFrame::is_empty) {
            self.stats.empty += 1;
        }

        let events = self.dispatcher.process_frame(&mut self.engine, &lm, now, &mut self.device);
        for ev in &events {
            match ev.kind {
                TriggerKind::Voice(_) => self.stats.voices += 1,
                TriggerKind::Chord(_) => self.stats.chords += 1,
                TriggerKind::Lead(_)  => self.stats.leads  += 1,
            }
        }
        self.stats.skipped = self.dispatcher.skipped();

        if self.follow_hands {
            self.follow_volume(&lm);
        }
        events
    }

    /// Gain from the average height of the visible wrists.
    fn follow_volume(&mut self, lm: &NormalizedLandmarks) {
        let ys: Vec<f32> = [lm.y_l, lm.y_r].into_iter().flatten().collect();
        if ys.is_empty() {
            return;
        }
        let gain = y_to_volume(ys.iter().sum::<f32>() / ys.len() as f32);
        if self.sent_gain.map_or(true, |g| (g - gain).abs() >= GAIN_STEP) {
            debug!(gain, "volume follows hands");
            self.device.set_gain(gain);
            self.sent_gain = Some(gain);
        }
    }

    // ── live controls ────────────────────────────────────────────────────

    /// Velocity threshold in frame heights per second.
    pub fn set_sensitivity(&mut self, level: f32) {
        self.engine.set_velocity_threshold(level);
        info!(threshold = self.engine.config().velocity_threshold, "sensitivity changed");
    }

    pub fn set_chords_enabled(&mut self, enabled: bool) {
        self.dispatcher.set_chords_enabled(enabled);
    }

    /// Forget both hands, the chord cooldown and the last hand-driven gain;
    /// the next frame starts a new session clock.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.dispatcher.reset();
        self.session_start = Instant::now();
        self.sent_gain = None;
        self.stats = SessionStats::default();
    }

    // ── accessors ────────────────────────────────────────────────────────

    pub fn engine(&self)          -> &GestureEngine { &self.engine }
    pub fn device(&self)          -> &D             { &self.device }
    pub fn device_mut(&mut self)  -> &mut D         { &mut self.device }
    pub fn stats(&self)           -> SessionStats   { self.stats }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the frame loop
// ════════════════════════════════════════════════════════════════════════════

/// Drive `app` with frames from `source` until the source ends.
///
/// Each frame is handled completely before the next is received.
pub fn run<D: SoundDevice>(app: &mut AppState<D>, source: Box<dyn PoseSource>) -> SessionStats {
    let rx = spawn_pose_source(source);
    info!("frame loop started");

    loop {
        match rx.recv_timeout(IDLE_LOG) {
            Ok(SourceEvent::Frame(frame)) => {
                for ev in app.handle_frame(&frame) {
                    debug!(t_ms = frame.t_ms, ?ev, "trigger");
                }
            }
            Ok(SourceEvent::End) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => info!("waiting for frames"),
        }
    }

    let stats = app.stats();
    info!(
        frames = stats.frames, voices = stats.voices,
        chords = stats.chords, leads = stats.leads, skipped = stats.skipped,
        "frame loop finished"
    );
    stats
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
