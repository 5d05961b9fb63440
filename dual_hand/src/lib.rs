//! # dual_hand
//!
//! Two independent gesture state machines, one per hand, fed once per camera
//! frame with a normalized wrist height and the body reference lines.
//!
//! ## Strategies
//!
//! | Strategy | Fires when | Debounce |
//! |---|---|---|
//! | [`Strategy::LineCrossing`] (default) | wrist sweeps up past the eye line, or down past the shoulder / mid-torso line | the crossing itself; first match wins per frame |
//! | [`Strategy::ZoneHysteresis`] | classified zone changes across fixed edges | hysteresis band + refractory window |
//!
//! Both strategies require the wrist velocity to exceed
//! [`GestureConfig::velocity_threshold`] (screen heights per second).
//!
//! ## Example
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use dual_hand::{GestureConfig, GestureEngine, Hand, Zone};
//! use pose_lines::ReferenceLines;
//!
//! let lines = Some(ReferenceLines::new(0.3, 0.5, 0.7));
//! let mut engine = GestureEngine::new(GestureConfig::default());
//! let t0 = Instant::now();
//!
//! assert!(engine.process_hand(Hand::Right, 0.45, t0, lines).is_none());
//! let hit = engine.process_hand(Hand::Right, 0.55, t0 + Duration::from_millis(16), lines);
//! assert_eq!(hit.map(|s| s.zone), Some(Zone::Mid));
//! ```

pub mod config;
pub mod engine;
pub mod state;
pub mod zone;

pub use config::{ConfigError, GestureConfig, Strategy};
pub use engine::{FrameStrikes, GestureEngine, Hand};
pub use state::{step, HandState, Strike};
pub use zone::{Zone, ZoneEdges};
