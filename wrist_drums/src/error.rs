use std::path::PathBuf;

use dual_hand::ConfigError;
use thiserror::Error;

/// Anything that stops the controller from starting or running.
///
/// Malformed capture lines and missing MIDI ports are not errors: they are
/// logged and skipped, or fall back to the null output.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("cannot open {path}: {source}")]
    Open { path: PathBuf, source: std::io::Error },

    #[error("bad config file {path}: {source}")]
    ConfigFile { path: PathBuf, source: serde_json::Error },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("MIDI error: {0}")]
    Midi(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
