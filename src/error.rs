use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by configuration loading and controller construction.
///
/// Gameplay itself never fails: missed ray casts and clamped lane changes are
/// ordinary outcomes, not errors.
#[derive(Debug, Error)]
pub enum RailError {
    #[error("invalid config: `{field}` = {value} ({reason})")]
    InvalidConfig {
        field: &'static str,
        value: f32,
        reason: &'static str,
    },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed RON config: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("unsupported config format for {0:?} (expected .json or .ron)")]
    UnsupportedFormat(PathBuf),

    #[error("config watcher failed: {0}")]
    Watch(#[from] notify::Error),
}

pub type RailResult<T> = Result<T, RailError>;
