//! Error type for the command-line runner.

use mosaic_index::IndexError;
use mosaic_scene::SceneError;
use mosaic_update::UpdateError;
use thiserror::Error;

/// Errors surfaced by a command.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Index building failed.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Updating or index lookup failed.
    #[error(transparent)]
    Update(#[from] UpdateError),

    /// Scene id parsing or metadata retrieval failed.
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Missing or conflicting arguments.
    #[error("{0}")]
    Usage(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
