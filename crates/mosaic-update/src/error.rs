//! Error types for mosaic updates.

use mosaic_scene::SceneError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort processing of a notification.
///
/// Problems confined to a single scene (an unparseable identifier, missing
/// metadata) are not errors here; they are logged and counted in the
/// [`ProcessReport`](crate::ProcessReport).
#[derive(Debug, Error)]
pub enum UpdateError {
    /// The notification does not have the expected structure.
    #[error("Malformed notification: {0}")]
    Notification(String),

    /// The path-row index could not be opened or decoded.
    #[error("Cannot read index {path}: {reason}")]
    IndexRead {
        /// Index file path.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// A mosaic store read or write failed.
    #[error("Store error on {table}/{key}: {reason}")]
    Store {
        /// Table name.
        table: String,
        /// Quadkey.
        key: String,
        /// Reason for failure.
        reason: String,
    },

    /// Invalid updater configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Configuration file could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Metadata source could not be constructed.
    #[error(transparent)]
    Scene(#[from] SceneError),
}
