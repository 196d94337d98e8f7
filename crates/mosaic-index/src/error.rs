//! Error types for index building.

use mosaic_common::CommonError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building or writing a spatial index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The vector dataset could not be read or lacks required content.
    #[error("Cannot read vector dataset {path}: {reason}")]
    DatasetRead {
        /// Dataset path.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Zoom level outside the supported range.
    #[error("Invalid zoom level {0}")]
    InvalidZoomLevel(u8),

    /// Key or tile error.
    #[error(transparent)]
    Common(CommonError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<CommonError> for IndexError {
    fn from(err: CommonError) -> Self {
        match err {
            CommonError::InvalidZoomLevel(z) => IndexError::InvalidZoomLevel(z),
            CommonError::Io(e) => IndexError::Io(e),
            other => IndexError::Common(other),
        }
    }
}
