//! Error types for scene parsing and metadata retrieval.

use thiserror::Error;

/// Errors that can occur when working with scene identifiers and metadata.
#[derive(Debug, Error)]
pub enum SceneError {
    /// The identifier matches neither the pre-collection nor the collection grammar.
    #[error("Invalid Landsat 8 scene id: {0:?}")]
    InvalidSceneIdentifier(String),

    /// The identifier matched a grammar but encodes an impossible date.
    #[error("Invalid acquisition date in scene id {scene_id:?}: {reason}")]
    InvalidDate {
        /// Scene identifier.
        scene_id: String,
        /// What was wrong with the date.
        reason: String,
    },

    /// The scene's MTL document could not be fetched, parsed, or lacks the
    /// requested field.
    #[error("Metadata unavailable for {scene_id}: {reason}")]
    MetadataUnavailable {
        /// Scene identifier.
        scene_id: String,
        /// Reason for failure.
        reason: String,
    },

    /// The MTL text has unbalanced `GROUP`/`END_GROUP` markers.
    #[error("Malformed MTL document: {0}")]
    MalformedMetadata(String),

    /// HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    HttpRequest(#[from] reqwest::Error),
}
