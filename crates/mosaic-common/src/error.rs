//! Error types for the shared mosaic types.

use thiserror::Error;

/// Errors that can occur when building keys or tile coordinates.
#[derive(Debug, Error)]
pub enum CommonError {
    /// I/O error opening or reading an index file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A path or row could not be turned into a 6-character path-row key.
    #[error("Invalid path-row: {0}")]
    InvalidPathRow(String),

    /// A quadkey contained characters other than `0`-`3` or was empty.
    #[error("Invalid quadkey: {0:?}")]
    InvalidQuadkey(String),

    /// Invalid zoom level.
    #[error("Invalid zoom level {0} (must be 1-28)")]
    InvalidZoomLevel(u8),

    /// Tile column or row out of range for its zoom level.
    #[error("Tile x={x} y={y} out of range for zoom {z}")]
    TileOutOfRange {
        /// Zoom level.
        z: u8,
        /// X tile coordinate.
        x: u32,
        /// Y tile coordinate.
        y: u32,
    },
}
