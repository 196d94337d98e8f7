//! # mosaic-common
//!
//! Shared building blocks for the Landsat mosaic index.
//!
//! This crate provides the types that both the offline index builder and the
//! online mosaic updater agree on:
//! - [`PathRow`] - the 6-character WRS-2 ground-track key (`"013001"`)
//! - [`Quadkey`] - the quadtree address of a Web Mercator tile
//! - [`TileCoord`] - slippy map `(z, x, y)` tile coordinates and their bounds
//! - [`IndexFormat`] - on-disk layout and compression of the path-row index
//!
//! It carries no geometry dependencies, so the update path can link it
//! without the polygon intersection stack.
//!
//! ## Example
//!
//! ```
//! use mosaic_common::{PathRow, TileCoord};
//!
//! let pathrow = PathRow::new(13, 1)?;
//! assert_eq!(pathrow.as_str(), "013001");
//!
//! let tile = TileCoord::new(3, 3, 5)?;
//! assert_eq!(tile.quadkey().as_str(), "213");
//! # Ok::<(), mosaic_common::CommonError>(())
//! ```

mod error;
mod format;
mod keys;
mod tile;

pub use error::CommonError;
pub use format::{open_index_reader, Compression, IndexFormat, IndexLayout, IndexWriter};
pub use keys::{PathRow, Quadkey};
pub use tile::{TileBounds, TileCoord, MAX_LATITUDE, MAX_ZOOM, MIN_ZOOM};

/// Result type for shared operations.
pub type Result<T> = std::result::Result<T, CommonError>;
