//! # mosaic-index
//!
//! Offline construction of the path-row to quadkey index.
//!
//! Every WRS-2 path-row footprint in a grid dataset is intersected with the
//! Web Mercator tiles at a chosen zoom. Only tiles whose exact geometry
//! intersects the footprint are kept, so the index never lists a quadkey that
//! merely overlaps the footprint's bounding box.
//!
//! This is the only crate linking the geometry stack; the update path reads
//! the persisted index without it.
//!
//! ## Example
//!
//! ```no_run
//! use mosaic_common::IndexFormat;
//! use mosaic_index::{build_index, write_index};
//!
//! let index = build_index("wrs2_descending.geojson", 8)?;
//! write_index(&index, std::io::stdout(), IndexFormat::default())?;
//! # Ok::<(), mosaic_index::IndexError>(())
//! ```

mod builder;
mod error;
mod intersect;
mod writer;

pub use builder::{build_index, IndexBuilder, SpatialIndex, DEFAULT_PATHROW_ATTRIBUTE};
pub use error::IndexError;
pub use intersect::{intersecting_tiles, tile_polygon};
pub use writer::{write_index, write_index_file};

/// Result type for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;
