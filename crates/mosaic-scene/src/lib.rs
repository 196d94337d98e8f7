//! # mosaic-scene
//!
//! Landsat 8 scene identifiers and scene metadata.
//!
//! This crate provides:
//! - [`parse_scene_id`] - decode a scene identifier into a [`SceneMeta`]
//! - [`parse_mtl`] - parse an MTL metadata text document into nested groups
//! - [`cloud_cover`] - fetch a scene's MTL document and read its cloud cover
//!
//! ## Scene Identifiers
//!
//! Two identifier grammars are recognised:
//! - Pre-collection, e.g. `LC80130012017001LGN00`
//!   (sensor, satellite, path, row, year, day of year, ground station, version)
//! - Collection 1, e.g. `LC08_L1TP_013001_20170101_20170110_01_RT`
//!   (sensor, satellite, correction level, path-row, acquisition date,
//!   processing date, collection number, collection category)
//!
//! ## Example
//!
//! ```
//! use mosaic_scene::{parse_scene_id, CollectionCategory};
//!
//! let meta = parse_scene_id("LC08_L1TP_013001_20170101_20170110_01_RT")?;
//! assert_eq!(meta.path, "013");
//! assert_eq!(meta.row, "001");
//! assert_eq!(meta.collection_category, Some(CollectionCategory::RealTime));
//! assert_eq!(meta.prefix(), "c1/L8/013/001/LC08_L1TP_013001_20170101_20170110_01_RT");
//! # Ok::<(), mosaic_scene::SceneError>(())
//! ```

mod cloud;
mod error;
mod mtl;
mod scene;

pub use cloud::{
    cloud_cover, cloud_cover_from_mtl, fetch_mtl, HttpMetadataSource, LocalMetadataSource,
    MetadataSource, DEFAULT_METADATA_URL,
};
pub use error::SceneError;
pub use mtl::{parse_mtl, MtlGroup, MtlValue};
pub use scene::{parse_scene_id, CollectionCategory, SceneFormat, SceneMeta, LANDSAT_BUCKET};

/// Result type for scene operations.
pub type Result<T> = std::result::Result<T, SceneError>;
