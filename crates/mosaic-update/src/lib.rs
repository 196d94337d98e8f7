//! # mosaic-update
//!
//! Keeps quadkey-keyed Landsat mosaics current as new scenes are published.
//!
//! For each scene announced in a notification the [`MosaicUpdater`]:
//! 1. parses the scene id and skips non real-time scenes
//! 2. resolves the scene's cloud cover from its MTL document
//! 3. looks up the quadkeys covering the scene's path-row in the persisted
//!    index ([`PathRowIndex`])
//! 4. for every quadkey, puts the scene at the front of the stored asset
//!    list, evicting any older scene of the same path-row
//!
//! The index is read without the geometry stack; building it is the job of
//! `mosaic-index`.
//!
//! ## Example
//!
//! ```no_run
//! use mosaic_scene::HttpMetadataSource;
//! use mosaic_update::{JsonFileStore, MosaicUpdater, Notification, PathRowIndex, UpdaterConfig};
//!
//! let config = UpdaterConfig::new("landsat-cloudless");
//! let index = PathRowIndex::open("index.json.gz")?;
//! let store = JsonFileStore::new("mosaics");
//! let updater = MosaicUpdater::new(config, index, store, HttpMetadataSource::new()?)?;
//!
//! let notification = Notification::from_json(r#"{"Message": {"Records": []}}"#)?;
//! let report = updater.process(&notification)?;
//! println!("{} scenes accepted", report.accepted);
//! # Ok::<(), mosaic_update::UpdateError>(())
//! ```

mod config;
mod error;
mod lookup;
mod notification;
mod store;
mod updater;

pub use config::{
    UpdaterConfig, DEFAULT_MAX_CLOUD_COVER, ENV_MAX_CLOUD_COVER, ENV_TABLE_NAME,
    ENV_UNFILTERED_TABLE_NAME,
};
pub use error::UpdateError;
pub use lookup::{lookup, PathRowIndex};
pub use notification::{scene_id_from_key, Notification};
pub use store::{JsonFileStore, MemoryStore, MosaicEntry, MosaicStore};
pub use updater::{merge_assets, MosaicUpdater, ProcessReport, SceneOutcome, SkipReason};

/// Result type for update operations.
pub type Result<T> = std::result::Result<T, UpdateError>;
