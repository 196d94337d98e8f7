//! Applying new-scene notifications to the mosaic tables.

use crate::{MosaicEntry, MosaicStore, Notification, PathRowIndex, Result, UpdaterConfig};
use mosaic_common::{PathRow, Quadkey};
use mosaic_metrics::{metric_defs, metrics};
use mosaic_scene::{cloud_cover, parse_scene_id, MetadataSource, SceneMeta};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Why a scene was not written to any table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The identifier matches no known grammar.
    InvalidId,
    /// The scene is not real-time and only real-time scenes are accepted.
    Category,
    /// The scene's metadata could not be fetched or lacks cloud cover.
    Metadata,
    /// The scene is too cloudy and there is no unfiltered table.
    Cloudy,
    /// The index lists no quadkeys for the scene's path-row.
    NoCoverage,
}

impl SkipReason {
    /// Label value used in logs and metrics.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SkipReason::InvalidId => "invalid_id",
            SkipReason::Category => "category",
            SkipReason::Metadata => "metadata",
            SkipReason::Cloudy => "cloudy",
            SkipReason::NoCoverage => "no_coverage",
        }
    }
}

/// Result of processing one scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SceneOutcome {
    /// The scene was written to every quadkey it covers in `tables`.
    Accepted {
        /// Resolved cloud cover percentage.
        cloud_cover: f64,
        /// Number of covering quadkeys.
        quadkeys: usize,
        /// Tables written.
        tables: Vec<String>,
    },
    /// The scene was not written.
    Skipped {
        /// Why.
        reason: SkipReason,
    },
}

/// Summary of one notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessReport {
    /// Scene ids in the notification.
    pub scenes: usize,
    /// Scenes written to at least one table.
    pub accepted: usize,
    /// Skipped scenes by reason.
    pub skipped: BTreeMap<SkipReason, usize>,
    /// Quadkey entries written across all tables.
    pub quadkey_writes: usize,
}

impl ProcessReport {
    /// Total skipped scenes.
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    fn record(&mut self, outcome: &SceneOutcome) {
        match outcome {
            SceneOutcome::Accepted { quadkeys, tables, .. } => {
                self.accepted += 1;
                self.quadkey_writes += quadkeys * tables.len();
            }
            SceneOutcome::Skipped { reason } => {
                *self.skipped.entry(*reason).or_default() += 1;
            }
        }
    }
}

/// New asset list for a quadkey: `scene_id` first, followed by the existing
/// assets minus any with the same path-row.
///
/// Existing assets whose identifier cannot be parsed are kept in place.
pub fn merge_assets(existing: &[String], scene_id: &str, pathrow: &PathRow) -> Vec<String> {
    let mut assets = Vec::with_capacity(existing.len() + 1);
    assets.push(scene_id.to_string());

    for asset in existing {
        match parse_scene_id(asset) {
            Ok(meta) if meta.pathrow == *pathrow => {
                debug!(%asset, replaced_by = scene_id, "evicting asset");
            }
            Ok(_) => assets.push(asset.clone()),
            Err(_) => {
                warn!(%asset, "retaining unparseable asset");
                assets.push(asset.clone());
            }
        }
    }
    assets
}

/// Keeps the mosaic tables current as new scenes arrive.
pub struct MosaicUpdater<S, M> {
    config: UpdaterConfig,
    index: PathRowIndex,
    store: S,
    metadata: M,
}

impl<S: MosaicStore, M: MetadataSource> MosaicUpdater<S, M> {
    /// Create an updater. Fails if `config` does not validate.
    pub fn new(config: UpdaterConfig, index: PathRowIndex, store: S, metadata: M) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            index,
            store,
            metadata,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /// Backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Process every scene in a notification, in order.
    ///
    /// Scene-level problems are counted in the report; index and store
    /// failures abort processing. Quadkeys written before an abort stay
    /// written.
    pub fn process(&self, notification: &Notification) -> Result<ProcessReport> {
        let mut report = ProcessReport {
            scenes: notification.len(),
            ..ProcessReport::default()
        };

        for scene_id in notification.scene_ids() {
            let outcome = self.process_scene(scene_id)?;
            report.record(&outcome);
        }

        info!(
            scenes = report.scenes,
            accepted = report.accepted,
            skipped = report.skipped_total(),
            writes = report.quadkey_writes,
            "processed notification"
        );
        Ok(report)
    }

    /// Process one scene id.
    pub fn process_scene(&self, scene_id: &str) -> Result<SceneOutcome> {
        metrics::counter!(metric_defs::SCENES_RECEIVED.name).increment(1);

        let scene = match parse_scene_id(scene_id) {
            Ok(scene) => scene,
            Err(e) => {
                warn!(scene_id, error = %e, "skipping scene");
                return Ok(skipped(SkipReason::InvalidId));
            }
        };

        if self.config.real_time_only && !scene.is_real_time() {
            debug!(scene_id, category = ?scene.collection_category, "skipping non real-time scene");
            return Ok(skipped(SkipReason::Category));
        }

        let cover = match cloud_cover(&self.metadata, &scene, self.config.cloud_cover_land) {
            Ok(cover) => cover,
            Err(e) => {
                warn!(scene_id, error = %e, "skipping scene");
                return Ok(skipped(SkipReason::Metadata));
            }
        };
        metrics::histogram!(metric_defs::SCENE_CLOUD_COVER.name).record(cover);

        let tables = self.target_tables(cover);
        if tables.is_empty() {
            info!(
                scene_id,
                cloud_cover = cover,
                max = self.config.max_cloud_cover,
                "skipping cloudy scene"
            );
            return Ok(skipped(SkipReason::Cloudy));
        }

        let quadkeys = self.index.lookup_pathrow(&scene.pathrow)?;
        if quadkeys.is_empty() {
            warn!(scene_id, pathrow = %scene.pathrow, "path-row not in index");
            return Ok(skipped(SkipReason::NoCoverage));
        }

        for quadkey in &quadkeys {
            for table in &tables {
                self.update_quadkey(table, quadkey, &scene)?;
            }
        }

        metrics::counter!(metric_defs::SCENES_ACCEPTED.name).increment(1);
        info!(scene_id, cloud_cover = cover, quadkeys = quadkeys.len(), ?tables, "added scene");

        Ok(SceneOutcome::Accepted {
            cloud_cover: cover,
            quadkeys: quadkeys.len(),
            tables: tables.into_iter().map(str::to_string).collect(),
        })
    }

    fn target_tables(&self, cover: f64) -> Vec<&str> {
        let mut tables = Vec::with_capacity(2);
        if let Some(unfiltered) = &self.config.unfiltered_table {
            tables.push(unfiltered.as_str());
        }
        if cover <= self.config.max_cloud_cover {
            tables.push(self.config.table_name.as_str());
        }
        tables
    }

    fn update_quadkey(&self, table: &str, quadkey: &Quadkey, scene: &SceneMeta) -> Result<()> {
        let existing = self.store.get(table, quadkey)?;
        let assets = merge_assets(&existing.assets, &scene.scene_id, &scene.pathrow);
        self.store.put(table, &MosaicEntry::new(quadkey, assets))?;

        metrics::counter!(metric_defs::QUADKEYS_WRITTEN.name, "table" => table.to_string())
            .increment(1);
        debug!(table, %quadkey, scene_id = %scene.scene_id, "updated quadkey");
        Ok(())
    }
}

fn skipped(reason: SkipReason) -> SceneOutcome {
    metrics::counter!(metric_defs::SCENES_SKIPPED.name, "reason" => reason.as_str()).increment(1);
    SceneOutcome::Skipped { reason }
}
