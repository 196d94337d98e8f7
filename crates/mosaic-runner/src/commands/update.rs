//! `update`: apply one scene notification to the mosaic tables.

use crate::{Result, RunnerError};
use clap::Args;
use mosaic_scene::{HttpMetadataSource, LocalMetadataSource, MetadataSource, DEFAULT_METADATA_URL};
use mosaic_update::{
    JsonFileStore, MosaicUpdater, Notification, PathRowIndex, ProcessReport, UpdaterConfig,
    ENV_MAX_CLOUD_COVER, ENV_TABLE_NAME, ENV_UNFILTERED_TABLE_NAME,
};
use std::io::{Read, Write};
use std::path::PathBuf;
use tracing::info;

/// Arguments for the update command.
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Notification JSON (envelope or function event). Reads stdin when omitted.
    pub event: Option<PathBuf>,

    /// Path-row index file.
    #[arg(long)]
    pub index: Option<PathBuf>,

    /// Directory of the JSON file store.
    #[arg(long)]
    pub store: PathBuf,

    /// YAML updater configuration; flags override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Table receiving scenes at or below the cloud cover threshold.
    #[arg(long, env = ENV_TABLE_NAME)]
    pub table: Option<String>,

    /// Table receiving every accepted scene regardless of cloud cover.
    #[arg(long, env = ENV_UNFILTERED_TABLE_NAME)]
    pub unfiltered_table: Option<String>,

    /// Cloud cover threshold in percent.
    #[arg(long, env = ENV_MAX_CLOUD_COVER)]
    pub max_cloud_cover: Option<f64>,

    /// Use total cloud cover instead of cloud cover over land.
    #[arg(long)]
    pub no_land: bool,

    /// Accept Tier 1 and Tier 2 scenes as well as real-time ones.
    #[arg(long)]
    pub all_categories: bool,

    /// Base URL for MTL downloads.
    #[arg(long)]
    pub metadata_url: Option<String>,

    /// Read `<scene_id>_MTL.txt` files from this directory instead of
    /// downloading them.
    #[arg(long, conflicts_with = "metadata_url")]
    pub mtl_dir: Option<PathBuf>,
}

impl UpdateArgs {
    /// Build the effective configuration: YAML file (if any), then flags and
    /// environment variables.
    pub fn updater_config(&self) -> Result<UpdaterConfig> {
        let mut config = match &self.config {
            Some(path) => UpdaterConfig::from_yaml_file(path)?,
            None => UpdaterConfig::default(),
        };

        if let Some(table) = &self.table {
            config.table_name = table.clone();
        }
        if let Some(table) = &self.unfiltered_table {
            config.unfiltered_table = Some(table.clone());
        }
        if let Some(max) = self.max_cloud_cover {
            config.max_cloud_cover = max;
        }
        if self.no_land {
            config.cloud_cover_land = false;
        }
        if self.all_categories {
            config.real_time_only = false;
        }
        if let Some(index) = &self.index {
            config.index_path = Some(index.clone());
        }
        if let Some(url) = &self.metadata_url {
            config.metadata_url = Some(url.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

/// Execute the update command, printing the report as JSON.
pub fn execute<R: Read, W: Write>(args: &UpdateArgs, stdin: R, mut out: W) -> Result<()> {
    let config = args.updater_config()?;
    let notification = read_notification(args, stdin)?;
    info!(scenes = notification.len(), "received notification");

    let report = match &args.mtl_dir {
        Some(dir) => run(config, args, LocalMetadataSource::new(dir), &notification)?,
        None => {
            let url = config.metadata_url.as_deref().unwrap_or(DEFAULT_METADATA_URL);
            let source = HttpMetadataSource::with_base_url(url)?;
            run(config, args, source, &notification)?
        }
    };

    serde_json::to_writer_pretty(&mut out, &report)?;
    writeln!(out)?;
    Ok(())
}

fn read_notification<R: Read>(args: &UpdateArgs, mut stdin: R) -> Result<Notification> {
    let text = match &args.event {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut text = String::new();
            stdin.read_to_string(&mut text)?;
            text
        }
    };
    Ok(Notification::from_json(&text)?)
}

fn run<M: MetadataSource>(
    config: UpdaterConfig,
    args: &UpdateArgs,
    metadata: M,
    notification: &Notification,
) -> Result<ProcessReport> {
    let index_path = config.index_path.clone().ok_or_else(|| {
        RunnerError::Usage("an index path is required (--index or index_path)".to_string())
    })?;
    let index = PathRowIndex::open(index_path)?;
    let store = JsonFileStore::new(&args.store);

    let updater = MosaicUpdater::new(config, index, store, metadata)?;
    Ok(updater.process(notification)?)
}
