//! Updater configuration.

use crate::{Result, UpdateError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the cloud-filtered table.
pub const ENV_TABLE_NAME: &str = "DYNAMODB_CLOUDLESS_TABLE_NAME";

/// Environment variable naming the unfiltered table.
pub const ENV_UNFILTERED_TABLE_NAME: &str = "DYNAMODB_TABLE_NAME";

/// Environment variable holding the cloud cover threshold.
pub const ENV_MAX_CLOUD_COVER: &str = "MAX_CLOUD_COVER";

/// Default cloud cover threshold, in percent.
pub const DEFAULT_MAX_CLOUD_COVER: f64 = 20.0;

/// Configuration of a [`MosaicUpdater`](crate::MosaicUpdater).
///
/// Every field has a default, so a YAML file only needs the fields it
/// changes:
///
/// ```yaml
/// table_name: landsat-cloudless
/// unfiltered_table: landsat-all
/// max_cloud_cover: 10
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// Table receiving scenes at or below `max_cloud_cover`.
    pub table_name: String,
    /// Table receiving every accepted scene regardless of cloud cover.
    pub unfiltered_table: Option<String>,
    /// Cloud cover threshold in percent, inclusive.
    pub max_cloud_cover: f64,
    /// Use `CLOUD_COVER_LAND` instead of `CLOUD_COVER`.
    pub cloud_cover_land: bool,
    /// Only accept real-time (`RT`) scenes.
    pub real_time_only: bool,
    /// Path-row index file.
    pub index_path: Option<PathBuf>,
    /// Base URL for MTL downloads; the public bucket when unset.
    pub metadata_url: Option<String>,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            table_name: String::new(),
            unfiltered_table: None,
            max_cloud_cover: DEFAULT_MAX_CLOUD_COVER,
            cloud_cover_land: true,
            real_time_only: true,
            index_path: None,
            metadata_url: None,
        }
    }
}

impl UpdaterConfig {
    /// Configuration writing to `table_name` with all other defaults.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| UpdateError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text)
    }

    /// Check that the configuration can drive an update.
    pub fn validate(&self) -> Result<()> {
        if self.table_name.trim().is_empty() {
            return Err(UpdateError::Config("table_name must be set".to_string()));
        }
        if !(0.0..=100.0).contains(&self.max_cloud_cover) {
            return Err(UpdateError::Config(format!(
                "max_cloud_cover must be between 0 and 100, got {}",
                self.max_cloud_cover
            )));
        }
        match &self.unfiltered_table {
            Some(t) if t.trim().is_empty() => {
                return Err(UpdateError::Config("unfiltered_table is empty".to_string()));
            }
            Some(t) if *t == self.table_name => {
                return Err(UpdateError::Config(
                    "unfiltered_table must differ from table_name".to_string(),
                ));
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = UpdaterConfig::new("mosaic");
        assert_eq!(config.max_cloud_cover, 20.0);
        assert!(config.cloud_cover_land);
        assert!(config.real_time_only);
        assert!(config.unfiltered_table.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_yaml_partial() {
        let yaml = "table_name: cloudless\nunfiltered_table: all\nmax_cloud_cover: 10\n";
        let config = UpdaterConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.table_name, "cloudless");
        assert_eq!(config.unfiltered_table.as_deref(), Some("all"));
        assert_eq!(config.max_cloud_cover, 10.0);
        assert!(config.real_time_only);
        config.validate().unwrap();
    }

    #[test]
    fn test_yaml_unknown_type() {
        assert!(matches!(
            UpdaterConfig::from_yaml_str("max_cloud_cover: lots"),
            Err(UpdateError::Yaml(_))
        ));
    }

    #[test]
    fn test_validate() {
        assert!(UpdaterConfig::default().validate().is_err());

        let mut config = UpdaterConfig::new("t");
        config.max_cloud_cover = 101.0;
        assert!(config.validate().is_err());
        config.max_cloud_cover = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = UpdaterConfig::new("t");
        config.unfiltered_table = Some("t".to_string());
        assert!(config.validate().is_err());
        config.unfiltered_table = Some(" ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            UpdaterConfig::from_yaml_file("/nonexistent/updater.yaml"),
            Err(UpdateError::Config(_))
        ));
    }
}
