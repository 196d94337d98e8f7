//! Mosaic persistence.
//!
//! A mosaic table maps each quadkey to the scene ids whose footprint covers
//! it, most recent first.

use crate::{Result, UpdateError};
use mosaic_common::Quadkey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// The stored assets for one quadkey.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MosaicEntry {
    /// Quadkey.
    pub key: String,
    /// Scene ids, most recent first.
    #[serde(default)]
    pub assets: Vec<String>,
}

impl MosaicEntry {
    /// An entry with no assets.
    pub fn empty(key: &Quadkey) -> Self {
        Self {
            key: key.to_string(),
            assets: Vec::new(),
        }
    }

    /// An entry with the given assets.
    pub fn new(key: &Quadkey, assets: Vec<String>) -> Self {
        Self {
            key: key.to_string(),
            assets,
        }
    }
}

/// Keyed storage of mosaic entries, partitioned into named tables.
pub trait MosaicStore: Send + Sync {
    /// Read the entry for `key`; an absent entry is returned empty.
    fn get(&self, table: &str, key: &Quadkey) -> Result<MosaicEntry>;

    /// Write `entry`, replacing any previous entry with the same key.
    fn put(&self, table: &str, entry: &MosaicEntry) -> Result<()>;
}

impl<T: MosaicStore + ?Sized> MosaicStore for &T {
    fn get(&self, table: &str, key: &Quadkey) -> Result<MosaicEntry> {
        (**self).get(table, key)
    }

    fn put(&self, table: &str, entry: &MosaicEntry) -> Result<()> {
        (**self).put(table, entry)
    }
}

fn store_error(table: &str, key: &str, reason: impl std::fmt::Display) -> UpdateError {
    UpdateError::Store {
        table: table.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, BTreeMap<String, MosaicEntry>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries of a table, ordered by key.
    pub fn entries(&self, table: &str) -> Vec<MosaicEntry> {
        self.tables
            .read()
            .map(|tables| {
                tables
                    .get(table)
                    .map(|t| t.values().cloned().collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    /// Number of entries in a table.
    pub fn len(&self, table: &str) -> usize {
        self.tables
            .read()
            .map(|tables| tables.get(table).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    /// Whether a table has no entries.
    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }
}

impl MosaicStore for MemoryStore {
    fn get(&self, table: &str, key: &Quadkey) -> Result<MosaicEntry> {
        let tables = self.tables.read().map_err(|e| store_error(table, key.as_str(), e))?;
        Ok(tables
            .get(table)
            .and_then(|t| t.get(key.as_str()))
            .cloned()
            .unwrap_or_else(|| MosaicEntry::empty(key)))
    }

    fn put(&self, table: &str, entry: &MosaicEntry) -> Result<()> {
        let mut tables = self.tables.write().map_err(|e| store_error(table, &entry.key, e))?;
        tables
            .entry(table.to_string())
            .or_default()
            .insert(entry.key.clone(), entry.clone());
        Ok(())
    }
}

/// Store keeping one JSON file per entry at `<root>/<table>/<quadkey>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `root`. Directories are created on write.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding the entry for `key`.
    pub fn entry_path(&self, table: &str, key: &str) -> PathBuf {
        self.root.join(table).join(format!("{}.json", key))
    }
}

impl MosaicStore for JsonFileStore {
    fn get(&self, table: &str, key: &Quadkey) -> Result<MosaicEntry> {
        let path = self.entry_path(table, key.as_str());
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(MosaicEntry::empty(key));
            }
            Err(e) => return Err(store_error(table, key.as_str(), e)),
        };
        serde_json::from_str(&text).map_err(|e| store_error(table, key.as_str(), e))
    }

    fn put(&self, table: &str, entry: &MosaicEntry) -> Result<()> {
        if entry.key.is_empty() || entry.key.contains(['/', '\\', '.']) {
            return Err(store_error(table, &entry.key, "invalid entry key"));
        }

        let path = self.entry_path(table, &entry.key);
        let dir = self.root.join(table);
        fs::create_dir_all(&dir).map_err(|e| store_error(table, &entry.key, e))?;

        // Write then rename so readers never see a partial entry
        let tmp = dir.join(format!(".{}.json.tmp", entry.key));
        let text = serde_json::to_string(entry).map_err(|e| store_error(table, &entry.key, e))?;
        fs::write(&tmp, text).map_err(|e| store_error(table, &entry.key, e))?;
        fs::rename(&tmp, &path).map_err(|e| store_error(table, &entry.key, e))
    }
}
