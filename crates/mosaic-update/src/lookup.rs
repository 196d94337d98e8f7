//! Reading the persisted path-row index.
//!
//! A single-document index is decoded on first use and kept in memory. A
//! line-oriented index is scanned on each lookup; only lines mentioning the
//! requested key are decoded.

use crate::{Result, UpdateError};
use mosaic_common::{open_index_reader, IndexFormat, IndexLayout, PathRow, Quadkey};
use std::collections::HashMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

type IndexDocument = HashMap<String, Vec<Quadkey>>;

/// Read access to a persisted path-row index file.
#[derive(Debug)]
pub struct PathRowIndex {
    path: PathBuf,
    format: IndexFormat,
    document: OnceLock<IndexDocument>,
}

impl PathRowIndex {
    /// Open an index, detecting its format from the file name.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let format = IndexFormat::from_path(path.as_ref());
        Self::with_format(path, format)
    }

    /// Open an index with an explicit format.
    pub fn with_format<P: AsRef<Path>>(path: P, format: IndexFormat) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(UpdateError::IndexRead {
                path,
                reason: "not a file".to_string(),
            });
        }
        Ok(Self {
            path,
            format,
            document: OnceLock::new(),
        })
    }

    /// Path of the index file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Detected or given format.
    pub fn format(&self) -> IndexFormat {
        self.format
    }

    /// Quadkeys covering `path`/`row`, zero-padding each to three digits.
    ///
    /// An unknown path-row gives an empty list.
    pub fn lookup(&self, path: &str, row: &str) -> Result<Vec<Quadkey>> {
        let pathrow = PathRow::from_parts(path, row).map_err(|e| self.read_error(e))?;
        self.lookup_pathrow(&pathrow)
    }

    /// Quadkeys covering a path-row. An unknown path-row gives an empty list.
    pub fn lookup_pathrow(&self, pathrow: &PathRow) -> Result<Vec<Quadkey>> {
        let quadkeys = match self.format.layout {
            IndexLayout::Document => {
                self.document()?.get(pathrow.as_str()).cloned().unwrap_or_default()
            }
            IndexLayout::Lines => self.scan_lines(pathrow.as_str())?,
        };
        debug!(%pathrow, quadkeys = quadkeys.len(), "index lookup");
        Ok(quadkeys)
    }

    fn document(&self) -> Result<&IndexDocument> {
        if let Some(document) = self.document.get() {
            return Ok(document);
        }
        let reader = self.reader()?;
        let document: IndexDocument =
            serde_json::from_reader(reader).map_err(|e| self.read_error(e))?;
        debug!(path = %self.path.display(), pathrows = document.len(), "loaded index document");
        Ok(self.document.get_or_init(|| document))
    }

    fn reader(&self) -> Result<Box<dyn BufRead>> {
        open_index_reader(&self.path, self.format.compression).map_err(|e| self.read_error(e))
    }

    fn scan_lines(&self, key: &str) -> Result<Vec<Quadkey>> {
        let reader = self.reader()?;
        let needle = format!("\"{}\"", key);

        for line in reader.lines() {
            let line = line.map_err(|e| self.read_error(e))?;
            if !line.contains(&needle) {
                continue;
            }
            let mut entry: IndexDocument =
                serde_json::from_str(&line).map_err(|e| self.read_error(e))?;
            if let Some(quadkeys) = entry.remove(key) {
                return Ok(quadkeys);
            }
        }
        Ok(Vec::new())
    }

    fn read_error(&self, err: impl std::fmt::Display) -> UpdateError {
        UpdateError::IndexRead {
            path: self.path.clone(),
            reason: err.to_string(),
        }
    }
}

/// Open the index at `index_path` and look up one path-row.
pub fn lookup<P: AsRef<Path>>(index_path: P, path: &str, row: &str) -> Result<Vec<Quadkey>> {
    PathRowIndex::open(index_path)?.lookup(path, row)
}
