//! Serializing a [`SpatialIndex`] to the persisted index formats.
//!
//! - [`IndexLayout::Document`]: one compact JSON object,
//!   `{"013001":["0231",...],...}`
//! - [`IndexLayout::Lines`]: one `{"013001":[...]}` object per line
//!
//! Either layout may be gzip-compressed at best compression.

use crate::{Result, SpatialIndex};
use mosaic_common::{IndexFormat, IndexLayout, IndexWriter, PathRow, Quadkey};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Write `index` to `writer` in `format`, returning the writer once the
/// stream is complete.
pub fn write_index<W: Write>(index: &SpatialIndex, writer: W, format: IndexFormat) -> Result<W> {
    let mut out = IndexWriter::new(writer, format.compression);

    match format.layout {
        IndexLayout::Document => {
            let document: BTreeMap<&PathRow, &BTreeSet<Quadkey>> = index.iter().collect();
            serde_json::to_writer(&mut out, &document)?;
        }
        IndexLayout::Lines => {
            for (i, (pathrow, quadkeys)) in index.iter().enumerate() {
                if i > 0 {
                    out.write_all(b"\n")?;
                }
                let line = BTreeMap::from([(pathrow, quadkeys)]);
                serde_json::to_writer(&mut out, &line)?;
            }
        }
    }

    Ok(out.finish()?)
}

/// Write `index` to a file, choosing the format from the file name unless
/// one is given.
pub fn write_index_file<P: AsRef<Path>>(
    index: &SpatialIndex,
    path: P,
    format: Option<IndexFormat>,
) -> Result<()> {
    let path = path.as_ref();
    let format = format.unwrap_or_else(|| IndexFormat::from_path(path));
    let file = BufWriter::new(File::create(path)?);
    let mut file = write_index(index, file, format)?;
    file.flush()?;
    info!(path = %path.display(), ?format, pathrows = index.len(), "wrote path-row index");
    Ok(())
}
