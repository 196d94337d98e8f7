//! On-disk layout of the path-row → quadkey index.
//!
//! The index is written in one of two layouts:
//! - **Document**: a single JSON object `{"013001": ["0231", ...], ...}`
//! - **Lines**: newline-delimited JSON, one `{"013001": [...]}` object per line,
//!   so a reader can stop at the first matching line
//!
//! Either layout may be gzip-compressed as a whole stream. Both properties are
//! inferred from the file name: a trailing `.gz` selects gzip, and a `.jsonl`
//! or `.ndjson` extension (before any `.gz`) selects the line layout.

use crate::Result;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// Record layout of an index file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexLayout {
    /// One JSON object holding every path-row.
    #[default]
    Document,
    /// One single-key JSON object per line.
    Lines,
}

/// Whole-stream compression of an index file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Plain UTF-8 text.
    #[default]
    None,
    /// Gzip stream.
    Gzip,
}

/// Layout and compression of an index file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexFormat {
    /// Record layout.
    pub layout: IndexLayout,
    /// Stream compression.
    pub compression: Compression,
}

impl IndexFormat {
    /// Create a format from its parts.
    pub fn new(layout: IndexLayout, compression: Compression) -> Self {
        Self {
            layout,
            compression,
        }
    }

    /// Infer the format from a file name.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let name = path
            .as_ref()
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        let (stem, compression) = match name.strip_suffix(".gz") {
            Some(stem) => (stem, Compression::Gzip),
            None => (name.as_str(), Compression::None),
        };

        let layout = if stem.ends_with(".jsonl") || stem.ends_with(".ndjson") {
            IndexLayout::Lines
        } else {
            IndexLayout::Document
        };

        Self {
            layout,
            compression,
        }
    }

    /// Conventional file extension for this format, without a leading dot.
    pub fn extension(&self) -> &'static str {
        match (self.layout, self.compression) {
            (IndexLayout::Document, Compression::None) => "json",
            (IndexLayout::Document, Compression::Gzip) => "json.gz",
            (IndexLayout::Lines, Compression::None) => "jsonl",
            (IndexLayout::Lines, Compression::Gzip) => "jsonl.gz",
        }
    }
}

/// Open an index file for buffered reading, decompressing gzip transparently
/// when `compression` says so.
pub fn open_index_reader<P: AsRef<Path>>(
    path: P,
    compression: Compression,
) -> Result<Box<dyn BufRead>> {
    let file = File::open(path.as_ref())?;
    let reader: Box<dyn BufRead> = match compression {
        Compression::None => Box::new(BufReader::new(file)),
        Compression::Gzip => Box::new(BufReader::new(GzDecoder::new(file))),
    };
    Ok(reader)
}

/// A writer that optionally gzip-compresses what is written through it.
///
/// Call [`IndexWriter::finish`] to flush the gzip trailer; dropping the writer
/// without finishing may leave a truncated stream.
pub enum IndexWriter<W: Write> {
    /// Pass-through writer.
    Plain(W),
    /// Gzip encoder at best compression.
    Gzip(GzEncoder<W>),
}

impl<W: Write> IndexWriter<W> {
    /// Wrap `inner` according to `compression`.
    pub fn new(inner: W, compression: Compression) -> Self {
        match compression {
            Compression::None => IndexWriter::Plain(inner),
            Compression::Gzip => {
                IndexWriter::Gzip(GzEncoder::new(inner, flate2::Compression::best()))
            }
        }
    }

    /// Finish the stream and return the inner writer.
    pub fn finish(self) -> io::Result<W> {
        match self {
            IndexWriter::Plain(mut w) => {
                w.flush()?;
                Ok(w)
            }
            IndexWriter::Gzip(encoder) => {
                let mut w = encoder.finish()?;
                w.flush()?;
                Ok(w)
            }
        }
    }
}

impl<W: Write> Write for IndexWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            IndexWriter::Plain(w) => w.write(buf),
            IndexWriter::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            IndexWriter::Plain(w) => w.flush(),
            IndexWriter::Gzip(w) => w.flush(),
        }
    }
}
