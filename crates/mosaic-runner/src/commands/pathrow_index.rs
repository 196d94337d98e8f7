//! `pathrow-index`: build the path-row to quadkey index from a grid file.

use crate::Result;
use clap::Args;
use mosaic_common::{Compression, IndexFormat, IndexLayout};
use mosaic_index::{write_index, write_index_file, IndexBuilder, DEFAULT_PATHROW_ATTRIBUTE};
use std::io::Write;
use std::path::PathBuf;

/// Arguments for the pathrow-index command.
#[derive(Debug, Args)]
pub struct PathrowIndexArgs {
    /// WRS-2 grid as a GeoJSON FeatureCollection.
    pub grid: PathBuf,

    /// Quadkey zoom level to use in the index. 7 or 8 is a good choice.
    #[arg(short = 'z', long = "quadkey-zoom")]
    pub zoom: u8,

    /// Gzip-compress the output.
    #[arg(long)]
    pub gzip: bool,

    /// Write one JSON object per line instead of a single document.
    #[arg(long)]
    pub jsonl: bool,

    /// Feature property holding the path-row.
    #[arg(long, default_value = DEFAULT_PATHROW_ATTRIBUTE)]
    pub attribute: String,

    /// Output file. Without `--gzip`/`--jsonl` the format follows its
    /// extension. Defaults to stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl PathrowIndexArgs {
    fn explicit_format(&self) -> Option<IndexFormat> {
        if !self.gzip && !self.jsonl {
            return None;
        }
        Some(IndexFormat::new(
            if self.jsonl { IndexLayout::Lines } else { IndexLayout::Document },
            if self.gzip { Compression::Gzip } else { Compression::None },
        ))
    }
}

/// Execute the pathrow-index command.
pub fn execute<W: Write>(args: &PathrowIndexArgs, out: W) -> Result<()> {
    let index = IndexBuilder::new(args.zoom)?
        .with_attribute(&args.attribute)
        .build_from_path(&args.grid)?;

    match &args.output {
        Some(path) => write_index_file(&index, path, args.explicit_format())?,
        None => {
            let mut out = write_index(&index, out, args.explicit_format().unwrap_or_default())?;
            out.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: PathrowIndexArgs,
    }

    #[test]
    fn test_args_parsing() {
        let cli = TestCli::parse_from(["test", "-z", "8", "--gzip", "wrs2.geojson"]);
        assert_eq!(cli.args.zoom, 8);
        assert_eq!(cli.args.attribute, "PR");
        assert_eq!(
            cli.args.explicit_format(),
            Some(IndexFormat::new(IndexLayout::Document, Compression::Gzip))
        );
    }

    #[test]
    fn test_format_from_output_extension() {
        let cli = TestCli::parse_from(["test", "-z", "7", "-o", "index.jsonl.gz", "wrs2.geojson"]);
        assert_eq!(cli.args.explicit_format(), None);
    }

    #[test]
    fn test_zoom_required() {
        assert!(TestCli::try_parse_from(["test", "wrs2.geojson"]).is_err());
    }
}
