//! `lookup`: print the quadkeys covering a path-row.

use crate::Result;
use clap::Args;
use mosaic_update::PathRowIndex;
use std::io::Write;
use std::path::PathBuf;

/// Arguments for the lookup command.
#[derive(Debug, Args)]
pub struct LookupArgs {
    /// Index file (`.json`, `.jsonl`, optionally `.gz`).
    #[arg(long)]
    pub index: PathBuf,

    /// WRS-2 path.
    pub path: String,

    /// WRS-2 row.
    pub row: String,
}

/// Execute the lookup command, printing a JSON array of quadkeys.
pub fn execute<W: Write>(args: &LookupArgs, mut out: W) -> Result<()> {
    let quadkeys = PathRowIndex::open(&args.index)?.lookup(&args.path, &args.row)?;
    serde_json::to_writer(&mut out, &quadkeys)?;
    writeln!(out)?;
    Ok(())
}
