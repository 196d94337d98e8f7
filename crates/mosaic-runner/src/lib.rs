//! # mosaic-runner
//!
//! Command-line interface for the Landsat mosaic index.
//!
//! ## Commands
//!
//! - `landsat-mosaic pathrow-index` - build the path-row to quadkey index
//! - `landsat-mosaic update` - apply a new-scene notification to the mosaics
//! - `landsat-mosaic lookup` - print the quadkeys covering a path-row
//! - `landsat-mosaic parse-scene` - decode a scene identifier
//!
//! ## Configuration
//!
//! `update` reads an optional YAML file (`--config`), then applies flags and
//! these environment variables:
//!
//! - `DYNAMODB_CLOUDLESS_TABLE_NAME` - table for low cloud cover scenes
//! - `DYNAMODB_TABLE_NAME` - table for all scenes
//! - `MAX_CLOUD_COVER` - cloud cover threshold in percent (default 20)
//!
//! Logs go to stderr and honour `RUST_LOG` (default `info`).

pub mod commands;
mod error;

use clap::{Parser, Subcommand};

pub use error::RunnerError;

/// Result type for runner operations.
pub type Result<T> = std::result::Result<T, RunnerError>;

/// Landsat 8 mosaic index tools.
#[derive(Debug, Parser)]
#[command(name = "landsat-mosaic")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a file of path-rows to quadkeys from a WRS-2 grid.
    PathrowIndex(commands::pathrow_index::PathrowIndexArgs),
    /// Add the scenes of a notification to the mosaic tables.
    Update(commands::update::UpdateArgs),
    /// Print the quadkeys covering a path-row.
    Lookup(commands::lookup::LookupArgs),
    /// Decode a scene identifier.
    ParseScene(commands::parse_scene::ParseSceneArgs),
}

impl Cli {
    /// Run the selected command against the given standard streams.
    pub fn run<R: std::io::Read, W: std::io::Write>(&self, stdin: R, out: W) -> Result<()> {
        match &self.command {
            Commands::PathrowIndex(args) => commands::pathrow_index::execute(args, out),
            Commands::Update(args) => commands::update::execute(args, stdin, out),
            Commands::Lookup(args) => commands::lookup::execute(args, out),
            Commands::ParseScene(args) => commands::parse_scene::execute(args, out),
        }
    }
}
