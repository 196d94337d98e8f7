//! Subcommand implementations.
//!
//! Each command takes its parsed arguments and writes its result to `out`,
//! leaving logs to stderr.

pub mod lookup;
pub mod parse_scene;
pub mod pathrow_index;
pub mod update;
