//! `parse-scene`: decode a scene identifier.

use crate::Result;
use clap::Args;
use mosaic_scene::{parse_scene_id, LANDSAT_BUCKET};
use serde_json::Value;
use std::io::Write;

/// Arguments for the parse-scene command.
#[derive(Debug, Args)]
pub struct ParseSceneArgs {
    /// Landsat 8 scene identifier.
    pub scene_id: String,
}

/// Execute the parse-scene command, printing the metadata as JSON.
pub fn execute<W: Write>(args: &ParseSceneArgs, mut out: W) -> Result<()> {
    let meta = parse_scene_id(&args.scene_id)?;

    let mut value = serde_json::to_value(&meta)?;
    if let Value::Object(map) = &mut value {
        map.insert("bucket".to_string(), Value::from(LANDSAT_BUCKET));
        map.insert("prefix".to_string(), Value::from(meta.prefix()));
    }
    serde_json::to_writer_pretty(&mut out, &value)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RunnerError;

    #[test]
    fn test_prints_prefix() {
        let mut out = Vec::new();
        let args = ParseSceneArgs {
            scene_id: "LC80130012017001LGN00".to_string(),
        };
        execute(&args, &mut out).unwrap();

        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["prefix"], "L8/013/001/LC80130012017001LGN00");
        assert_eq!(value["acquisition_date"], "2017-01-01");
        assert_eq!(value["pathrow"], "013001");
    }

    #[test]
    fn test_invalid_id() {
        let args = ParseSceneArgs {
            scene_id: "LE07_L1TP_013001_20170101_20170110_01_RT".to_string(),
        };
        assert!(matches!(execute(&args, Vec::new()), Err(RunnerError::Scene(_))));
    }
}
