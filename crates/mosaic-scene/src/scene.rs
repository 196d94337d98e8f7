//! Landsat 8 scene identifier parsing.

use crate::{Result, SceneError};
use chrono::{Duration, NaiveDate};
use mosaic_common::PathRow;
use regex::{Captures, Regex};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Public bucket holding the Landsat 8 archive.
pub const LANDSAT_BUCKET: &str = "landsat-pds";

/// Which identifier grammar a scene id was parsed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneFormat {
    /// Fixed-width identifier without delimiters, e.g. `LC80130012017001LGN00`.
    PreCollection,
    /// Underscore-delimited Collection 1 product id.
    Collection,
}

/// Processing maturity of a collection scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CollectionCategory {
    /// Tier 1, final product.
    #[serde(rename = "T1")]
    Tier1,
    /// Tier 2, final product.
    #[serde(rename = "T2")]
    Tier2,
    /// Real-time, provisional product.
    #[serde(rename = "RT")]
    RealTime,
}

impl CollectionCategory {
    /// Returns the two-letter code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CollectionCategory::Tier1 => "T1",
            CollectionCategory::Tier2 => "T2",
            CollectionCategory::RealTime => "RT",
        }
    }
}

impl fmt::Display for CollectionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionCategory {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "T1" => Ok(CollectionCategory::Tier1),
            "T2" => Ok(CollectionCategory::Tier2),
            "RT" => Ok(CollectionCategory::RealTime),
            other => Err(SceneError::InvalidSceneIdentifier(format!(
                "unknown collection category {}",
                other
            ))),
        }
    }
}

/// Metadata decoded from a scene identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneMeta {
    /// The identifier this metadata was parsed from.
    pub scene_id: String,
    /// Grammar the identifier matched.
    pub format: SceneFormat,
    /// Sensor letter (`C` = OLI/TIRS combined, `O` = OLI, `T` = TIRS, ...).
    pub sensor: String,
    /// Satellite number as written in the identifier (`8` or `08`).
    pub satellite: String,
    /// Zero-padded WRS-2 path.
    pub path: String,
    /// Zero-padded WRS-2 row.
    pub row: String,
    /// Path-row key of the scene footprint.
    pub pathrow: PathRow,
    /// Acquisition date.
    pub acquisition_date: NaiveDate,
    /// Processing date (collection ids only).
    pub processing_date: Option<NaiveDate>,
    /// Processing correction level, e.g. `L1TP` (collection ids only).
    pub correction_level: Option<String>,
    /// Ground station identifier, e.g. `LGN` (pre-collection ids only).
    pub ground_station: Option<String>,
    /// Archive version number (pre-collection ids only).
    pub archive_version: Option<String>,
    /// Two-digit collection number (collection ids only).
    pub collection_number: Option<String>,
    /// Collection category (collection ids only).
    pub collection_category: Option<CollectionCategory>,
}

impl SceneMeta {
    /// Whether this is a real-time (`RT`) collection scene.
    pub fn is_real_time(&self) -> bool {
        self.collection_category == Some(CollectionCategory::RealTime)
    }

    /// Object key prefix of the scene's directory in [`LANDSAT_BUCKET`].
    ///
    /// Collection scenes live under `c{n}/L8/{path}/{row}/{scene_id}`;
    /// pre-collection scenes under `L8/{path}/{row}/{scene_id}`.
    pub fn prefix(&self) -> String {
        let base = format!("L8/{}/{}/{}", self.path, self.row, self.scene_id);
        match self.collection_number.as_deref().and_then(|n| n.parse::<u32>().ok()) {
            Some(n) => format!("c{}/{}", n, base),
            None => base,
        }
    }

    /// Object key of the scene's MTL metadata document.
    pub fn mtl_key(&self) -> String {
        format!("{}/{}_MTL.txt", self.prefix(), self.scene_id)
    }
}

struct Grammars {
    collection: Regex,
    pre_collection: Regex,
}

fn grammars() -> &'static Grammars {
    static GRAMMARS: OnceLock<Grammars> = OnceLock::new();
    GRAMMARS.get_or_init(|| Grammars {
        collection: Regex::new(concat!(
            r"^L(?P<sensor>[COTEM])(?P<satellite>08)",
            r"_(?P<correction_level>L\d[A-Z]{2})",
            r"_(?P<path>\d{3})(?P<row>\d{3})",
            r"_(?P<acq_year>\d{4})(?P<acq_month>\d{2})(?P<acq_day>\d{2})",
            r"_(?P<proc_year>\d{4})(?P<proc_month>\d{2})(?P<proc_day>\d{2})",
            r"_(?P<collection_number>\d{2})",
            r"_(?P<collection_category>T1|T2|RT)$",
        ))
        .unwrap(),
        pre_collection: Regex::new(concat!(
            r"^L(?P<sensor>[COTEM])(?P<satellite>8)",
            r"(?P<path>\d{3})(?P<row>\d{3})",
            r"(?P<acq_year>\d{4})(?P<acq_julian_day>\d{3})",
            r"(?P<ground_station>[A-Z]{3})(?P<archive_version>\d{2})$",
        ))
        .unwrap(),
    })
}

/// Parse a Landsat 8 scene identifier.
///
/// The collection grammar is tried first, then the pre-collection grammar.
pub fn parse_scene_id(scene_id: &str) -> Result<SceneMeta> {
    let grammars = grammars();
    if let Some(caps) = grammars.collection.captures(scene_id) {
        return parse_collection(scene_id, &caps);
    }
    if let Some(caps) = grammars.pre_collection.captures(scene_id) {
        return parse_pre_collection(scene_id, &caps);
    }
    Err(SceneError::InvalidSceneIdentifier(scene_id.to_string()))
}

fn group<'a>(caps: &'a Captures<'_>, name: &str) -> &'a str {
    caps.name(name).map(|m| m.as_str()).unwrap_or_default()
}

fn number(caps: &Captures<'_>, name: &str) -> i64 {
    // Every numeric group is a fixed run of ASCII digits
    group(caps, name).parse().unwrap_or_default()
}

fn pathrow(scene_id: &str, caps: &Captures<'_>) -> Result<PathRow> {
    PathRow::from_parts(group(caps, "path"), group(caps, "row"))
        .map_err(|_| SceneError::InvalidSceneIdentifier(scene_id.to_string()))
}

fn calendar_date(scene_id: &str, year: i64, month: i64, day: i64) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32).ok_or_else(|| {
        SceneError::InvalidDate {
            scene_id: scene_id.to_string(),
            reason: format!("{:04}-{:02}-{:02} is not a calendar date", year, month, day),
        }
    })
}

fn parse_collection(scene_id: &str, caps: &Captures<'_>) -> Result<SceneMeta> {
    let acquisition_date = calendar_date(
        scene_id,
        number(caps, "acq_year"),
        number(caps, "acq_month"),
        number(caps, "acq_day"),
    )?;
    let processing_date = calendar_date(
        scene_id,
        number(caps, "proc_year"),
        number(caps, "proc_month"),
        number(caps, "proc_day"),
    )?;

    Ok(SceneMeta {
        scene_id: scene_id.to_string(),
        format: SceneFormat::Collection,
        sensor: group(caps, "sensor").to_string(),
        satellite: group(caps, "satellite").to_string(),
        path: group(caps, "path").to_string(),
        row: group(caps, "row").to_string(),
        pathrow: pathrow(scene_id, caps)?,
        acquisition_date,
        processing_date: Some(processing_date),
        correction_level: Some(group(caps, "correction_level").to_string()),
        ground_station: None,
        archive_version: None,
        collection_number: Some(group(caps, "collection_number").to_string()),
        collection_category: Some(group(caps, "collection_category").parse()?),
    })
}

fn parse_pre_collection(scene_id: &str, caps: &Captures<'_>) -> Result<SceneMeta> {
    // Day-of-year counts from 1, so January 1st plus (day - 1) days
    let first_of_year = calendar_date(scene_id, number(caps, "acq_year"), 1, 1)?;
    let offset = Duration::days(number(caps, "acq_julian_day") - 1);
    let acquisition_date = first_of_year
        .checked_add_signed(offset)
        .ok_or_else(|| SceneError::InvalidDate {
            scene_id: scene_id.to_string(),
            reason: format!("day of year {} out of range", group(caps, "acq_julian_day")),
        })?;

    Ok(SceneMeta {
        scene_id: scene_id.to_string(),
        format: SceneFormat::PreCollection,
        sensor: group(caps, "sensor").to_string(),
        satellite: group(caps, "satellite").to_string(),
        path: group(caps, "path").to_string(),
        row: group(caps, "row").to_string(),
        pathrow: pathrow(scene_id, caps)?,
        acquisition_date,
        processing_date: None,
        correction_level: None,
        ground_station: Some(group(caps, "ground_station").to_string()),
        archive_version: Some(group(caps, "archive_version").to_string()),
        collection_number: None,
        collection_category: None,
    })
}
