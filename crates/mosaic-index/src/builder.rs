//! Building a path-row index from a WRS-2 grid dataset.
//!
//! The grid is read as a GeoJSON `FeatureCollection` with one polygon (or
//! multipolygon) feature per path-row. Each feature is keyed by:
//! - the `PR` property (configurable), either a 6-character string such as
//!   `"013001"` or an integer such as `13001`
//! - or else numeric `PATH` and `ROW` properties

use crate::intersect::intersecting_tiles;
use crate::{IndexError, Result};
use geojson::{Feature, GeoJson};
use mosaic_common::{PathRow, Quadkey, MAX_ZOOM, MIN_ZOOM};
use mosaic_metrics::{metric_defs, metrics};
use serde_json::Value;
use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default name of the feature property holding the path-row.
pub const DEFAULT_PATHROW_ATTRIBUTE: &str = "PR";

/// Mapping from path-row to the quadkeys of the tiles covering its footprint.
///
/// Both path-rows and quadkeys iterate in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpatialIndex {
    zoom: u8,
    entries: BTreeMap<PathRow, BTreeSet<Quadkey>>,
}

impl SpatialIndex {
    /// Create an empty index at `zoom`.
    pub fn new(zoom: u8) -> Self {
        Self {
            zoom,
            entries: BTreeMap::new(),
        }
    }

    /// Quadkey zoom level of the index.
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Add quadkeys for a path-row, merging with any already present.
    pub fn insert(&mut self, pathrow: PathRow, quadkeys: BTreeSet<Quadkey>) {
        self.entries.entry(pathrow).or_default().extend(quadkeys);
    }

    /// Quadkeys covering a path-row.
    pub fn get(&self, pathrow: &PathRow) -> Option<&BTreeSet<Quadkey>> {
        self.entries.get(pathrow)
    }

    /// Number of path-rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index has no path-rows.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over path-rows and their quadkeys in ascending order.
    pub fn iter(&self) -> btree_map::Iter<'_, PathRow, BTreeSet<Quadkey>> {
        self.entries.iter()
    }

    /// Total quadkey references across all path-rows.
    pub fn total_quadkeys(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    /// Number of path-rows whose footprint covers no tile.
    pub fn uncovered(&self) -> usize {
        self.entries.values().filter(|q| q.is_empty()).count()
    }
}

impl<'a> IntoIterator for &'a SpatialIndex {
    type Item = (&'a PathRow, &'a BTreeSet<Quadkey>);
    type IntoIter = btree_map::Iter<'a, PathRow, BTreeSet<Quadkey>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Builds a [`SpatialIndex`] from a grid dataset.
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    zoom: u8,
    attribute: String,
}

impl IndexBuilder {
    /// Create a builder for quadkeys at `zoom`.
    pub fn new(zoom: u8) -> Result<Self> {
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
            return Err(IndexError::InvalidZoomLevel(zoom));
        }
        Ok(Self {
            zoom,
            attribute: DEFAULT_PATHROW_ATTRIBUTE.to_string(),
        })
    }

    /// Read the path-row from a different feature property.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = attribute.into();
        self
    }

    /// Quadkey zoom level.
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Build the index from a GeoJSON file.
    pub fn build_from_path<P: AsRef<Path>>(&self, path: P) -> Result<SpatialIndex> {
        let path = path.as_ref();
        info!(path = %path.display(), zoom = self.zoom, "reading grid dataset");

        let text = std::fs::read_to_string(path).map_err(|e| dataset_error(path, e.to_string()))?;
        let geojson: GeoJson = text
            .parse()
            .map_err(|e: geojson::Error| dataset_error(path, e.to_string()))?;
        self.build_from_geojson(geojson, path)
    }

    /// Build the index from parsed GeoJSON. `source` is only used in errors.
    pub fn build_from_geojson(&self, geojson: GeoJson, source: &Path) -> Result<SpatialIndex> {
        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(dataset_error(source, "expected a FeatureCollection"));
        };

        let mut index = SpatialIndex::new(self.zoom);
        let features = collection.features.len();

        for (i, feature) in collection.features.into_iter().enumerate() {
            let pathrow = self.feature_pathrow(&feature).ok_or_else(|| {
                let reason = format!("feature {} has no usable {} attribute", i, self.attribute);
                dataset_error(source, reason)
            })?;
            let footprint = footprint(feature)
                .map_err(|reason| dataset_error(source, format!("feature {}: {}", i, reason)))?;

            let quadkeys = intersecting_tiles(&footprint, self.zoom)?;
            debug!(%pathrow, quadkeys = quadkeys.len(), "indexed path-row");
            metrics::histogram!(metric_defs::INDEX_QUADKEYS.name).record(quadkeys.len() as f64);

            if index.get(&pathrow).is_some() {
                warn!(%pathrow, "path-row appears more than once; merging footprints");
            }
            index.insert(pathrow, quadkeys);
        }

        info!(
            features,
            pathrows = index.len(),
            quadkeys = index.total_quadkeys(),
            uncovered = index.uncovered(),
            zoom = self.zoom,
            "built path-row index"
        );
        Ok(index)
    }

    fn feature_pathrow(&self, feature: &Feature) -> Option<PathRow> {
        if let Some(value) = feature.property(&self.attribute) {
            return pathrow_from_value(value);
        }
        let path = feature.property("PATH").and_then(Value::as_u64)?;
        let row = feature.property("ROW").and_then(Value::as_u64)?;
        PathRow::new(u16::try_from(path).ok()?, u16::try_from(row).ok()?).ok()
    }
}

/// Build a path-row index from a GeoJSON grid file using the default
/// attribute.
pub fn build_index<P: AsRef<Path>>(path: P, zoom: u8) -> Result<SpatialIndex> {
    IndexBuilder::new(zoom)?.build_from_path(path)
}

fn dataset_error(path: &Path, reason: impl Into<String>) -> IndexError {
    IndexError::DatasetRead {
        path: PathBuf::from(path),
        reason: reason.into(),
    }
}

/// Interpret a path-row property: a 6-digit string, or an integer
/// `path * 1000 + row`. Shorter digit strings are zero-padded on the left.
fn pathrow_from_value(value: &Value) -> Option<PathRow> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || s.len() > 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            PathRow::parse(&format!("{:0>6}", s)).ok()
        }
        Value::Number(n) => {
            let n = n.as_u64()?;
            if n > 999_999 {
                return None;
            }
            PathRow::parse(&format!("{:06}", n)).ok()
        }
        _ => None,
    }
}

fn footprint(feature: Feature) -> std::result::Result<geo_types::MultiPolygon<f64>, String> {
    let geometry = feature.geometry.ok_or_else(|| "missing geometry".to_string())?;
    let geometry: geo_types::Geometry<f64> = geometry
        .try_into()
        .map_err(|e: geojson::Error| e.to_string())?;

    match geometry {
        geo_types::Geometry::Polygon(p) => Ok(geo_types::MultiPolygon::new(vec![p])),
        geo_types::Geometry::MultiPolygon(mp) => Ok(mp),
        other => Err(format!("unsupported geometry type {}", geometry_name(&other))),
    }
}

fn geometry_name(geometry: &geo_types::Geometry<f64>) -> &'static str {
    match geometry {
        geo_types::Geometry::Point(_) => "Point",
        geo_types::Geometry::LineString(_) => "LineString",
        geo_types::Geometry::MultiPoint(_) => "MultiPoint",
        geo_types::Geometry::MultiLineString(_) => "MultiLineString",
        geo_types::Geometry::GeometryCollection(_) => "GeometryCollection",
        _ => "non-polygonal geometry",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collection(features: Value) -> GeoJson {
        json!({ "type": "FeatureCollection", "features": features })
            .to_string()
            .parse()
            .unwrap()
    }

    fn square_feature(properties: Value, west: f64, south: f64) -> Value {
        json!({
            "type": "Feature",
            "properties": properties,
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [west, south], [west + 1.0, south], [west + 1.0, south + 1.0],
                    [west, south + 1.0], [west, south]
                ]]
            }
        })
    }

    fn build(geojson: GeoJson) -> Result<SpatialIndex> {
        IndexBuilder::new(1)?.build_from_geojson(geojson, Path::new("grid.geojson"))
    }

    #[test]
    fn test_string_and_integer_attributes() {
        let index = build(collection(json!([
            square_feature(json!({"PR": "013001"}), 10.0, 10.0),
            square_feature(json!({"PR": 14002}), -20.0, -20.0),
        ])))
        .unwrap();

        assert_eq!(index.len(), 2);
        let a = index.get(&PathRow::parse("013001").unwrap()).unwrap();
        assert_eq!(a.iter().map(Quadkey::as_str).collect::<Vec<_>>(), vec!["1"]);
        let b = index.get(&PathRow::parse("014002").unwrap()).unwrap();
        assert_eq!(b.iter().map(Quadkey::as_str).collect::<Vec<_>>(), vec!["2"]);
    }

    #[test]
    fn test_path_row_fallback() {
        let feature = square_feature(json!({"PATH": 13, "ROW": 1}), 0.5, 0.5);
        let index = build(collection(json!([feature]))).unwrap();
        assert!(index.get(&PathRow::new(13, 1).unwrap()).is_some());
    }

    #[test]
    fn test_custom_attribute() {
        let builder = IndexBuilder::new(1).unwrap().with_attribute("WRSPR");
        let index = builder
            .build_from_geojson(
                collection(json!([square_feature(json!({"WRSPR": "13001"}), 0.5, 0.5)])),
                Path::new("grid.geojson"),
            )
            .unwrap();
        assert!(index.get(&PathRow::parse("013001").unwrap()).is_some());
    }

    #[test]
    fn test_missing_attribute_is_dataset_error() {
        let feature = square_feature(json!({"NAME": "x"}), 0.0, 0.0);
        let err = build(collection(json!([feature]))).unwrap_err();
        assert!(matches!(err, IndexError::DatasetRead { .. }));
    }

    #[test]
    fn test_missing_geometry_is_dataset_error() {
        let err = build(collection(json!([
            {"type": "Feature", "properties": {"PR": "013001"}, "geometry": null}
        ])))
        .unwrap_err();
        assert!(matches!(err, IndexError::DatasetRead { .. }));
    }

    #[test]
    fn test_point_geometry_is_dataset_error() {
        let err = build(collection(json!([
            {"type": "Feature", "properties": {"PR": "013001"},
             "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}}
        ])))
        .unwrap_err();
        assert!(err.to_string().contains("Point"));
    }

    #[test]
    fn test_not_a_feature_collection() {
        let geojson: GeoJson = r#"{"type":"Point","coordinates":[0.0,0.0]}"#.parse().unwrap();
        let err = build(geojson).unwrap_err();
        assert!(matches!(err, IndexError::DatasetRead { .. }));
    }

    #[test]
    fn test_duplicate_pathrows_merge() {
        let index = build(collection(json!([
            square_feature(json!({"PR": "013001"}), 10.0, 10.0),
            square_feature(json!({"PR": "013001"}), -20.0, -20.0),
        ])))
        .unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.total_quadkeys(), 2);
    }

    #[test]
    fn test_invalid_zoom() {
        assert!(matches!(IndexBuilder::new(0), Err(IndexError::InvalidZoomLevel(0))));
        assert!(matches!(IndexBuilder::new(29), Err(IndexError::InvalidZoomLevel(29))));
    }

    #[test]
    fn test_missing_file() {
        let err = build_index("/nonexistent/grid.geojson", 7).unwrap_err();
        assert!(matches!(err, IndexError::DatasetRead { .. }));
    }

    #[test]
    fn test_pathrow_from_value() {
        assert_eq!(pathrow_from_value(&json!("013001")).unwrap().as_str(), "013001");
        assert_eq!(pathrow_from_value(&json!(233248)).unwrap().as_str(), "233248");
        assert_eq!(pathrow_from_value(&json!(1001)).unwrap().as_str(), "001001");
        assert!(pathrow_from_value(&json!("13-001")).is_none());
        assert!(pathrow_from_value(&json!(1_000_000)).is_none());
        assert!(pathrow_from_value(&json!(null)).is_none());
    }
}
