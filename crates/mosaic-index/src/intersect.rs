//! Exact footprint to tile intersection.

use crate::Result;
use geo::{BoundingRect, Intersects};
use geo_types::{LineString, MultiPolygon, Polygon};
use mosaic_common::{Quadkey, TileCoord};
use std::collections::BTreeSet;

/// The exact geographic polygon of a tile.
pub fn tile_polygon(tile: &TileCoord) -> Polygon<f64> {
    Polygon::new(LineString::from(tile.bounds().ring().to_vec()), vec![])
}

/// Quadkeys of all tiles at `zoom` that intersect `footprint`.
///
/// Candidates come from the footprint's bounding box, then each candidate's
/// tile polygon is tested against the footprint itself, so tiles that only
/// overlap the bounding box are dropped. Touching the boundary counts as
/// intersecting. An empty footprint covers no tiles.
pub fn intersecting_tiles(footprint: &MultiPolygon<f64>, zoom: u8) -> Result<BTreeSet<Quadkey>> {
    let Some(rect) = footprint.bounding_rect() else {
        // Still reject a bad zoom for empty input
        TileCoord::covering_bbox(0.0, 0.0, 0.0, 0.0, zoom)?;
        return Ok(BTreeSet::new());
    };

    let candidates =
        TileCoord::covering_bbox(rect.min().x, rect.min().y, rect.max().x, rect.max().y, zoom)?;

    Ok(candidates
        .into_iter()
        .filter(|tile| footprint.intersects(&tile_polygon(tile)))
        .map(|tile| tile.quadkey())
        .collect())
}
