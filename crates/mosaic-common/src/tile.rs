//! Web Mercator tile coordinates and quadkeys.
//!
//! Uses the OpenStreetMap Slippy Map tile naming convention:
//! - `z` is the zoom level (1-28)
//! - `x` is the column (0 to 2^z - 1, from west to east)
//! - `y` is the row (0 to 2^z - 1, from north to south)
//!
//! A tile's quadkey interleaves the bits of `x` and `y` from the most
//! significant bit down, one base-4 digit per zoom level.

use crate::{CommonError, Quadkey, Result};
use std::f64::consts::PI;

/// Minimum valid zoom level.
pub const MIN_ZOOM: u8 = 1;

/// Maximum zoom level supported by the index.
pub const MAX_ZOOM: u8 = 28;

/// Latitude limit of the Web Mercator projection, `atan(sinh(π))` in degrees.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Nudge applied to the east and south edges of a bounding box so that a box
/// ending exactly on a tile boundary does not pull in the next tile.
const LL_EPSILON: f64 = 1e-11;

/// Geographic bounds of a tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileBounds {
    /// Minimum latitude (south edge).
    pub min_lat: f64,
    /// Maximum latitude (north edge).
    pub max_lat: f64,
    /// Minimum longitude (west edge).
    pub min_lon: f64,
    /// Maximum longitude (east edge).
    pub max_lon: f64,
}

impl TileBounds {
    /// Check if a coordinate is within the bounds.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }

    /// Corners of the bounds as a closed `(lon, lat)` ring, counter-clockwise
    /// from the south-west corner.
    pub fn ring(&self) -> [(f64, f64); 5] {
        [
            (self.min_lon, self.min_lat),
            (self.max_lon, self.min_lat),
            (self.max_lon, self.max_lat),
            (self.min_lon, self.max_lat),
            (self.min_lon, self.min_lat),
        ]
    }
}

/// OSM-style tile coordinates (z, x, y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileCoord {
    /// Zoom level (1-28).
    pub z: u8,
    /// X coordinate (column, 0 at 180°W, increases eastward).
    pub x: u32,
    /// Y coordinate (row, 0 at ~85.05°N, increases southward).
    pub y: u32,
}

fn check_zoom(z: u8) -> Result<()> {
    if !(MIN_ZOOM..=MAX_ZOOM).contains(&z) {
        return Err(CommonError::InvalidZoomLevel(z));
    }
    Ok(())
}

impl TileCoord {
    /// Create a new tile coordinate, checking the ranges for the zoom level.
    pub fn new(z: u8, x: u32, y: u32) -> Result<Self> {
        check_zoom(z)?;
        let max_coord = 1u32 << z;
        if x >= max_coord || y >= max_coord {
            return Err(CommonError::TileOutOfRange { z, x, y });
        }
        Ok(Self { z, x, y })
    }

    /// Convert longitude/latitude to the tile containing it.
    ///
    /// Uses the OpenStreetMap Slippy Map tiling formula:
    /// - x = floor((lon + 180) / 360 * 2^z)
    /// - y = floor((1 - ln(tan(lat) + sec(lat)) / π) / 2 * 2^z)
    ///
    /// Latitudes beyond the Web Mercator limit are clamped to it.
    pub fn from_lon_lat(lon: f64, lat: f64, z: u8) -> Result<Self> {
        check_zoom(z)?;

        let lat_clamped = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        let lon_clamped = lon.clamp(-180.0, 180.0);

        let n = (1u64 << z) as f64;

        let x = ((lon_clamped + 180.0) / 360.0 * n).floor();

        let lat_rad = lat_clamped.to_radians();
        let y = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n).floor();

        // Clamp to valid range (handles edge cases at exactly ±180° and the poles)
        let max_coord = ((1u64 << z) - 1) as f64;
        let x = x.clamp(0.0, max_coord) as u32;
        let y = y.clamp(0.0, max_coord) as u32;

        Ok(Self { z, x, y })
    }

    /// Get the geographic bounding box for this tile.
    pub fn bounds(&self) -> TileBounds {
        let n = (1u64 << self.z) as f64;

        let min_lon = self.x as f64 / n * 360.0 - 180.0;
        let max_lon = (self.x as f64 + 1.0) / n * 360.0 - 180.0;

        // Inverse of the Slippy Map formula
        let max_lat = (PI * (1.0 - 2.0 * self.y as f64 / n)).sinh().atan().to_degrees();
        let min_lat = (PI * (1.0 - 2.0 * (self.y as f64 + 1.0) / n)).sinh().atan().to_degrees();

        TileBounds {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// The quadkey addressing this tile.
    pub fn quadkey(&self) -> Quadkey {
        let mut digits = String::with_capacity(self.z as usize);
        for i in (1..=self.z).rev() {
            let mask = 1u32 << (i - 1);
            let mut digit = b'0';
            if self.x & mask != 0 {
                digit += 1;
            }
            if self.y & mask != 0 {
                digit += 2;
            }
            digits.push(digit as char);
        }
        Quadkey::from_digits(digits)
    }

    /// Decode a quadkey back into tile coordinates.
    pub fn from_quadkey(quadkey: &Quadkey) -> Result<Self> {
        let z = quadkey.zoom();
        check_zoom(z)?;
        let mut x = 0u32;
        let mut y = 0u32;
        for (i, digit) in quadkey.as_str().bytes().enumerate() {
            let mask = 1u32 << (z as usize - 1 - i);
            match digit {
                b'0' => {}
                b'1' => x |= mask,
                b'2' => y |= mask,
                b'3' => {
                    x |= mask;
                    y |= mask;
                }
                _ => return Err(CommonError::InvalidQuadkey(quadkey.to_string())),
            }
        }
        Ok(Self { z, x, y })
    }

    /// All tiles at zoom `z` whose extent overlaps the bounding box
    /// `(west, south, east, north)`.
    ///
    /// A box with `west > east` is taken to cross the antimeridian and is
    /// split in two. Tiles are returned in column-major order.
    pub fn covering_bbox(west: f64, south: f64, east: f64, north: f64, z: u8) -> Result<Vec<Self>> {
        check_zoom(z)?;
        if west > east {
            let mut tiles = Self::covering_bbox(-180.0, south, east, north, z)?;
            tiles.extend(Self::covering_bbox(west, south, 180.0, north, z)?);
            return Ok(tiles);
        }

        let west = west.clamp(-180.0, 180.0);
        let east = east.clamp(-180.0, 180.0);
        let south = south.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        let north = north.clamp(-MAX_LATITUDE, MAX_LATITUDE);

        let ul = Self::from_lon_lat(west, north, z)?;
        let lr = Self::from_lon_lat(
            (east - LL_EPSILON).max(west),
            (south + LL_EPSILON).min(north),
            z,
        )?;

        let mut tiles = Vec::with_capacity((lr.x - ul.x + 1) as usize * (lr.y - ul.y + 1) as usize);
        for x in ul.x..=lr.x {
            for y in ul.y..=lr.y {
                tiles.push(Self { z, x, y });
            }
        }
        Ok(tiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tile_coord_equator() {
        let coord = TileCoord::from_lon_lat(0.0, 0.0, 12).unwrap();
        assert_eq!(coord.z, 12);
        // At zoom 12, x=2048 is the tile just east of the prime meridian
        assert_eq!(coord.x, 2048);
        // y=2048 is just south of the equator
        assert_eq!(coord.y, 2048);
    }

    #[test]
    fn test_tile_coord_roundtrip() {
        let test_points = [
            (-122.3321, 47.6062), // Seattle
            (-74.0060, 40.7128),  // New York
            (-0.1278, 51.5074),   // London
            (151.2093, -33.8688), // Sydney
            (0.0, 0.0),           // Null Island
        ];

        for (lon, lat) in test_points {
            let coord = TileCoord::from_lon_lat(lon, lat, 8).unwrap();
            let bounds = coord.bounds();
            assert!(
                bounds.contains(lat, lon),
                "({}, {}) not in {:?} for tile {:?}",
                lon,
                lat,
                bounds,
                coord
            );
        }
    }

    #[test]
    fn test_tile_bounds_whole_world_at_zoom_one() {
        let nw = TileCoord::new(1, 0, 0).unwrap().bounds();
        assert_relative_eq!(nw.min_lon, -180.0);
        assert_relative_eq!(nw.max_lon, 0.0);
        assert_relative_eq!(nw.min_lat, 0.0, epsilon = 1e-9);
        assert_relative_eq!(nw.max_lat, MAX_LATITUDE, epsilon = 1e-9);
    }

    #[test]
    fn test_quadkey_known_values() {
        assert_eq!(TileCoord::new(3, 3, 5).unwrap().quadkey().as_str(), "213");
        assert_eq!(TileCoord::new(1, 0, 0).unwrap().quadkey().as_str(), "0");
        assert_eq!(TileCoord::new(1, 1, 1).unwrap().quadkey().as_str(), "3");
        assert_eq!(TileCoord::new(2, 1, 2).unwrap().quadkey().as_str(), "21");
    }

    #[test]
    fn test_quadkey_roundtrip() {
        let coord = TileCoord::new(9, 300, 170).unwrap();
        let qk = coord.quadkey();
        assert_eq!(qk.zoom(), 9);
        assert_eq!(TileCoord::from_quadkey(&qk).unwrap(), coord);
    }

    #[test]
    fn test_from_quadkey_deepest_zoom() {
        let qk = Quadkey::parse(&"3".repeat(MAX_ZOOM as usize)).unwrap();
        let coord = TileCoord::from_quadkey(&qk).unwrap();
        let last = (1u32 << MAX_ZOOM) - 1;
        assert_eq!((coord.z, coord.x, coord.y), (MAX_ZOOM, last, last));
    }

    #[test]
    fn test_covering_bbox_single_tile() {
        let tiles = TileCoord::covering_bbox(1.0, 1.0, 2.0, 2.0, 4).unwrap();
        assert_eq!(tiles, vec![TileCoord::new(4, 8, 7).unwrap()]);
    }

    #[test]
    fn test_covering_bbox_edge_excludes_neighbour() {
        // East edge exactly on the prime meridian, which is a tile boundary at every zoom
        let tiles = TileCoord::covering_bbox(-10.0, 1.0, 0.0, 2.0, 4).unwrap();
        assert!(tiles.iter().all(|t| t.x < 8), "{:?}", tiles);
    }

    #[test]
    fn test_covering_bbox_antimeridian_split() {
        let tiles = TileCoord::covering_bbox(170.0, -5.0, -170.0, 5.0, 3).unwrap();
        let xs: Vec<u32> = tiles.iter().map(|t| t.x).collect();
        assert!(xs.contains(&0));
        assert!(xs.contains(&7));
        assert!(!xs.contains(&3));
    }

    #[test]
    fn test_covering_bbox_every_tile_overlaps() {
        let (west, south, east, north) = (-80.3, 35.1, -75.2, 40.9);
        for tile in TileCoord::covering_bbox(west, south, east, north, 7).unwrap() {
            let b = tile.bounds();
            assert!(b.min_lon <= east && b.max_lon >= west, "{:?}", tile);
            assert!(b.min_lat <= north && b.max_lat >= south, "{:?}", tile);
        }
    }

    #[test]
    fn test_invalid_zoom() {
        assert!(TileCoord::from_lon_lat(0.0, 0.0, 0).is_err());
        assert!(TileCoord::from_lon_lat(0.0, 0.0, 29).is_err());
        assert!(TileCoord::new(2, 4, 0).is_err());
    }
}
