//! Path-row and quadkey keys.

use crate::{CommonError, Result, MAX_ZOOM};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Width of each half of a path-row key.
const PART_WIDTH: usize = 3;

/// A WRS-2 ground-track key: a 3-digit zero-padded path followed by a
/// 3-digit zero-padded row.
///
/// Path 13, row 1 is stored as `"013001"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathRow(String);

impl PathRow {
    /// Create a path-row key from numeric path and row.
    pub fn new(path: u16, row: u16) -> Result<Self> {
        if path > 999 || row > 999 {
            return Err(CommonError::InvalidPathRow(format!("path={} row={}", path, row)));
        }
        Ok(Self(format!("{:03}{:03}", path, row)))
    }

    /// Create a path-row key from path and row strings, left-padding each
    /// with zeros to three characters.
    ///
    /// `("13", "1")` and `("013", "001")` both give `"013001"`.
    pub fn from_parts(path: &str, row: &str) -> Result<Self> {
        let path = zero_pad(path.trim())?;
        let row = zero_pad(row.trim())?;
        Ok(Self(format!("{}{}", path, row)))
    }

    /// Parse a 6-digit path-row key.
    pub fn parse(key: &str) -> Result<Self> {
        let key = key.trim();
        if key.len() != 2 * PART_WIDTH || !key.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CommonError::InvalidPathRow(key.to_string()));
        }
        Ok(Self(key.to_string()))
    }

    /// The zero-padded path (first three digits).
    pub fn path(&self) -> &str {
        &self.0[..PART_WIDTH]
    }

    /// The zero-padded row (last three digits).
    pub fn row(&self) -> &str {
        &self.0[PART_WIDTH..]
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn zero_pad(part: &str) -> Result<String> {
    if part.is_empty() || part.len() > PART_WIDTH || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CommonError::InvalidPathRow(part.to_string()));
    }
    Ok(format!("{:0>width$}", part, width = PART_WIDTH))
}

impl fmt::Display for PathRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PathRow {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PathRow {
    type Error = CommonError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<PathRow> for String {
    fn from(value: PathRow) -> Self {
        value.0
    }
}

/// Quadtree address of a Web Mercator tile.
///
/// Each character is one of `0`, `1`, `2`, `3`; the length equals the zoom
/// level, at most [`MAX_ZOOM`]. The key is used as the persistence key for
/// mosaic entries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Quadkey(String);

impl Quadkey {
    /// Parse and validate a quadkey string.
    pub fn parse(key: &str) -> Result<Self> {
        let digits_ok = key.bytes().all(|b| (b'0'..=b'3').contains(&b));
        if key.is_empty() || key.len() > MAX_ZOOM as usize || !digits_ok {
            return Err(CommonError::InvalidQuadkey(key.to_string()));
        }
        Ok(Self(key.to_string()))
    }

    /// Build a quadkey from digits already known to be valid.
    pub(crate) fn from_digits(digits: String) -> Self {
        Self(digits)
    }

    /// Zoom level encoded by this quadkey.
    pub fn zoom(&self) -> u8 {
        self.0.len() as u8
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Quadkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Quadkey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Quadkey {
    type Error = CommonError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Quadkey> for String {
    fn from(value: Quadkey) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pathrow_new_pads() {
        let pr = PathRow::new(13, 1).unwrap();
        assert_eq!(pr.as_str(), "013001");
        assert_eq!(pr.path(), "013");
        assert_eq!(pr.row(), "001");
    }

    #[test]
    fn test_pathrow_from_parts_matches_numeric() {
        assert_eq!(PathRow::from_parts("13", "1").unwrap(), PathRow::new(13, 1).unwrap());
        assert_eq!(PathRow::from_parts("013", "001").unwrap().as_str(), "013001");
        assert_eq!(PathRow::from_parts("233", "248").unwrap().as_str(), "233248");
    }

    #[test]
    fn test_pathrow_rejects_bad_input() {
        assert!(PathRow::new(1000, 1).is_err());
        assert!(PathRow::from_parts("1a", "1").is_err());
        assert!(PathRow::from_parts("1234", "1").is_err());
        assert!(PathRow::from_parts("", "1").is_err());
        assert!(PathRow::parse("01300").is_err());
        assert!(PathRow::parse("01300x").is_err());
    }

    #[test]
    fn test_pathrow_serde_as_plain_string() {
        let pr = PathRow::new(44, 34).unwrap();
        let json = serde_json::to_string(&pr).unwrap();
        assert_eq!(json, "\"044034\"");
        let back: PathRow = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pr);
        assert!(serde_json::from_str::<PathRow>("\"44034\"").is_err());
    }

    #[test]
    fn test_quadkey_validation() {
        let qk = Quadkey::parse("0231").unwrap();
        assert_eq!(qk.zoom(), 4);
        assert!(Quadkey::parse("").is_err());
        assert!(Quadkey::parse("0241").is_err());
    }

    #[test]
    fn test_quadkey_longer_than_max_zoom() {
        let deepest = "3".repeat(MAX_ZOOM as usize);
        assert_eq!(Quadkey::parse(&deepest).unwrap().zoom(), MAX_ZOOM);

        for len in [MAX_ZOOM as usize + 1, 257] {
            let err = Quadkey::parse(&"0".repeat(len)).unwrap_err();
            assert!(matches!(err, CommonError::InvalidQuadkey(_)));
        }
        assert!(serde_json::from_str::<Quadkey>(&format!("\"{}\"", "1".repeat(29))).is_err());
    }

    #[test]
    fn test_keys_order_lexically() {
        let mut keys = vec![
            PathRow::new(200, 5).unwrap(),
            PathRow::new(13, 1).unwrap(),
            PathRow::new(13, 0).unwrap(),
        ];
        keys.sort();
        let strs: Vec<&str> = keys.iter().map(|k| k.as_str()).collect();
        assert_eq!(strs, vec!["013000", "013001", "200005"]);
    }
}
