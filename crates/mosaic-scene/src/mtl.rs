//! MTL metadata documents.
//!
//! Landsat MTL files are plain text, one `KEY = VALUE` pair per line, with
//! nested groups opened by `GROUP = NAME` and closed by `END_GROUP = NAME`:
//!
//! ```text
//! GROUP = L1_METADATA_FILE
//!   GROUP = IMAGE_ATTRIBUTES
//!     CLOUD_COVER = 12.34
//!     CLOUD_COVER_LAND = 5.67
//!   END_GROUP = IMAGE_ATTRIBUTES
//! END_GROUP = L1_METADATA_FILE
//! END
//! ```
//!
//! Values are typed by trying an integer, then a float, then falling back to
//! a string with surrounding double quotes removed.

use crate::{Result, SceneError};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// A value in an MTL document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MtlValue {
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Float(f64),
    /// String value, de-quoted.
    String(String),
    /// Nested group.
    Group(MtlGroup),
}

impl MtlValue {
    /// Type a raw value string: integer, then float, then de-quoted string.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(v) = trimmed.parse::<i64>() {
            return MtlValue::Integer(v);
        }
        if let Ok(v) = trimmed.parse::<f64>() {
            return MtlValue::Float(v);
        }
        MtlValue::String(trimmed.trim_matches('"').to_string())
    }

    /// Convert to f64 if numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MtlValue::Float(v) => Some(*v),
            MtlValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Convert to i64 if it is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MtlValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Borrow as a string if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MtlValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow as a group if it is one.
    pub fn as_group(&self) -> Option<&MtlGroup> {
        match self {
            MtlValue::Group(g) => Some(g),
            _ => None,
        }
    }
}

impl std::fmt::Display for MtlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MtlValue::Integer(v) => write!(f, "{}", v),
            MtlValue::Float(v) => write!(f, "{}", v),
            MtlValue::String(v) => write!(f, "{}", v),
            MtlValue::Group(g) => write!(f, "<group of {}>", g.len()),
        }
    }
}

/// A group of named values; the document root is itself a group.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct MtlGroup {
    entries: BTreeMap<String, MtlValue>,
}

impl MtlGroup {
    /// Look up a direct child.
    pub fn get(&self, key: &str) -> Option<&MtlValue> {
        self.entries.get(key)
    }

    /// Look up a direct child group.
    pub fn group(&self, key: &str) -> Option<&MtlGroup> {
        self.get(key).and_then(MtlValue::as_group)
    }

    /// Follow a path of group names, returning the final value.
    pub fn get_path(&self, path: &[&str]) -> Option<&MtlValue> {
        let (last, groups) = path.split_last()?;
        let mut current = self;
        for name in groups {
            current = current.group(name)?;
        }
        current.get(last)
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the group has no children.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, key: String, value: MtlValue) {
        self.entries.insert(key, value);
    }
}

struct Patterns {
    group: Regex,
    end_group: Regex,
    pair: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        group: Regex::new(r"^GROUP\s=\s([A-Z0-9_]+)").unwrap(),
        end_group: Regex::new(r"^END_GROUP\s=\s").unwrap(),
        pair: Regex::new(r"^(.*)\s=\s(.*)$").unwrap(),
    })
}

/// Parse an MTL text document into its root group.
///
/// Each `GROUP` pushes a new frame; each `END_GROUP` pops the top frame and
/// attaches it to its parent under the group's name. Lines without ` = ` (such
/// as the trailing `END`) are ignored. Groups still open at the end of the
/// text are discarded.
pub fn parse_mtl(text: &str) -> Result<MtlGroup> {
    let patterns = patterns();
    let mut stack: Vec<(String, MtlGroup)> = vec![(String::new(), MtlGroup::default())];

    for (line_no, raw) in text.lines().enumerate() {
        let line = raw.trim_start();

        if let Some(caps) = patterns.group.captures(line) {
            stack.push((caps[1].to_string(), MtlGroup::default()));
        } else if patterns.end_group.is_match(line) {
            if stack.len() < 2 {
                return Err(SceneError::MalformedMetadata(format!(
                    "END_GROUP without matching GROUP on line {}",
                    line_no + 1
                )));
            }
            if let Some((name, group)) = stack.pop() {
                if let Some((_, parent)) = stack.last_mut() {
                    parent.insert(name, MtlValue::Group(group));
                }
            }
        } else if let Some(caps) = patterns.pair.captures(line) {
            let key = caps[1].trim();
            if key.is_empty() {
                continue;
            }
            if let Some((_, current)) = stack.last_mut() {
                current.insert(key.to_string(), MtlValue::from_raw(&caps[2]));
            }
        }
    }

    stack.truncate(1);
    Ok(stack.pop().map(|(_, root)| root).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"GROUP = L1_METADATA_FILE
  GROUP = METADATA_FILE_INFO
    ORIGIN = "Image courtesy of the U.S. Geological Survey"
    LANDSAT_PRODUCT_ID = "LC08_L1TP_013001_20170101_20170110_01_RT"
    FILE_DATE = 2017-01-10T08:05:46Z
    PROCESSING_SOFTWARE_VERSION = "LPGS_2.7.0"
  END_GROUP = METADATA_FILE_INFO
  GROUP = IMAGE_ATTRIBUTES
    CLOUD_COVER = 25.38
    CLOUD_COVER_LAND = 17
    IMAGE_QUALITY_OLI = 9
    SUN_ELEVATION = -1.5e1
  END_GROUP = IMAGE_ATTRIBUTES
END_GROUP = L1_METADATA_FILE
END
"#;

    #[test]
    fn test_parse_nested_groups() {
        let doc = parse_mtl(SAMPLE).unwrap();
        assert_eq!(doc.len(), 1);
        let root = doc.group("L1_METADATA_FILE").unwrap();
        assert_eq!(root.len(), 2);
        assert!(root.group("IMAGE_ATTRIBUTES").is_some());
        assert!(root.group("METADATA_FILE_INFO").is_some());
    }

    #[test]
    fn test_value_typing_order() {
        let doc = parse_mtl(SAMPLE).unwrap();
        let attrs = doc
            .get_path(&["L1_METADATA_FILE", "IMAGE_ATTRIBUTES"])
            .unwrap()
            .as_group()
            .unwrap();
        assert_eq!(attrs.get("CLOUD_COVER"), Some(&MtlValue::Float(25.38)));
        assert_eq!(attrs.get("CLOUD_COVER_LAND"), Some(&MtlValue::Integer(17)));
        assert_eq!(attrs.get("SUN_ELEVATION"), Some(&MtlValue::Float(-15.0)));

        let info = doc.group("L1_METADATA_FILE").unwrap().group("METADATA_FILE_INFO").unwrap();
        assert_eq!(
            info.get("PROCESSING_SOFTWARE_VERSION").and_then(|v| v.as_str()),
            Some("LPGS_2.7.0")
        );
        assert_eq!(info.get("FILE_DATE").and_then(|v| v.as_str()), Some("2017-01-10T08:05:46Z"));
    }

    #[test]
    fn test_from_raw() {
        assert_eq!(MtlValue::from_raw(" 42 "), MtlValue::Integer(42));
        assert_eq!(MtlValue::from_raw("4.5"), MtlValue::Float(4.5));
        assert_eq!(MtlValue::from_raw("\"L1TP\""), MtlValue::String("L1TP".to_string()));
        assert_eq!(MtlValue::from_raw("UTM"), MtlValue::String("UTM".to_string()));
    }

    #[test]
    fn test_get_path_misses() {
        let doc = parse_mtl(SAMPLE).unwrap();
        assert!(doc.get_path(&[]).is_none());
        assert!(doc.get_path(&["L1_METADATA_FILE", "NOPE", "CLOUD_COVER"]).is_none());
        // A scalar can't be descended into
        assert!(doc
            .get_path(&["L1_METADATA_FILE", "IMAGE_ATTRIBUTES", "CLOUD_COVER", "X"])
            .is_none());
    }

    #[test]
    fn test_unbalanced_end_group_is_error() {
        let err = parse_mtl("END_GROUP = L1_METADATA_FILE\n").unwrap_err();
        assert!(matches!(err, SceneError::MalformedMetadata(_)));
    }

    #[test]
    fn test_unclosed_group_is_dropped() {
        let doc = parse_mtl("A = 1\nGROUP = OPEN\nB = 2\n").unwrap();
        assert_eq!(doc.get("A"), Some(&MtlValue::Integer(1)));
        assert!(doc.get("OPEN").is_none());
    }

    #[test]
    fn test_crlf_line_endings() {
        let doc = parse_mtl("GROUP = G\r\n  X = 3\r\nEND_GROUP = G\r\n").unwrap();
        assert_eq!(doc.get_path(&["G", "X"]), Some(&MtlValue::Integer(3)));
    }
}
