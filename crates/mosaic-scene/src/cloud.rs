//! Cloud cover resolution from scene MTL documents.
//!
//! MTL documents are fetched through a [`MetadataSource`]:
//! - [`HttpMetadataSource`] downloads `{base_url}/{prefix}/{scene_id}_MTL.txt`
//!   from the public Landsat bucket
//! - [`LocalMetadataSource`] reads `{scene_id}_MTL.txt` from a directory,
//!   for offline runs and tests
//!
//! Source: http://landsat-pds.s3.amazonaws.com/c1/L8/{path}/{row}/{scene_id}/{scene_id}_MTL.txt

use crate::{parse_mtl, MtlGroup, Result, SceneError, SceneMeta};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Base URL of the public Landsat 8 bucket.
pub const DEFAULT_METADATA_URL: &str = "http://landsat-pds.s3.amazonaws.com";

/// Request timeout for metadata downloads.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Root group names of Collection 1 and Collection 2 MTL documents.
const ROOT_GROUPS: [&str; 2] = ["L1_METADATA_FILE", "LANDSAT_METADATA_FILE"];

/// Group holding the cloud cover fields.
const IMAGE_ATTRIBUTES: &str = "IMAGE_ATTRIBUTES";

/// Something that can produce the raw MTL text for a scene.
pub trait MetadataSource {
    /// Fetch the MTL document text for `scene`.
    ///
    /// Failures are reported as [`SceneError::MetadataUnavailable`].
    fn fetch_mtl_text(&self, scene: &SceneMeta) -> Result<String>;
}

impl<T: MetadataSource + ?Sized> MetadataSource for &T {
    fn fetch_mtl_text(&self, scene: &SceneMeta) -> Result<String> {
        (**self).fetch_mtl_text(scene)
    }
}

fn unavailable(scene: &SceneMeta, reason: impl Into<String>) -> SceneError {
    SceneError::MetadataUnavailable {
        scene_id: scene.scene_id.clone(),
        reason: reason.into(),
    }
}

/// Downloads MTL documents over HTTP with a blocking client.
pub struct HttpMetadataSource {
    /// Bucket base URL, without a trailing slash.
    base_url: String,
    /// HTTP client for downloading metadata.
    client: reqwest::blocking::Client,
}

impl fmt::Debug for HttpMetadataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMetadataSource")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl HttpMetadataSource {
    /// Create a source reading from the public Landsat bucket.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_METADATA_URL)
    }

    /// Create a source reading from a different bucket or mirror.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { base_url, client })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the MTL document for a scene.
    pub fn mtl_url(&self, scene: &SceneMeta) -> String {
        format!("{}/{}", self.base_url, scene.mtl_key())
    }
}

impl MetadataSource for HttpMetadataSource {
    fn fetch_mtl_text(&self, scene: &SceneMeta) -> Result<String> {
        let url = self.mtl_url(scene);
        debug!(%url, "fetching MTL");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| unavailable(scene, e.to_string()))?;

        if !response.status().is_success() {
            return Err(unavailable(scene, format!("HTTP {} from {}", response.status(), url)));
        }

        response.text().map_err(|e| unavailable(scene, e.to_string()))
    }
}

/// Reads MTL documents named `{scene_id}_MTL.txt` from a local directory.
#[derive(Debug, Clone)]
pub struct LocalMetadataSource {
    dir: PathBuf,
}

impl LocalMetadataSource {
    /// Create a source reading from `dir`.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the MTL file for a scene.
    pub fn mtl_path(&self, scene: &SceneMeta) -> PathBuf {
        self.dir.join(format!("{}_MTL.txt", scene.scene_id))
    }
}

impl MetadataSource for LocalMetadataSource {
    fn fetch_mtl_text(&self, scene: &SceneMeta) -> Result<String> {
        let path = self.mtl_path(scene);
        std::fs::read_to_string(&path)
            .map_err(|e| unavailable(scene, format!("{}: {}", path.display(), e)))
    }
}

/// Fetch and parse the MTL document for a scene.
pub fn fetch_mtl<S: MetadataSource + ?Sized>(source: &S, scene: &SceneMeta) -> Result<MtlGroup> {
    let text = source.fetch_mtl_text(scene)?;
    parse_mtl(&text).map_err(|e| unavailable(scene, e.to_string()))
}

/// Read the cloud cover percentage from a parsed MTL document.
///
/// With `land` set, reads `CLOUD_COVER_LAND`; otherwise `CLOUD_COVER`.
pub fn cloud_cover_from_mtl(doc: &MtlGroup, land: bool) -> Option<f64> {
    let field = if land { "CLOUD_COVER_LAND" } else { "CLOUD_COVER" };
    ROOT_GROUPS
        .iter()
        .find_map(|root| doc.get_path(&[*root, IMAGE_ATTRIBUTES, field]))
        .and_then(|v| v.as_f64())
}

/// Fetch a scene's MTL document and return its cloud cover percentage.
pub fn cloud_cover<S: MetadataSource + ?Sized>(
    source: &S,
    scene: &SceneMeta,
    land: bool,
) -> Result<f64> {
    let doc = fetch_mtl(source, scene)?;
    cloud_cover_from_mtl(&doc, land).ok_or_else(|| {
        unavailable(
            scene,
            format!(
                "no numeric {} in {}",
                if land { "CLOUD_COVER_LAND" } else { "CLOUD_COVER" },
                IMAGE_ATTRIBUTES
            ),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_scene_id;
    use approx::assert_relative_eq;

    struct Canned(&'static str);

    impl MetadataSource for Canned {
        fn fetch_mtl_text(&self, _scene: &SceneMeta) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    const C1: &str = "GROUP = L1_METADATA_FILE\n  GROUP = IMAGE_ATTRIBUTES\n    CLOUD_COVER = 25.38\n    CLOUD_COVER_LAND = 17.02\n  END_GROUP = IMAGE_ATTRIBUTES\nEND_GROUP = L1_METADATA_FILE\nEND\n";

    fn scene() -> SceneMeta {
        parse_scene_id("LC08_L1TP_013001_20170101_20170110_01_RT").unwrap()
    }

    #[test]
    fn test_land_and_total_metric() {
        assert_relative_eq!(cloud_cover(&Canned(C1), &scene(), true).unwrap(), 17.02);
        assert_relative_eq!(cloud_cover(&Canned(C1), &scene(), false).unwrap(), 25.38);
    }

    #[test]
    fn test_collection_2_root_group() {
        let c2 = "GROUP = LANDSAT_METADATA_FILE\n  GROUP = IMAGE_ATTRIBUTES\n    CLOUD_COVER_LAND = 3\n  END_GROUP = IMAGE_ATTRIBUTES\nEND_GROUP = LANDSAT_METADATA_FILE\n";
        assert_relative_eq!(cloud_cover(&Canned(c2), &scene(), true).unwrap(), 3.0);
    }

    #[test]
    fn test_missing_field_is_unavailable() {
        let doc = "GROUP = L1_METADATA_FILE\nEND_GROUP = L1_METADATA_FILE\n";
        let err = cloud_cover(&Canned(doc), &scene(), true).unwrap_err();
        assert!(matches!(err, SceneError::MetadataUnavailable { .. }));
    }

    #[test]
    fn test_malformed_document_is_unavailable() {
        let err = cloud_cover(&Canned("END_GROUP = X\n"), &scene(), true).unwrap_err();
        assert!(matches!(err, SceneError::MetadataUnavailable { .. }));
    }

    #[test]
    fn test_mtl_url() {
        let source = HttpMetadataSource::with_base_url("http://example.com/bucket/").unwrap();
        assert_eq!(
            source.mtl_url(&scene()),
            "http://example.com/bucket/c1/L8/013/001/LC08_L1TP_013001_20170101_20170110_01_RT/LC08_L1TP_013001_20170101_20170110_01_RT_MTL.txt"
        );
    }

    #[test]
    fn test_local_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalMetadataSource::new(dir.path());
        let err = fetch_mtl(&source, &scene()).unwrap_err();
        assert!(matches!(err, SceneError::MetadataUnavailable { .. }));
    }

    #[test]
    fn test_local_source_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalMetadataSource::new(dir.path());
        std::fs::write(source.mtl_path(&scene()), C1).unwrap();
        assert_relative_eq!(cloud_cover(&source, &scene(), true).unwrap(), 17.02);
    }
}
