/// Asset catalog boundary
///
/// The catalog is the authoritative index of media files on the device.
/// This core never creates or mutates catalog entries (the single exception
/// is delete-by-identifier, used by purge); everything else is read-only
/// querying. The trait keeps the engine testable against an in-memory
/// catalog while `SqliteCatalog` provides the on-disk binding.

pub mod sqlite;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::GalleryResult;

pub use sqlite::SqliteCatalog;

/// Media kind, derived from the MIME type's major component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// MIME prefix used when the catalog filters by kind ("image/", "video/")
    pub fn mime_prefix(&self) -> &'static str {
        match self {
            MediaKind::Image => "image/",
            MediaKind::Video => "video/",
        }
    }
}

/// One media item as exposed by the catalog.
///
/// `thumbnail_path` and `metadata` are not catalog columns: the catalog
/// leaves them `None` and the query facade fills them in per listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Stable catalog identifier (strictly positive)
    pub id: i64,
    /// Display locator for the asset
    pub uri: String,
    /// Display name (e.g. "IMG_2041.jpg")
    pub name: String,
    pub kind: MediaKind,
    /// Size in bytes
    pub size: u64,
    /// Seconds since epoch
    pub date_added: i64,
    /// Seconds since epoch
    pub date_modified: i64,
    /// Pixel dimensions; absent for some videos
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Duration in seconds; video only
    pub duration_secs: Option<u32>,
    /// The catalog's native grouping key
    pub bucket_id: String,
    pub bucket_name: String,
    /// Absolute filesystem path, when the catalog can resolve one
    pub data_path: Option<String>,
    /// Cached thumbnail location, populated by the facade
    pub thumbnail_path: Option<String>,
    /// Per-view extras (e.g. `deletedAt` in the recycle-bin view)
    pub metadata: Option<serde_json::Value>,
}

impl Asset {
    /// Resolve the locator a caller should display: prefer the real file
    /// path, otherwise synthesize a kind-scoped content locator.
    pub fn display_uri(&self) -> String {
        match &self.data_path {
            Some(p) if !p.is_empty() => p.clone(),
            _ => match self.kind {
                MediaKind::Image => format!("media://image/{}", self.id),
                MediaKind::Video => format!("media://video/{}", self.id),
            },
        }
    }
}

/// Query shape accepted by the catalog.
///
/// All conditions are AND-ed; results are always ordered by add-time
/// descending. The overlay layer owns pagination, so there is no
/// limit/offset here.
#[derive(Debug, Clone, Default)]
pub struct AssetQuery {
    /// Restrict to one bucket
    pub bucket_id: Option<String>,
    /// Restrict by MIME major kind
    pub kind: Option<MediaKind>,
    /// Case-insensitive substring match on the display name
    pub name_contains: Option<String>,
    /// Only these identifiers (trashed-only / hidden-only views)
    pub include_ids: Option<HashSet<i64>>,
    /// Never these identifiers (normal view)
    pub exclude_ids: Option<HashSet<i64>>,
}

/// Read/delete boundary with the external media catalog
pub trait AssetCatalog: Send + Sync {
    /// Run a filtered query, ordered by add-time descending.
    fn query(&self, query: &AssetQuery) -> GalleryResult<Vec<Asset>>;

    /// Delete one asset by identifier. Returns the affected-row count;
    /// a count greater than zero means the delete took effect.
    fn delete(&self, id: i64) -> GalleryResult<usize>;
}
