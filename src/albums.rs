/// Album aggregation
///
/// Real albums come from the catalog's buckets; three synthetic albums
/// (Favorites, Hidden, Recycle Bin) are appended with reserved identifiers.
/// Internally an album id is a tagged variant, so a synthetic album can
/// never collide with a bucket; the sentinel strings only exist at the
/// serialization boundary.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::catalog::Asset;

pub const FAVORITES_ALBUM_ID: &str = "-1";
pub const HIDDEN_ALBUM_ID: &str = "-2";
pub const RECYCLE_BIN_ALBUM_ID: &str = "-3";

/// True when an album-id string denotes a synthetic view, not a bucket
pub fn is_reserved_album_id(id: &str) -> bool {
    matches!(id, FAVORITES_ALBUM_ID | HIDDEN_ALBUM_ID | RECYCLE_BIN_ALBUM_ID)
}

/// Album identity. Bucket ids from the catalog are non-negative, so the
/// negative sentinels cannot collide by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AlbumId {
    Bucket(String),
    Favorites,
    Hidden,
    RecycleBin,
}

impl AlbumId {
    pub fn parse(id: &str) -> Self {
        match id {
            FAVORITES_ALBUM_ID => AlbumId::Favorites,
            HIDDEN_ALBUM_ID => AlbumId::Hidden,
            RECYCLE_BIN_ALBUM_ID => AlbumId::RecycleBin,
            _ => AlbumId::Bucket(id.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AlbumId::Bucket(id) => id,
            AlbumId::Favorites => FAVORITES_ALBUM_ID,
            AlbumId::Hidden => HIDDEN_ALBUM_ID,
            AlbumId::RecycleBin => RECYCLE_BIN_ALBUM_ID,
        }
    }

    pub fn is_reserved(&self) -> bool {
        !matches!(self, AlbumId::Bucket(_))
    }
}

impl fmt::Display for AlbumId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AlbumId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AlbumId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(AlbumId::parse(&raw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlbumKind {
    System,
    Custom,
    Hidden,
    RecycleBin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: AlbumId,
    pub name: String,
    pub kind: AlbumKind,
    pub cover_uri: Option<String>,
    /// Derived at query time, never stored
    pub media_count: usize,
    /// Max date-modified over the album's assets (seconds since epoch)
    pub last_modified: Option<i64>,
    pub metadata: Option<serde_json::Value>,
}

/// Per-bucket accumulator fed one catalog partition at a time
/// (images first, then videos, per the facade).
#[derive(Default)]
pub struct AlbumAccumulator {
    order: Vec<String>,
    counts: HashMap<String, usize>,
    names: HashMap<String, String>,
    covers: HashMap<String, String>,
    last_modified: HashMap<String, i64>,
}

impl AlbumAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one partition's entries into the running aggregation
    pub fn scan(&mut self, entries: impl IntoIterator<Item = Asset>) {
        for asset in entries {
            let bucket = asset.bucket_id.clone();
            if !self.counts.contains_key(&bucket) {
                self.order.push(bucket.clone());
                self.names.insert(bucket.clone(), asset.bucket_name.clone());
                // First entry seen decides the cover; a real file path
                // beats a synthesized locator
                let cover = asset
                    .data_path
                    .clone()
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(|| asset.uri.clone());
                self.covers.insert(bucket.clone(), cover);
            }
            *self.counts.entry(bucket.clone()).or_insert(0) += 1;

            let last = self.last_modified.entry(bucket).or_insert(i64::MIN);
            if asset.date_modified > *last {
                *last = asset.date_modified;
            }
        }
    }

    /// Emit one system album per bucket (first-seen order), then the
    /// synthetic albums with counts drawn from the side-state sets.
    pub fn finish(self, trashed_count: usize, hidden_count: usize) -> Vec<Album> {
        let mut albums: Vec<Album> = self
            .order
            .into_iter()
            .map(|bucket| Album {
                name: self.names.get(&bucket).cloned().unwrap_or_default(),
                kind: AlbumKind::System,
                cover_uri: self.covers.get(&bucket).cloned(),
                media_count: self.counts.get(&bucket).copied().unwrap_or(0),
                last_modified: self.last_modified.get(&bucket).copied(),
                metadata: None,
                id: AlbumId::Bucket(bucket),
            })
            .collect();

        albums.extend(synthetic_albums(trashed_count, hidden_count));
        albums
    }
}

/// The three reserved albums. Favorites stays at count 0: favorites
/// tracking lives outside this core.
pub fn synthetic_albums(trashed_count: usize, hidden_count: usize) -> Vec<Album> {
    vec![
        Album {
            id: AlbumId::Favorites,
            name: "Favorites".to_string(),
            kind: AlbumKind::Custom,
            cover_uri: None,
            media_count: 0,
            last_modified: None,
            metadata: None,
        },
        Album {
            id: AlbumId::Hidden,
            name: "Hidden".to_string(),
            kind: AlbumKind::Hidden,
            cover_uri: None,
            media_count: hidden_count,
            last_modified: None,
            metadata: None,
        },
        Album {
            id: AlbumId::RecycleBin,
            name: "Recycle Bin".to_string(),
            kind: AlbumKind::RecycleBin,
            cover_uri: None,
            media_count: trashed_count,
            last_modified: None,
            metadata: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MediaKind;

    fn asset(id: i64, bucket: &str, modified: i64, data_path: Option<&str>) -> Asset {
        Asset {
            id,
            uri: format!("media://image/{id}"),
            name: format!("img_{id}.jpg"),
            kind: MediaKind::Image,
            size: 100,
            date_added: id,
            date_modified: modified,
            width: None,
            height: None,
            duration_secs: None,
            bucket_id: bucket.to_string(),
            bucket_name: bucket.to_string(),
            data_path: data_path.map(|p| p.to_string()),
            thumbnail_path: None,
            metadata: None,
        }
    }

    #[test]
    fn test_counts_and_running_max_last_modified() {
        let mut acc = AlbumAccumulator::new();
        acc.scan(vec![
            asset(1, "camera", 50, None),
            asset(2, "camera", 90, None),
            asset(3, "camera", 70, None),
            asset(4, "screenshots", 10, None),
        ]);
        let albums = acc.finish(0, 0);

        let camera = &albums[0];
        assert_eq!(camera.id, AlbumId::Bucket("camera".to_string()));
        assert_eq!(camera.media_count, 3);
        assert_eq!(camera.last_modified, Some(90));
        assert_eq!(camera.kind, AlbumKind::System);

        assert_eq!(albums[1].media_count, 1);
    }

    #[test]
    fn test_cover_is_first_seen_preferring_data_path() {
        let mut acc = AlbumAccumulator::new();
        acc.scan(vec![
            asset(1, "camera", 1, Some("/sdcard/DCIM/a.jpg")),
            asset(2, "camera", 2, Some("/sdcard/DCIM/b.jpg")),
            asset(3, "screenshots", 3, None),
        ]);
        let albums = acc.finish(0, 0);

        assert_eq!(albums[0].cover_uri.as_deref(), Some("/sdcard/DCIM/a.jpg"));
        // No data path: cover falls back to the synthesized locator
        assert_eq!(albums[1].cover_uri.as_deref(), Some("media://image/3"));
    }

    #[test]
    fn test_two_partition_scan_merges_buckets() {
        let mut acc = AlbumAccumulator::new();
        acc.scan(vec![asset(1, "camera", 5, None)]);
        acc.scan(vec![asset(2, "camera", 9, None)]); // video partition
        let albums = acc.finish(0, 0);

        assert_eq!(albums[0].media_count, 2);
        assert_eq!(albums[0].last_modified, Some(9));
    }

    #[test]
    fn test_synthetic_album_counts_track_side_state() {
        let albums = AlbumAccumulator::new().finish(7, 3);
        assert_eq!(albums.len(), 3);

        let by_id = |id: AlbumId| albums.iter().find(|a| a.id == id).unwrap().clone();
        assert_eq!(by_id(AlbumId::Favorites).media_count, 0);
        assert_eq!(by_id(AlbumId::Hidden).media_count, 3);
        assert_eq!(by_id(AlbumId::RecycleBin).media_count, 7);
    }

    #[test]
    fn test_album_id_boundary_strings() {
        assert_eq!(AlbumId::Favorites.as_str(), "-1");
        assert_eq!(AlbumId::Hidden.as_str(), "-2");
        assert_eq!(AlbumId::RecycleBin.as_str(), "-3");
        assert_eq!(AlbumId::parse("1764003022"), AlbumId::Bucket("1764003022".to_string()));
        assert_eq!(AlbumId::parse("-2"), AlbumId::Hidden);

        assert!(is_reserved_album_id("-1"));
        assert!(!is_reserved_album_id("42"));

        let json = serde_json::to_string(&AlbumId::RecycleBin).unwrap();
        assert_eq!(json, "\"-3\"");
        let back: AlbumId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AlbumId::RecycleBin);
    }
}
