/// SQLite-backed asset catalog
///
/// The production binding of the `AssetCatalog` port. One `assets` table
/// holds the media index; queries are assembled as AND-joined conditions
/// mirroring the query shape the overlay layer needs.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, ErrorCode};
use walkdir::WalkDir;

use crate::error::{GalleryError, GalleryResult};

use super::{Asset, AssetCatalog, AssetQuery, MediaKind};

/// Input row for catalog inserts (identifier is assigned by the catalog)
#[derive(Debug, Clone)]
pub struct CatalogRecord {
    pub name: String,
    /// Full MIME type, e.g. "image/jpeg"
    pub mime: String,
    pub size: u64,
    pub date_added: i64,
    pub date_modified: i64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration_secs: Option<u32>,
    pub bucket_id: String,
    pub bucket_name: String,
    pub data_path: Option<String>,
}

pub struct SqliteCatalog {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl SqliteCatalog {
    /// Open (or create) the catalog database in the user's data directory:
    /// - Linux: ~/.local/share/gallery-core/catalog.db
    /// - macOS: ~/Library/Application Support/gallery-core/catalog.db
    /// - Windows: %APPDATA%\gallery-core\catalog.db
    pub fn new() -> GalleryResult<Self> {
        Self::open(Self::default_db_path())
    }

    /// Open (or create) the catalog database at an explicit path
    pub fn open(db_path: PathBuf) -> GalleryResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| GalleryError::CatalogAccess(format!("create data dir: {e}")))?;
        }

        let conn = Connection::open(&db_path)?;
        println!("📁 Catalog database at: {}", db_path.display());

        let catalog = SqliteCatalog {
            conn: Mutex::new(conn),
            db_path: Some(db_path),
        };
        catalog.init_schema()?;
        Ok(catalog)
    }

    /// Private in-memory catalog, used by tests
    pub fn open_in_memory() -> GalleryResult<Self> {
        let conn = Connection::open_in_memory()?;
        let catalog = SqliteCatalog {
            conn: Mutex::new(conn),
            db_path: None,
        };
        catalog.init_schema()?;
        Ok(catalog)
    }

    fn default_db_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        path.push("gallery-core");
        path.push("catalog.db");
        path
    }

    fn conn(&self) -> GalleryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| GalleryError::CatalogAccess("catalog connection poisoned".into()))
    }

    fn init_schema(&self) -> GalleryResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS assets (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                name            TEXT NOT NULL,
                mime            TEXT NOT NULL,
                size            INTEGER NOT NULL,
                date_added      INTEGER NOT NULL,
                date_modified   INTEGER NOT NULL,
                width           INTEGER,
                height          INTEGER,
                duration        INTEGER,
                bucket_id       TEXT NOT NULL,
                bucket_name     TEXT NOT NULL,
                data_path       TEXT UNIQUE
            )",
            [],
        )?;

        // The overlay layer relies on add-time ordering for pagination
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_assets_date_added
             ON assets(date_added DESC)",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_assets_bucket_id
             ON assets(bucket_id)",
            [],
        )?;

        Ok(())
    }

    /// Path of the backing database file, when not in-memory
    pub fn path(&self) -> Option<&PathBuf> {
        self.db_path.as_ref()
    }

    /// Total number of indexed assets
    pub fn asset_count(&self) -> GalleryResult<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM assets", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Insert one record; returns the assigned identifier
    pub fn insert(&self, rec: &CatalogRecord) -> GalleryResult<i64> {
        let conn = self.conn()?;
        Ok(Self::insert_with(&conn, rec)?)
    }

    fn insert_with(conn: &Connection, rec: &CatalogRecord) -> rusqlite::Result<i64> {
        conn.execute(
            "INSERT INTO assets
             (name, mime, size, date_added, date_modified, width, height,
              duration, bucket_id, bucket_name, data_path)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                rec.name,
                rec.mime,
                rec.size as i64,
                rec.date_added,
                rec.date_modified,
                rec.width,
                rec.height,
                rec.duration_secs,
                rec.bucket_id,
                rec.bucket_name,
                rec.data_path,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Walk a folder tree and index every media file found, keyed by its
    /// absolute path. Already-indexed paths are skipped, not updated.
    /// Returns (imported, skipped) counts.
    pub fn import_directory(&self, root: &Path) -> GalleryResult<(usize, usize)> {
        let mut imported = 0;
        let mut skipped = 0;

        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let Some(mime) = mime_for_path(path) else {
                continue;
            };

            let meta = match entry.metadata() {
                Ok(m) => m,
                Err(_) => continue,
            };
            let modified = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0);

            let bucket_path = path.parent().unwrap_or(root);
            let rec = CatalogRecord {
                name: entry.file_name().to_string_lossy().to_string(),
                mime: mime.to_string(),
                size: meta.len(),
                date_added: chrono::Utc::now().timestamp(),
                date_modified: modified,
                width: None,
                height: None,
                duration_secs: None,
                bucket_id: bucket_path.to_string_lossy().to_string(),
                bucket_name: bucket_path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| "Unknown".to_string()),
                data_path: Some(path.to_string_lossy().to_string()),
            };

            let conn = self.conn()?;
            match Self::insert_with(&conn, &rec) {
                Ok(_) => imported += 1,
                // UNIQUE(data_path) violation means the file is already indexed
                Err(e) if is_constraint_violation(&e) => skipped += 1,
                Err(e) => return Err(e.into()),
            }
        }

        if imported > 0 {
            println!("📥 Imported {} assets ({} already indexed)", imported, skipped);
        }
        Ok((imported, skipped))
    }
}

impl AssetCatalog for SqliteCatalog {
    fn query(&self, query: &AssetQuery) -> GalleryResult<Vec<Asset>> {
        let mut sql = String::from(
            "SELECT id, name, mime, size, date_added, date_modified,
                    width, height, duration, bucket_id, bucket_name, data_path
             FROM assets WHERE 1=1",
        );
        let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(bucket) = &query.bucket_id {
            sql.push_str(" AND bucket_id = ?");
            args.push(Box::new(bucket.clone()));
        }
        if let Some(kind) = query.kind {
            sql.push_str(" AND mime LIKE ?");
            args.push(Box::new(format!("{}%", kind.mime_prefix())));
        }
        if let Some(needle) = &query.name_contains {
            sql.push_str(" AND name LIKE ? ESCAPE '\\'");
            args.push(Box::new(format!("%{}%", escape_like(needle))));
        }
        // Identifier sets are numeric and bounded, inline them
        if let Some(ids) = &query.include_ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            sql.push_str(&format!(" AND id IN ({})", join_ids(ids)));
        }
        if let Some(ids) = &query.exclude_ids {
            if !ids.is_empty() {
                sql.push_str(&format!(" AND id NOT IN ({})", join_ids(ids)));
            }
        }
        sql.push_str(" ORDER BY date_added DESC, id DESC");

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(args.iter().map(|a| a.as_ref())),
            |row| {
                let id: i64 = row.get(0)?;
                let mime: String = row.get(2)?;
                let data_path: Option<String> = row.get(11)?;
                let kind = if mime.starts_with("video/") {
                    MediaKind::Video
                } else {
                    MediaKind::Image
                };
                let size: i64 = row.get(3)?;
                let mut asset = Asset {
                    id,
                    uri: String::new(),
                    name: row.get(1)?,
                    kind,
                    size: size.max(0) as u64,
                    date_added: row.get(4)?,
                    date_modified: row.get(5)?,
                    width: row.get(6)?,
                    height: row.get(7)?,
                    duration_secs: row.get(8)?,
                    bucket_id: row.get(9)?,
                    bucket_name: row.get(10)?,
                    data_path,
                    thumbnail_path: None,
                    metadata: None,
                };
                asset.uri = asset.display_uri();
                Ok(asset)
            },
        )?;

        let mut assets = Vec::new();
        for asset in rows {
            assets.push(asset?);
        }
        Ok(assets)
    }

    fn delete(&self, id: i64) -> GalleryResult<usize> {
        let conn = self.conn()?;
        let affected = conn.execute("DELETE FROM assets WHERE id = ?1", params![id])?;
        Ok(affected)
    }
}

fn join_ids(ids: &std::collections::HashSet<i64>) -> String {
    let mut sorted: Vec<i64> = ids.iter().copied().collect();
    sorted.sort_unstable();
    sorted
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn escape_like(needle: &str) -> String {
    needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Map a file extension to its MIME type; None means "not a media file"
fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        "mp4" => "video/mp4",
        "m4v" => "video/x-m4v",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        _ => return None,
    };
    Some(mime)
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, mime: &str, added: i64, bucket: &str) -> CatalogRecord {
        CatalogRecord {
            name: name.to_string(),
            mime: mime.to_string(),
            size: 1024,
            date_added: added,
            date_modified: added,
            width: Some(640),
            height: Some(480),
            duration_secs: if mime.starts_with("video/") { Some(12) } else { None },
            bucket_id: bucket.to_string(),
            bucket_name: bucket.to_string(),
            data_path: None,
        }
    }

    #[test]
    fn test_query_orders_by_date_added_desc() {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        catalog.insert(&record("old.jpg", "image/jpeg", 100, "camera")).unwrap();
        catalog.insert(&record("new.jpg", "image/jpeg", 300, "camera")).unwrap();
        catalog.insert(&record("mid.jpg", "image/jpeg", 200, "camera")).unwrap();

        let assets = catalog.query(&AssetQuery::default()).unwrap();
        let names: Vec<&str> = assets.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["new.jpg", "mid.jpg", "old.jpg"]);
    }

    #[test]
    fn test_kind_and_bucket_filters() {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        catalog.insert(&record("a.jpg", "image/jpeg", 3, "camera")).unwrap();
        catalog.insert(&record("b.mp4", "video/mp4", 2, "camera")).unwrap();
        catalog.insert(&record("c.jpg", "image/jpeg", 1, "screenshots")).unwrap();

        let videos = catalog
            .query(&AssetQuery {
                kind: Some(MediaKind::Video),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].name, "b.mp4");
        assert_eq!(videos[0].duration_secs, Some(12));

        let camera = catalog
            .query(&AssetQuery {
                bucket_id: Some("camera".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(camera.len(), 2);
    }

    #[test]
    fn test_name_search_is_case_insensitive() {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        catalog.insert(&record("Beach_Trip.jpg", "image/jpeg", 1, "camera")).unwrap();
        catalog.insert(&record("office.jpg", "image/jpeg", 2, "camera")).unwrap();

        // SQLite LIKE is case-insensitive for ASCII
        let hits = catalog
            .query(&AssetQuery {
                name_contains: Some("beach".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Beach_Trip.jpg");
    }

    #[test]
    fn test_include_and_exclude_id_sets() {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        let a = catalog.insert(&record("a.jpg", "image/jpeg", 3, "camera")).unwrap();
        let b = catalog.insert(&record("b.jpg", "image/jpeg", 2, "camera")).unwrap();
        let c = catalog.insert(&record("c.jpg", "image/jpeg", 1, "camera")).unwrap();

        let include: std::collections::HashSet<i64> = [a, c].into_iter().collect();
        let included = catalog
            .query(&AssetQuery {
                include_ids: Some(include),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(included.len(), 2);

        let exclude: std::collections::HashSet<i64> = [b].into_iter().collect();
        let excluded = catalog
            .query(&AssetQuery {
                exclude_ids: Some(exclude),
                ..Default::default()
            })
            .unwrap();
        assert!(excluded.iter().all(|asset| asset.id != b));

        // Empty inclusion set matches nothing
        let none = catalog
            .query(&AssetQuery {
                include_ids: Some(Default::default()),
                ..Default::default()
            })
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_delete_reports_affected_rows() {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        let id = catalog.insert(&record("a.jpg", "image/jpeg", 1, "camera")).unwrap();

        assert_eq!(catalog.delete(id).unwrap(), 1);
        assert_eq!(catalog.delete(id).unwrap(), 0);
        assert_eq!(catalog.asset_count().unwrap(), 0);
    }

    #[test]
    fn test_synthesized_uri_when_no_data_path() {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        let id = catalog.insert(&record("v.mp4", "video/mp4", 1, "camera")).unwrap();

        let assets = catalog.query(&AssetQuery::default()).unwrap();
        assert_eq!(assets[0].uri, format!("media://video/{id}"));
    }
}
