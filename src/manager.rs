/// Query facade
///
/// `GalleryManager` composes the catalog, the side-state store and the
/// thumbnail cache behind the public operations. Catalog queries and
/// decode/encode work are blocking I/O, so every public operation is async
/// and dispatches its body to a blocking worker; once dispatched it runs to
/// completion; no cancellation, no internal timeouts.

use std::collections::HashSet;
use std::sync::Arc;

use crate::albums::{self, Album, AlbumAccumulator};
use crate::catalog::{Asset, AssetCatalog, AssetQuery, MediaKind, SqliteCatalog};
use crate::error::{GalleryError, GalleryResult};
use crate::overlay::{self, ListRequest, ViewMode};
use crate::state::{FileSideState, SideStateStore, TrashRecord};
use crate::thumbs::{ImageRsDecoder, ThumbnailCache, ThumbnailDecoder};

pub struct GalleryManager<C, S, D> {
    inner: Arc<Inner<C, S, D>>,
}

impl<C, S, D> Clone for GalleryManager<C, S, D> {
    fn clone(&self) -> Self {
        GalleryManager {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<C, S, D> {
    catalog: C,
    state: S,
    thumbs: ThumbnailCache<D>,
}

impl GalleryManager<SqliteCatalog, FileSideState, ImageRsDecoder> {
    /// Production wiring: SQLite catalog and JSON side-state in the data
    /// directory, thumbnails in the cache directory.
    pub fn with_defaults() -> GalleryResult<Self> {
        let catalog = SqliteCatalog::new()?;
        let asset_count = catalog.asset_count().unwrap_or(0);
        println!("🎞️  Gallery engine ready with {} indexed assets", asset_count);

        Ok(GalleryManager::new(
            catalog,
            FileSideState::new()?,
            ThumbnailCache::new(ImageRsDecoder::new())?,
        ))
    }
}

impl<C, S, D> GalleryManager<C, S, D>
where
    C: AssetCatalog + 'static,
    S: SideStateStore + 'static,
    D: ThumbnailDecoder + 'static,
{
    pub fn new(catalog: C, state: S, thumbs: ThumbnailCache<D>) -> Self {
        GalleryManager {
            inner: Arc::new(Inner {
                catalog,
                state,
                thumbs,
            }),
        }
    }

    /// Run one unit of blocking work off the caller's thread
    async fn run<T, F>(&self, work: F) -> GalleryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Inner<C, S, D>) -> GalleryResult<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || work(&inner))
            .await
            .map_err(|e| GalleryError::Worker(e.to_string()))?
    }

    /// One page of assets for the requested view, thumbnails resolved
    pub async fn list_assets(&self, request: ListRequest) -> GalleryResult<Vec<Asset>> {
        self.run(move |inner| inner.list_assets(&request)).await
    }

    /// All albums: one per catalog bucket plus the synthetic three
    pub async fn list_albums(&self) -> GalleryResult<Vec<Album>> {
        self.run(|inner| inner.list_albums()).await
    }

    /// Move an asset to the recycle bin. Idempotent; re-trashing
    /// refreshes the trashed-at timestamp.
    pub async fn trash(&self, id: i64) -> GalleryResult<bool> {
        self.run(move |inner| inner.trash(id)).await
    }

    /// Take an asset out of the recycle bin; no-op when not trashed.
    pub async fn restore(&self, id: i64) -> GalleryResult<bool> {
        self.run(move |inner| inner.restore(id)).await
    }

    /// Permanently delete a trashed asset. The trash entry is only
    /// cleared when the catalog confirms the delete; `Ok(false)` means the
    /// catalog reported nothing deleted and side-state was left untouched.
    pub async fn purge(&self, id: i64) -> GalleryResult<bool> {
        self.run(move |inner| inner.purge(id)).await
    }

    /// Attempt to purge everything in the recycle bin. Returns
    /// `Ok(true)` only if every catalog delete took effect, but the trash
    /// record is cleared in full either way, so an asset whose delete was
    /// refused silently loses its trash marker. Long-standing behavior,
    /// kept for compatibility.
    pub async fn empty_trash(&self) -> GalleryResult<bool> {
        self.run(|inner| inner.empty_trash()).await
    }

    /// Hide an asset from the normal view. Independent of trash state.
    pub async fn hide(&self, id: i64) -> GalleryResult<bool> {
        self.run(move |inner| inner.hide(id)).await
    }

    /// Undo `hide`; no-op when the asset is not hidden.
    pub async fn unhide(&self, id: i64) -> GalleryResult<bool> {
        self.run(move |inner| inner.unhide(id)).await
    }
}

impl<C, S, D> Inner<C, S, D>
where
    C: AssetCatalog,
    S: SideStateStore,
    D: ThumbnailDecoder,
{
    fn list_assets(&self, request: &ListRequest) -> GalleryResult<Vec<Asset>> {
        let trash = self.state.load_trash();
        let hidden = self.state.load_hidden();

        if overlay::short_circuits(request.view, &trash, &hidden) {
            return Ok(Vec::new());
        }

        // Push the filters down into the catalog query; the overlay layer
        // re-applies the same algebra, so pagination stays correct even for
        // catalogs that ignore the id sets.
        let mut query = AssetQuery {
            bucket_id: request
                .album_id
                .clone()
                .filter(|id| !albums::is_reserved_album_id(id)),
            kind: request.kind,
            name_contains: request.search.clone().filter(|s| !s.is_empty()),
            ..Default::default()
        };
        match request.view {
            ViewMode::Normal => {
                let mut excluded: HashSet<i64> = trash.keys().copied().collect();
                excluded.extend(hidden.iter().copied());
                if !excluded.is_empty() {
                    query.exclude_ids = Some(excluded);
                }
            }
            ViewMode::TrashedOnly => {
                query.include_ids = Some(trash.keys().copied().collect());
            }
            ViewMode::HiddenOnly => {
                query.include_ids = Some(hidden.iter().copied().collect());
            }
        }

        let entries = self.catalog.query(&query)?;
        let mut page = overlay::page(entries, request, &trash, &hidden);

        for asset in &mut page {
            asset.uri = asset.display_uri();
            asset.thumbnail_path = self
                .thumbs
                .get_or_create(&asset.uri, asset.kind)
                .map(|p| p.to_string_lossy().to_string());
            if request.view == ViewMode::TrashedOnly {
                let deleted_at = trash.get(&asset.id).copied().unwrap_or(0);
                asset.metadata = Some(serde_json::json!({ "deletedAt": deleted_at }));
            }
        }
        Ok(page)
    }

    fn list_albums(&self) -> GalleryResult<Vec<Album>> {
        let trash = self.state.load_trash();
        let hidden = self.state.load_hidden();

        let mut excluded: HashSet<i64> = trash.keys().copied().collect();
        excluded.extend(hidden.iter().copied());
        let exclude_ids = (!excluded.is_empty()).then_some(excluded);

        let mut acc = AlbumAccumulator::new();
        for kind in [MediaKind::Image, MediaKind::Video] {
            let query = AssetQuery {
                kind: Some(kind),
                exclude_ids: exclude_ids.clone(),
                ..Default::default()
            };
            // Either partition failing fails the whole aggregation
            acc.scan(self.catalog.query(&query)?);
        }
        Ok(acc.finish(trash.len(), hidden.len()))
    }

    fn trash(&self, id: i64) -> GalleryResult<bool> {
        require_id(id)?;
        let mut trash = self.state.load_trash();
        trash.insert(id, chrono::Utc::now().timestamp_millis());
        self.state.save_trash(&trash)?;
        Ok(true)
    }

    fn restore(&self, id: i64) -> GalleryResult<bool> {
        require_id(id)?;
        let mut trash = self.state.load_trash();
        trash.remove(&id);
        self.state.save_trash(&trash)?;
        Ok(true)
    }

    fn purge(&self, id: i64) -> GalleryResult<bool> {
        require_id(id)?;
        let deleted = self.catalog.delete(id)? > 0;
        if deleted {
            let mut trash = self.state.load_trash();
            trash.remove(&id);
            self.state.save_trash(&trash)?;
        }
        Ok(deleted)
    }

    fn empty_trash(&self) -> GalleryResult<bool> {
        let trash = self.state.load_trash();
        let mut all_deleted = true;
        for id in trash.keys() {
            if self.catalog.delete(*id)? == 0 {
                all_deleted = false;
            }
        }
        // Cleared regardless of per-item outcomes (see `empty_trash` docs)
        self.state.save_trash(&TrashRecord::new())?;
        Ok(all_deleted)
    }

    fn hide(&self, id: i64) -> GalleryResult<bool> {
        require_id(id)?;
        let mut hidden = self.state.load_hidden();
        hidden.insert(id);
        self.state.save_hidden(&hidden)?;
        Ok(true)
    }

    fn unhide(&self, id: i64) -> GalleryResult<bool> {
        require_id(id)?;
        let mut hidden = self.state.load_hidden();
        hidden.remove(&id);
        self.state.save_hidden(&hidden)?;
        Ok(true)
    }
}

/// Catalog identifiers are strictly positive; zero marks a missing id at
/// the host bridge. Rejected before any I/O.
fn require_id(id: i64) -> GalleryResult<()> {
    if id <= 0 {
        return Err(GalleryError::InvalidArgument(format!(
            "asset id must be positive, got {id}"
        )));
    }
    Ok(())
}
