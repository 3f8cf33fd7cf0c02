/// Overlay filter: merges trash/hidden side-state into catalog listings
///
/// The catalog hands back an ordered sequence (add-time descending); this
/// module decides per-entry inclusion for the requested view, AND-s in the
/// bucket/kind/search conditions, and only then paginates. Paginating after
/// filtering is the whole point, since counting raw rows first would undercount
/// every page that has excluded entries in its window.

use crate::albums;
use crate::catalog::{Asset, MediaKind};
use crate::state::{HiddenSet, TrashRecord};

/// Default page size when the caller does not specify one
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Which overlay lens a listing applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Everything not trashed and not hidden
    #[default]
    Normal,
    /// The recycle bin: only trashed assets
    TrashedOnly,
    /// Only hidden assets
    HiddenOnly,
}

/// Parameters of one listing query
#[derive(Debug, Clone)]
pub struct ListRequest {
    /// Restrict to one album; reserved sentinel ids are never forwarded
    /// to the catalog as a bucket filter
    pub album_id: Option<String>,
    pub kind: Option<MediaKind>,
    pub limit: usize,
    pub offset: usize,
    pub view: ViewMode,
    /// Case-insensitive substring match on the display name
    pub search: Option<String>,
}

impl Default for ListRequest {
    fn default() -> Self {
        ListRequest {
            album_id: None,
            kind: None,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
            view: ViewMode::Normal,
            search: None,
        }
    }
}

/// Whether the view can be answered without touching the catalog at all.
/// An empty trash (or hidden) set means its exclusive view is empty; going
/// to the catalog would turn "include nothing" into an unbounded scan.
pub fn short_circuits(view: ViewMode, trash: &TrashRecord, hidden: &HiddenSet) -> bool {
    match view {
        ViewMode::Normal => false,
        ViewMode::TrashedOnly => trash.is_empty(),
        ViewMode::HiddenOnly => hidden.is_empty(),
    }
}

/// Membership predicate for a view mode
pub fn includes(view: ViewMode, id: i64, trash: &TrashRecord, hidden: &HiddenSet) -> bool {
    match view {
        ViewMode::Normal => !trash.contains_key(&id) && !hidden.contains(&id),
        ViewMode::TrashedOnly => trash.contains_key(&id),
        ViewMode::HiddenOnly => hidden.contains(&id),
    }
}

fn matches_filters(asset: &Asset, req: &ListRequest) -> bool {
    if let Some(album_id) = &req.album_id {
        // Sentinels denote synthetic views, not catalog buckets
        if !albums::is_reserved_album_id(album_id) && asset.bucket_id != *album_id {
            return false;
        }
    }
    if let Some(kind) = req.kind {
        if asset.kind != kind {
            return false;
        }
    }
    if let Some(needle) = &req.search {
        if !needle.is_empty()
            && !asset.name.to_lowercase().contains(&needle.to_lowercase())
        {
            return false;
        }
    }
    true
}

/// Walk the ordered catalog sequence, apply membership and filters, skip
/// `offset` matches, collect up to `limit`. Stops consuming the sequence
/// once the page is full.
pub fn page(
    entries: impl IntoIterator<Item = Asset>,
    req: &ListRequest,
    trash: &TrashRecord,
    hidden: &HiddenSet,
) -> Vec<Asset> {
    if req.limit == 0 {
        return Vec::new();
    }

    let mut page = Vec::with_capacity(req.limit.min(DEFAULT_PAGE_SIZE));
    let mut matched = 0usize;
    for asset in entries {
        if !includes(req.view, asset.id, trash, hidden) || !matches_filters(&asset, req) {
            continue;
        }
        if matched >= req.offset {
            page.push(asset);
            if page.len() == req.limit {
                break;
            }
        }
        matched += 1;
    }
    page
}
