/// gallery-core: a local media index overlay
///
/// This crate layers application-level state over an external, authoritative
/// media catalog: soft-delete (recycle bin), hidden assets, album
/// aggregation and an on-disk thumbnail cache. It is never the source of
/// truth for the files themselves; it only decides which identifiers each
/// view includes and annotates them.
///
/// The pieces:
/// - `catalog`: the read-only asset catalog boundary plus the SQLite binding
/// - `state`: the trash/hidden side-state documents this core owns
/// - `overlay`: per-entry inclusion rules and post-filter pagination
/// - `albums`: bucket aggregation plus the synthetic albums
/// - `thumbs`: the content-addressed thumbnail cache and decoder boundary
/// - `manager`: the async query facade composing all of the above

pub mod albums;
pub mod catalog;
pub mod error;
pub mod manager;
pub mod overlay;
pub mod state;
pub mod thumbs;

pub use albums::{Album, AlbumId, AlbumKind};
pub use catalog::{Asset, AssetCatalog, AssetQuery, MediaKind, SqliteCatalog};
pub use error::{GalleryError, GalleryResult};
pub use manager::GalleryManager;
pub use overlay::{ListRequest, ViewMode, DEFAULT_PAGE_SIZE};
pub use state::{FileSideState, HiddenSet, MemorySideState, SideStateStore, TrashRecord};
pub use thumbs::{ImageRsDecoder, ThumbnailCache, ThumbnailDecoder};
