/// Side-state: the overlay data this core owns
///
/// Two small documents layered over the external catalog:
/// - the trash record (id to trashed-at millis), and
/// - the hidden set (ids only, no timestamps).
///
/// Reads never fail: absent or unparsable state degrades to empty. Writes
/// are full-document replaces; callers do read-modify-write and accept
/// last-writer-wins (the host issues mutations serially).

pub mod file;
pub mod memory;

use std::collections::{HashMap, HashSet};

use crate::error::GalleryResult;

pub use file::FileSideState;
pub use memory::MemorySideState;

/// Logically deleted assets: identifier to trashed-at (milliseconds since
/// epoch). At most one timestamp per identifier; re-trashing overwrites.
pub type TrashRecord = HashMap<i64, i64>;

/// Currently hidden asset identifiers. Membership is boolean.
pub type HiddenSet = HashSet<i64>;

/// Durable persistence for the two overlay sets.
///
/// Injected into the query facade so tests can run against the in-memory
/// implementation while production uses the JSON-file one.
pub trait SideStateStore: Send + Sync {
    /// Load the trash record; empty on first run or corruption.
    fn load_trash(&self) -> TrashRecord;

    /// Replace the trash record wholesale.
    fn save_trash(&self, record: &TrashRecord) -> GalleryResult<()>;

    /// Load the hidden set; empty on first run or corruption.
    fn load_hidden(&self) -> HiddenSet;

    /// Replace the hidden set wholesale.
    fn save_hidden(&self, set: &HiddenSet) -> GalleryResult<()>;
}
