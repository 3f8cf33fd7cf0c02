/// In-memory side-state store, for tests and hosts that persist elsewhere

use std::sync::Mutex;

use crate::error::GalleryResult;

use super::{HiddenSet, SideStateStore, TrashRecord};

#[derive(Default)]
pub struct MemorySideState {
    trash: Mutex<TrashRecord>,
    hidden: Mutex<HiddenSet>,
}

impl MemorySideState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SideStateStore for MemorySideState {
    fn load_trash(&self) -> TrashRecord {
        self.trash.lock().map(|t| t.clone()).unwrap_or_default()
    }

    fn save_trash(&self, record: &TrashRecord) -> GalleryResult<()> {
        if let Ok(mut guard) = self.trash.lock() {
            *guard = record.clone();
        }
        Ok(())
    }

    fn load_hidden(&self) -> HiddenSet {
        self.hidden.lock().map(|h| h.clone()).unwrap_or_default()
    }

    fn save_hidden(&self, set: &HiddenSet) -> GalleryResult<()> {
        if let Ok(mut guard) = self.hidden.lock() {
            *guard = set.clone();
        }
        Ok(())
    }
}
