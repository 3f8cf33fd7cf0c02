/// JSON-file side-state store
///
/// Each set is one document in a private data directory:
/// - `trashed_items.json`: object of id-string to trashed-at millis
/// - `hidden_items.json`: array of ids
///
/// No schema versioning; entries that do not parse are ignored on load.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use crate::error::{GalleryError, GalleryResult};

use super::{HiddenSet, SideStateStore, TrashRecord};

const TRASH_DOC: &str = "trashed_items.json";
const HIDDEN_DOC: &str = "hidden_items.json";

pub struct FileSideState {
    dir: PathBuf,
}

impl FileSideState {
    /// Store documents in the user's data directory:
    /// ~/.local/share/gallery-core on Linux.
    pub fn new() -> GalleryResult<Self> {
        let mut dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        dir.push("gallery-core");
        Self::in_dir(dir)
    }

    /// Store documents under an explicit directory (created if missing)
    pub fn in_dir(dir: PathBuf) -> GalleryResult<Self> {
        fs::create_dir_all(&dir)
            .map_err(|e| GalleryError::SideState(format!("create state dir: {e}")))?;
        Ok(FileSideState { dir })
    }

    fn read_doc(&self, name: &str) -> Option<Value> {
        let raw = fs::read_to_string(self.dir.join(name)).ok()?;
        serde_json::from_str(&raw).ok()
    }

    fn write_doc(&self, name: &str, value: &Value) -> GalleryResult<()> {
        let body = serde_json::to_string(value)
            .map_err(|e| GalleryError::SideState(format!("encode {name}: {e}")))?;
        // Write a sibling first, then swap it in, so an interrupted save
        // leaves the previous document intact instead of a truncated one.
        let path = self.dir.join(name);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body)
            .map_err(|e| GalleryError::SideState(format!("write {name}: {e}")))?;
        fs::rename(&tmp, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            GalleryError::SideState(format!("commit {name}: {e}"))
        })
    }
}

impl SideStateStore for FileSideState {
    fn load_trash(&self) -> TrashRecord {
        let mut record = TrashRecord::new();
        if let Some(Value::Object(map)) = self.read_doc(TRASH_DOC) {
            for (key, value) in map {
                // Keys that are not identifiers (or values that are not
                // timestamps) are leftovers from another writer; skip them.
                let (Ok(id), Some(at)) = (key.parse::<i64>(), value.as_i64()) else {
                    continue;
                };
                record.insert(id, at);
            }
        }
        record
    }

    fn save_trash(&self, record: &TrashRecord) -> GalleryResult<()> {
        let mut obj = serde_json::Map::new();
        for (id, at) in record {
            obj.insert(id.to_string(), Value::from(*at));
        }
        self.write_doc(TRASH_DOC, &Value::Object(obj))
    }

    fn load_hidden(&self) -> HiddenSet {
        let mut set = HiddenSet::new();
        if let Some(Value::Array(items)) = self.read_doc(HIDDEN_DOC) {
            for item in items {
                if let Some(id) = item.as_i64() {
                    set.insert(id);
                }
            }
        }
        set
    }

    fn save_hidden(&self, set: &HiddenSet) -> GalleryResult<()> {
        let mut sorted: Vec<i64> = set.iter().copied().collect();
        sorted.sort_unstable();
        self.write_doc(HIDDEN_DOC, &Value::from(sorted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, FileSideState) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSideState::in_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_first_run_is_empty() {
        let (_dir, store) = store();
        assert!(store.load_trash().is_empty());
        assert!(store.load_hidden().is_empty());
    }

    #[test]
    fn test_trash_round_trip() {
        let (_dir, store) = store();
        let mut record = TrashRecord::new();
        record.insert(7, 1_700_000_000_123);
        record.insert(42, 1_700_000_999_000);

        store.save_trash(&record).unwrap();
        assert_eq!(store.load_trash(), record);
    }

    #[test]
    fn test_hidden_round_trip() {
        let (_dir, store) = store();
        let set: HiddenSet = [3, 5, 11].into_iter().collect();

        store.save_hidden(&set).unwrap();
        assert_eq!(store.load_hidden(), set);
    }

    #[test]
    fn test_corrupt_document_degrades_to_empty() {
        let (dir, store) = store();
        std::fs::write(dir.path().join(TRASH_DOC), "{not json").unwrap();
        std::fs::write(dir.path().join(HIDDEN_DOC), "42").unwrap();

        assert!(store.load_trash().is_empty());
        assert!(store.load_hidden().is_empty());
    }

    #[test]
    fn test_unknown_entries_are_ignored() {
        let (dir, store) = store();
        std::fs::write(
            dir.path().join(TRASH_DOC),
            r#"{"12": 1700000000000, "schema": "v2", "note": true}"#,
        )
        .unwrap();

        let record = store.load_trash();
        assert_eq!(record.len(), 1);
        assert_eq!(record.get(&12), Some(&1_700_000_000_000));
    }

    #[test]
    fn test_save_commits_whole_documents_only() {
        let (dir, store) = store();
        // A leftover scratch file from an interrupted save must not
        // survive the next one or leak into loads
        std::fs::write(dir.path().join("trashed_items.json.tmp"), "{\"1\":").unwrap();

        let mut record = TrashRecord::new();
        record.insert(9, 1_700_000_000_900);
        store.save_trash(&record).unwrap();
        store.save_hidden(&[4].into_iter().collect()).unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().all(|n| !n.ends_with(".tmp")), "{names:?}");
        assert_eq!(store.load_trash(), record);
    }

    #[test]
    fn test_save_is_full_replace() {
        let (_dir, store) = store();
        let mut record = TrashRecord::new();
        record.insert(1, 10);
        record.insert(2, 20);
        store.save_trash(&record).unwrap();

        record.remove(&1);
        store.save_trash(&record).unwrap();

        let loaded = store.load_trash();
        assert_eq!(loaded.len(), 1);
        assert!(!loaded.contains_key(&1));
    }
}
