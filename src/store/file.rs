//! File-backed blob store.

use crate::store::BlobStore;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Blob store persisted as a single JSON object in a file.
///
/// Writes go to a `.tmp` sibling first and are committed with a rename, and
/// the in-memory map is only updated after the rename succeeds. A failed
/// `put_string` therefore leaves both disk and memory at the previous state.
pub struct FileBlobStore {
    path: PathBuf,
    map: BTreeMap<String, String>,
}

impl FileBlobStore {
    /// Opens the store, creating parent directories as needed. A missing
    /// file starts empty; an unreadable one is logged and starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    warn!("cannot create {}: {}", parent.display(), e);
                }
            }
        }

        // Cleanup a stale .tmp from an interrupted write.
        let _ = std::fs::remove_file(path.with_extension("tmp"));

        let map = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(e) => {
                    warn!("blob store {} unreadable, starting empty: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };

        Self { path, map }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, map: &BTreeMap<String, String>) -> io::Result<()> {
        let encoded = serde_json::to_string_pretty(map).map_err(io::Error::other)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, encoded)?;
        std::fs::rename(&tmp, &self.path)
    }
}

impl BlobStore for FileBlobStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn put_string(&mut self, key: &str, value: &str) -> bool {
        let mut next = self.map.clone();
        next.insert(key.to_string(), value.to_string());
        match self.flush(&next) {
            Ok(()) => {
                self.map = next;
                true
            }
            Err(e) => {
                warn!("blob store write to {} failed: {}", self.path.display(), e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileBlobStore::open(dir.path().join("store.json"));
        assert!(store.put_string("key", "value"));
        assert_eq!(store.get_string("key").as_deref(), Some("value"));
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        {
            let mut store = FileBlobStore::open(&path);
            assert!(store.put_string("key", "value"));
        }
        let store = FileBlobStore::open(&path);
        assert_eq!(store.get_string("key").as_deref(), Some("value"));
    }

    #[test]
    fn test_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlobStore::open(dir.path().join("store.json"));
        assert_eq!(store.get_string("missing"), None);
    }

    #[test]
    fn test_failed_put_does_not_mutate_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let mut store = FileBlobStore::open(&path);
        assert!(store.put_string("key", "old"));

        // Turn the store path into a directory so the rename must fail.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        assert!(!store.put_string("key", "new"));
        assert_eq!(store.get_string("key").as_deref(), Some("old"));
    }

    #[test]
    fn test_stale_tmp_removed_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, "half-written").unwrap();
        let _store = FileBlobStore::open(&path);
        assert!(!tmp.exists());
    }
}
