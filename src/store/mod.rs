//! Persisted parameter list and the blob store it lives in.
//!
//! The list is kept as one JSON blob under a fixed key in an opaque
//! key-value store. A full-list `put_string` is the single commit point,
//! which is what makes `replace_all` atomic: either the new list lands in
//! one write or the store keeps its previous contents.

mod file;
mod memory;

pub use file::FileBlobStore;
pub use memory::MemoryBlobStore;

use crate::param::KernelParam;
use tracing::warn;

/// Keys used in the blob store.
pub mod keys {
    /// Serialized parameter list.
    pub const PARAM_LIST: &str = "kernel_param_list";
    /// Prefix privileged commands with `busybox`.
    pub const USE_BUSYBOX: &str = "use_busybox";
    /// Order directories before files in listings.
    pub const FOLDERS_FIRST: &str = "list_folders_first";
}

/// Opaque key-value blob store boundary.
///
/// `put_string` reports success with a flag rather than an error; a `false`
/// return must leave the previously stored value readable.
pub trait BlobStore: Send {
    fn get_string(&self, key: &str) -> Option<String>;
    fn put_string(&mut self, key: &str, value: &str) -> bool;

    /// Reads a boolean flag stored as `"true"` / `"false"`.
    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get_string(key).as_deref() {
            Some("true") => true,
            Some("false") => false,
            _ => default,
        }
    }

    fn put_bool(&mut self, key: &str, value: bool) -> bool {
        self.put_string(key, if value { "true" } else { "false" })
    }
}

/// Errors from parameter list persistence.
#[derive(Debug)]
pub enum StoreError {
    /// The list could not be encoded for storage.
    Encode(String),
    /// The blob store refused the write.
    Persist,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Encode(msg) => write!(f, "encode error: {}", msg),
            StoreError::Persist => write!(f, "blob store rejected the write"),
        }
    }
}

impl std::error::Error for StoreError {}

/// The persisted, ordered, path-unique parameter list.
pub struct ParamStore<S: BlobStore> {
    blob: S,
}

impl<S: BlobStore> ParamStore<S> {
    pub fn new(blob: S) -> Self {
        Self { blob }
    }

    /// Access to the underlying blob store, e.g. for preference flags.
    pub fn blob(&self) -> &S {
        &self.blob
    }

    pub fn blob_mut(&mut self) -> &mut S {
        &mut self.blob
    }

    /// Returns the stored list, empty at first use. An unreadable stored
    /// blob is treated as empty rather than an error.
    pub fn list(&self) -> Vec<KernelParam> {
        let Some(raw) = self.blob.get_string(keys::PARAM_LIST) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(list) => list,
            Err(e) => {
                warn!("stored parameter list unreadable, treating as empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Adds parameters. An existing path keeps its position and takes the
    /// new value and tag; new paths append in the given order.
    pub fn add(&mut self, params: &[KernelParam]) -> Result<(), StoreError> {
        let mut list = self.list();
        merge_into(&mut list, params);
        self.write(&list)
    }

    /// Removes a single parameter by path. Returns whether it was present.
    pub fn remove(&mut self, path: &str) -> Result<bool, StoreError> {
        let mut list = self.list();
        let before = list.len();
        list.retain(|p| p.path != path);
        if list.len() == before {
            return Ok(false);
        }
        self.write(&list)?;
        Ok(true)
    }

    /// Replaces the whole list in one write. On failure the previous
    /// contents remain stored.
    pub fn replace_all(&mut self, params: &[KernelParam]) -> Result<(), StoreError> {
        let mut deduped = Vec::with_capacity(params.len());
        merge_into(&mut deduped, params);
        self.write(&deduped)
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.write(&[])
    }

    fn write(&mut self, list: &[KernelParam]) -> Result<(), StoreError> {
        let encoded =
            serde_json::to_string(list).map_err(|e| StoreError::Encode(e.to_string()))?;
        if self.blob.put_string(keys::PARAM_LIST, &encoded) {
            Ok(())
        } else {
            Err(StoreError::Persist)
        }
    }
}

/// Merges `incoming` into `list`: unique by path, last write wins, first
/// occurrence keeps its position.
fn merge_into(list: &mut Vec<KernelParam>, incoming: &[KernelParam]) {
    for param in incoming {
        match list.iter_mut().find(|p| p.path == param.path) {
            Some(slot) => *slot = param.clone(),
            None => list.push(param.clone()),
        }
    }
}
