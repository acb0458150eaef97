//! In-memory blob store for tests.

use crate::store::BlobStore;
use std::collections::HashMap;

/// Blob store backed by a plain map, with a switch to make the next writes
/// fail without mutating anything (for persistence-failure tests).
#[derive(Debug, Default, Clone)]
pub struct MemoryBlobStore {
    map: HashMap<String, String>,
    failing_puts: usize,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `n` calls to `put_string` fail.
    pub fn fail_next_puts(&mut self, n: usize) {
        self.failing_puts = n;
    }
}

impl BlobStore for MemoryBlobStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn put_string(&mut self, key: &str, value: &str) -> bool {
        if self.failing_puts > 0 {
            self.failing_puts -= 1;
            return false;
        }
        self.map.insert(key.to_string(), value.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get() {
        let mut store = MemoryBlobStore::new();
        assert!(store.put_string("key", "value"));
        assert_eq!(store.get_string("key").as_deref(), Some("value"));
    }

    #[test]
    fn test_failing_puts_leave_map_untouched() {
        let mut store = MemoryBlobStore::new();
        store.put_string("key", "old");
        store.fail_next_puts(1);
        assert!(!store.put_string("key", "new"));
        assert_eq!(store.get_string("key").as_deref(), Some("old"));
        assert!(store.put_string("key", "new"));
        assert_eq!(store.get_string("key").as_deref(), Some("new"));
    }
}
