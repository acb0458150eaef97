//! In-memory mock filesystem for testing the browser without a real `/proc/sys`.

use crate::fs::FileSystem;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
struct MockEntry {
    path: PathBuf,
    is_dir: bool,
    /// A phantom entry shows up in its parent's listing but no longer
    /// exists, simulating a node that vanished between listing and use.
    phantom: bool,
}

/// In-memory filesystem for tests.
///
/// Entries keep their insertion order, so listings are deterministic and
/// tests can assert on ordering guarantees.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    entries: Vec<MockEntry>,
}

impl MockFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file. Parent directories are created automatically.
    pub fn add_file(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.insert(path, false, false);
    }

    /// Adds a directory. Parent directories are created automatically.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.insert(path, true, false);
    }

    /// Adds a file that appears in its parent's listing but fails the
    /// existence check, as if it was removed right after the listing.
    pub fn add_vanishing_file(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.insert(path, false, true);
    }

    /// Removes an entry and any descendants.
    pub fn remove(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.entries
            .retain(|e| e.path != path && !e.path.starts_with(path));
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parents = Vec::new();
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                parents.push(p.to_path_buf());
            }
            parent = p.parent();
        }
        // Insert from the root down so listing order stays sensible.
        for p in parents.into_iter().rev() {
            self.insert(p, true, false);
        }
    }

    fn insert(&mut self, path: PathBuf, is_dir: bool, phantom: bool) {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.path == path) {
            existing.is_dir = is_dir;
            existing.phantom = phantom;
            return;
        }
        self.entries.push(MockEntry {
            path,
            is_dir,
            phantom,
        });
    }
}

impl FileSystem for MockFs {
    fn exists(&self, path: &Path) -> bool {
        self.entries
            .iter()
            .any(|e| e.path == path && !e.phantom)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.entries
            .iter()
            .any(|e| e.path == path && e.is_dir && !e.phantom)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.entries.iter().any(|e| e.path == path && e.is_dir) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory: {}", path.display()),
            ));
        }
        Ok(self
            .entries
            .iter()
            .filter(|e| e.path.parent() == Some(path))
            .map(|e| e.path.clone())
            .collect())
    }
}
