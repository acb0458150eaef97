//! Filesystem abstraction for directory browsing.
//!
//! The `FileSystem` trait lets the browser work against the real `/proc/sys`
//! tree on Linux or against [`mock::MockFs`] in tests and CI. It only covers
//! listing and existence checks: tunable *contents* are never read through
//! ordinary file APIs, they go through the privileged command runner.

pub mod mock;

use std::io;
use std::path::{Path, PathBuf};

/// Abstraction for the filesystem operations the browser needs.
pub trait FileSystem: Send + Sync {
    /// Checks if a path still exists.
    fn exists(&self, path: &Path) -> bool;

    /// Checks if a path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Lists immediate children of a directory.
    ///
    /// # Returns
    /// Paths of the entries in the order the filesystem reports them, or an
    /// I/O error if the directory cannot be listed.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path)?;
        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_real_fs_exists_and_is_dir() {
        let fs = RealFs::new();
        let src_dir = env::current_dir().unwrap().join("src");
        assert!(fs.exists(&src_dir));
        assert!(fs.is_dir(&src_dir));
        assert!(!fs.exists(Path::new("/nonexistent/path/12345")));
    }

    #[test]
    fn test_real_fs_read_dir() {
        let fs = RealFs::new();
        let src_dir = env::current_dir().unwrap().join("src");
        let entries = fs.read_dir(&src_dir).unwrap();
        assert!(!entries.is_empty());
    }

    #[test]
    fn test_real_fs_read_dir_missing_path() {
        let fs = RealFs::new();
        assert!(fs.read_dir(Path::new("/nonexistent/path/12345")).is_err());
    }
}
