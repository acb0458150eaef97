//! Directory browsing sessions over the sysctl tree.

use crate::fs::FileSystem;
use crate::param::PROC_SYS_ROOT;
use std::path::{Path, PathBuf};

/// A filesystem node seen while browsing. Recomputed on every visit, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserEntry {
    pub path: PathBuf,
    pub is_directory: bool,
}

impl BrowserEntry {
    /// Last path segment, as shown in listings.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
    }
}

/// Rejected navigation attempts.
#[derive(Debug, PartialEq, Eq)]
pub enum NavError {
    EmptyPath,
    /// The target lies outside the sysctl root.
    OutsideRoot(String),
}

impl std::fmt::Display for NavError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavError::EmptyPath => write!(f, "empty path"),
            NavError::OutsideRoot(path) => {
                write!(f, "{} is outside the sysctl tree", path)
            }
        }
    }
}

impl std::error::Error for NavError {}

/// A browsing session with its own current directory.
///
/// Sessions start at the sysctl root and can never navigate above it or out
/// of it; multiple independent sessions may coexist.
pub struct BrowserSession<F: FileSystem> {
    fs: F,
    root: PathBuf,
    current_path: PathBuf,
    folders_first: bool,
}

impl<F: FileSystem> BrowserSession<F> {
    /// Creates a session rooted at `/proc/sys`.
    pub fn new(fs: F) -> Self {
        Self::with_root(fs, PROC_SYS_ROOT)
    }

    /// Creates a session over a different root, for tests and fake trees.
    pub fn with_root(fs: F, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            fs,
            current_path: root.clone(),
            root,
            folders_first: false,
        }
    }

    /// Orders directories before files in listings.
    pub fn folders_first(mut self, enabled: bool) -> Self {
        self.folders_first = enabled;
        self
    }

    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    pub fn at_root(&self) -> bool {
        self.current_path == self.root
    }

    /// Moves to `new_path` if it is non-empty and lies under the root;
    /// otherwise the current path is unchanged and the rejection reported.
    pub fn change_directory(&mut self, new_path: &str) -> Result<(), NavError> {
        if new_path.is_empty() {
            return Err(NavError::EmptyPath);
        }
        let target = Path::new(new_path);
        if !target.starts_with(&self.root) {
            return Err(NavError::OutsideRoot(new_path.to_string()));
        }
        self.current_path = target.to_path_buf();
        Ok(())
    }

    /// Moves to the parent directory. Returns `false` at the root boundary,
    /// which is the signal to stop browsing.
    pub fn go_up(&mut self) -> bool {
        if self.at_root() {
            return false;
        }
        match self.current_path.parent() {
            Some(parent) if parent.starts_with(&self.root) => {
                self.current_path = parent.to_path_buf();
                true
            }
            _ => false,
        }
    }

    /// Lists the children of the current directory.
    ///
    /// A failed listing yields an empty sequence. Entries that vanished
    /// between the listing and the existence check are dropped, then the
    /// optional case-insensitive name filter applies, then directories are
    /// stably moved ahead of files when folders-first is on. Within each
    /// group the listing order is preserved; no alphabetic sort is imposed.
    pub fn list_children(&self, name_filter: Option<&str>) -> Vec<BrowserEntry> {
        let listed = self.fs.read_dir(&self.current_path).unwrap_or_default();

        let mut entries: Vec<BrowserEntry> = listed
            .into_iter()
            .filter(|path| self.fs.exists(path))
            .filter(|path| match name_filter {
                None => true,
                Some(filter) => name_matches(path, filter),
            })
            .map(|path| BrowserEntry {
                is_directory: self.fs.is_dir(&path),
                path,
            })
            .collect();

        if self.folders_first {
            // Stable: preserves listing order within each group.
            entries.sort_by_key(|e| !e.is_directory);
        }
        entries
    }
}

fn name_matches(path: &Path, filter: &str) -> bool {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_lowercase();
    name.contains(&filter.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFs;

    fn net_tree() -> MockFs {
        let mut fs = MockFs::new();
        fs.add_file("/proc/sys/net/core/somaxconn");
        fs.add_dir("/proc/sys/net/ipv4");
        fs.add_file("/proc/sys/net/ipv4_stub");
        fs.add_dir("/proc/sys/net/ipv6");
        fs
    }

    #[test]
    fn test_starts_at_proc_sys() {
        let session = BrowserSession::new(MockFs::new());
        assert_eq!(session.current_path(), Path::new("/proc/sys"));
        assert!(session.at_root());
    }

    #[test]
    fn test_change_directory_accepts_subtree() {
        let mut session = BrowserSession::new(net_tree());
        session.change_directory("/proc/sys/net/ipv4").unwrap();
        assert_eq!(session.current_path(), Path::new("/proc/sys/net/ipv4"));
    }

    #[test]
    fn test_change_directory_rejects_outside_root() {
        let mut session = BrowserSession::new(net_tree());
        let err = session.change_directory("/etc");
        assert_eq!(err, Err(NavError::OutsideRoot("/etc".to_string())));
        assert_eq!(session.current_path(), Path::new("/proc/sys"));
    }

    #[test]
    fn test_change_directory_rejects_empty() {
        let mut session = BrowserSession::new(net_tree());
        assert_eq!(session.change_directory(""), Err(NavError::EmptyPath));
        assert_eq!(session.current_path(), Path::new("/proc/sys"));
    }

    #[test]
    fn test_go_up_stops_at_root() {
        let mut session = BrowserSession::new(net_tree());
        session.change_directory("/proc/sys/net/ipv4").unwrap();
        assert!(session.go_up());
        assert_eq!(session.current_path(), Path::new("/proc/sys/net"));
        assert!(session.go_up());
        assert!(!session.go_up());
        assert_eq!(session.current_path(), Path::new("/proc/sys"));
    }

    #[test]
    fn test_list_children_preserves_listing_order() {
        let mut session = BrowserSession::new(net_tree());
        session.change_directory("/proc/sys/net").unwrap();
        let names: Vec<_> = session
            .list_children(None)
            .iter()
            .map(|e| e.file_name().to_string())
            .collect();
        assert_eq!(names, vec!["core", "ipv4", "ipv4_stub", "ipv6"]);
    }

    #[test]
    fn test_list_children_failed_listing_is_empty() {
        let mut session = BrowserSession::new(MockFs::new());
        session.change_directory("/proc/sys/missing").unwrap();
        assert!(session.list_children(None).is_empty());
    }

    #[test]
    fn test_list_children_drops_vanished_entries() {
        let mut fs = net_tree();
        fs.add_vanishing_file("/proc/sys/net/gone");
        let mut session = BrowserSession::new(fs);
        session.change_directory("/proc/sys/net").unwrap();
        let entries = session.list_children(None);
        assert!(entries.iter().all(|e| e.file_name() != "gone"));
        assert_eq!(entries.len(), 4);
    }

    #[test]
    fn test_name_filter_is_case_insensitive() {
        let mut session = BrowserSession::new(net_tree());
        session.change_directory("/proc/sys/net").unwrap();
        let names: Vec<_> = session
            .list_children(Some("IPv4"))
            .iter()
            .map(|e| e.file_name().to_string())
            .collect();
        assert_eq!(names, vec!["ipv4", "ipv4_stub"]);
    }

    #[test]
    fn test_folders_first_is_stable() {
        let mut session = BrowserSession::new(net_tree()).folders_first(true);
        session.change_directory("/proc/sys/net").unwrap();
        let entries = session.list_children(None);
        let names: Vec<_> = entries.iter().map(|e| e.file_name().to_string()).collect();
        // core, ipv4 and ipv6 are directories; ipv4_stub is a file.
        assert_eq!(names, vec!["core", "ipv4", "ipv6", "ipv4_stub"]);
        assert!(entries[..3].iter().all(|e| e.is_directory));
        assert!(!entries[3].is_directory);
    }
}
