//! The in-memory model of a single kernel tunable.

use serde::{Deserialize, Serialize};

/// Root of the sysctl tree. Browsing and navigation never leave it.
pub const PROC_SYS_ROOT: &str = "/proc/sys";

/// A kernel tunable: its pseudo-file path and its string value.
///
/// The display name is always derived from the path (see [`KernelParam::name`])
/// and is therefore never stored or serialized. `value` may legitimately be
/// empty for a parameter that has not been read yet; the apply protocol
/// rejects writing an empty value. `tag` is a free-form label used to group
/// saved parameters and defaults to empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelParam {
    pub path: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub tag: String,
}

impl KernelParam {
    pub fn new(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
            tag: String::new(),
        }
    }

    /// Sets the grouping tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Display name derived from the path: the last segment with any file
    /// extension stripped. A pure function of `path`, recomputed on demand.
    pub fn name(&self) -> &str {
        let last = self.path.rsplit('/').next().unwrap_or("");
        match last.rfind('.') {
            // A leading dot is part of the name, not an extension.
            Some(i) if i > 0 => &last[..i],
            _ => last,
        }
    }

    /// Whether the path lies under the sysctl root.
    pub fn is_under_proc_sys(&self) -> bool {
        self.path.starts_with(PROC_SYS_ROOT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_last_segment() {
        let p = KernelParam::new("/proc/sys/vm/swappiness", "60");
        assert_eq!(p.name(), "swappiness");
    }

    #[test]
    fn test_name_strips_extension() {
        let p = KernelParam::new("/proc/sys/kernel/osrelease.bak", "");
        assert_eq!(p.name(), "osrelease");
    }

    #[test]
    fn test_name_keeps_leading_dot() {
        let p = KernelParam::new("/proc/sys/kernel/.hidden", "");
        assert_eq!(p.name(), ".hidden");
    }

    #[test]
    fn test_name_tracks_path_changes() {
        let mut p = KernelParam::new("/proc/sys/vm/swappiness", "60");
        p.path = "/proc/sys/net/ipv4/ip_forward".to_string();
        assert_eq!(p.name(), "ip_forward");
    }

    #[test]
    fn test_serialize_omits_name() {
        let p = KernelParam::new("/proc/sys/vm/swappiness", "60").with_tag("vm");
        let json = serde_json::to_string(&p).unwrap();
        assert!(!json.contains("name"));
        assert!(json.contains("/proc/sys/vm/swappiness"));
    }

    #[test]
    fn test_deserialize_defaults_and_unknown_fields() {
        let json = r#"{"path":"/proc/sys/vm/swappiness","extra":42}"#;
        let p: KernelParam = serde_json::from_str(json).unwrap();
        assert_eq!(p.value, "");
        assert_eq!(p.tag, "");
        assert_eq!(p.name(), "swappiness");
    }

    #[test]
    fn test_is_under_proc_sys() {
        assert!(KernelParam::new("/proc/sys/vm/swappiness", "").is_under_proc_sys());
        assert!(!KernelParam::new("/etc/passwd", "").is_under_proc_sys());
    }
}
