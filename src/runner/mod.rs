//! Privileged command execution.
//!
//! The process itself does not hold the capability to write under
//! `/proc/sys`, so every tunable read and write is shelled out through an
//! elevated runner. [`CommandRunner`] is the sole privilege boundary;
//! [`SuRunner`] is the production implementation and [`mock::MockRunner`]
//! the scripted one for tests.

pub mod mock;

use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Runs shell commands with elevated privileges.
///
/// Failure never propagates to the caller: `run_captured` falls back to the
/// supplied default when execution fails or privileges are unavailable, and
/// `run_detached` reports nothing at all.
pub trait CommandRunner: Send + Sync {
    /// Executes `command` and returns its captured output, or `default` if
    /// the command could not be executed or produced nothing while failing.
    fn run_captured(&self, command: &str, default: &str) -> String;

    /// Executes `command` without waiting for or reporting output.
    fn run_detached(&self, command: &str);
}

/// Production runner that wraps commands in `su -c`.
#[derive(Debug, Clone)]
pub struct SuRunner {
    su_binary: String,
}

impl SuRunner {
    pub fn new() -> Self {
        Self {
            su_binary: "su".to_string(),
        }
    }

    /// Uses a different elevation binary (e.g. a full path, or `sudo`-style
    /// wrappers that accept `-c`).
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            su_binary: binary.into(),
        }
    }
}

impl Default for SuRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for SuRunner {
    fn run_captured(&self, command: &str, default: &str) -> String {
        debug!("{} -c {}", self.su_binary, command);
        let output = match Command::new(&self.su_binary).arg("-c").arg(command).output() {
            Ok(output) => output,
            Err(e) => {
                warn!("privileged command failed to start: {}", e);
                return default.to_string();
            }
        };

        // Diagnostics from the kernel (e.g. a rejected value) arrive on
        // stderr; merge them so callers see them as feedback text.
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(stderr.trim_end());
        }

        if text.trim().is_empty() && !output.status.success() {
            return default.to_string();
        }
        text
    }

    fn run_detached(&self, command: &str) {
        debug!("{} -c {} (detached)", self.su_binary, command);
        let spawned = Command::new(&self.su_binary)
            .arg("-c")
            .arg(command)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        if let Err(e) = spawned {
            warn!("detached privileged command failed to start: {}", e);
        }
    }
}
