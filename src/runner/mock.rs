//! Scripted command runner for tests.

use crate::runner::CommandRunner;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory runner that returns scripted output per command and records
/// every command it was asked to run.
#[derive(Debug, Default)]
pub struct MockRunner {
    outputs: Mutex<HashMap<String, String>>,
    history: Mutex<Vec<String>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the output returned for an exact command string.
    pub fn script(&self, command: impl Into<String>, output: impl Into<String>) {
        self.outputs
            .lock()
            .unwrap()
            .insert(command.into(), output.into());
    }

    /// Commands issued so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.history.lock().unwrap().clone()
    }
}

impl CommandRunner for MockRunner {
    fn run_captured(&self, command: &str, default: &str) -> String {
        self.history.lock().unwrap().push(command.to_string());
        self.outputs
            .lock()
            .unwrap()
            .get(command)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    fn run_detached(&self, command: &str) {
        self.history.lock().unwrap().push(command.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_output() {
        let runner = MockRunner::new();
        runner.script("cat /proc/sys/vm/swappiness", "60\n");
        assert_eq!(
            runner.run_captured("cat /proc/sys/vm/swappiness", ""),
            "60\n"
        );
    }

    #[test]
    fn test_unscripted_command_returns_default() {
        let runner = MockRunner::new();
        assert_eq!(runner.run_captured("cat /proc/sys/vm/unknown", "n/a"), "n/a");
    }

    #[test]
    fn test_history_records_order() {
        let runner = MockRunner::new();
        runner.run_captured("first", "");
        runner.run_detached("second");
        assert_eq!(runner.commands(), vec!["first", "second"]);
    }
}
