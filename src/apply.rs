//! The apply protocol: validate a value, write it through the privileged
//! runner, re-read it, and report exactly one outcome.

use crate::param::KernelParam;
use crate::runner::CommandRunner;
use crate::store::{BlobStore, ParamStore};
use tracing::{debug, warn};

/// Outcome of a single apply. Exactly one fires per invocation.
///
/// There is no dedicated failure variant: the absence of `Success` is the
/// failure indicator, with `Feedback` carrying whatever diagnostic text the
/// kernel produced (or a generic rejection message).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The supplied value was empty; no privileged command was issued.
    EmptyValue,
    /// The write did not stick; the text is the kernel's diagnostic output
    /// when available.
    Feedback(String),
    /// The re-read value equals the requested value.
    Success,
    /// A registered special handler took over instead of the standard path.
    CustomApply(KernelParam),
}

impl ApplyOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ApplyOutcome::Success)
    }
}

type SpecialPredicate = Box<dyn Fn(&str) -> bool + Send + Sync>;
type SpecialHandler = Box<dyn Fn(&KernelParam, &dyn CommandRunner) + Send + Sync>;

/// Applies values to kernel tunables through a privileged runner.
pub struct ApplyEngine<R: CommandRunner> {
    runner: R,
    use_busybox: bool,
    special: Vec<(SpecialPredicate, SpecialHandler)>,
}

impl<R: CommandRunner> ApplyEngine<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            use_busybox: false,
            special: Vec::new(),
        }
    }

    /// Prefixes privileged commands with `busybox`.
    pub fn use_busybox(mut self, enabled: bool) -> Self {
        self.use_busybox = enabled;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Registers a special tunable needing multi-step or alternate handling.
    /// When the predicate matches a path, the handler runs instead of the
    /// standard write and the outcome is `CustomApply`. Registrations are
    /// consulted in order; nothing is registered by default.
    pub fn register_special(
        &mut self,
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
        handler: impl Fn(&KernelParam, &dyn CommandRunner) + Send + Sync + 'static,
    ) {
        self.special
            .push((Box::new(predicate), Box::new(handler)));
    }

    /// Reads the current value of a tunable, trailing newline stripped.
    pub fn read_value(&self, path: &str) -> String {
        let command = self.command(format!("cat {}", path));
        self.runner
            .run_captured(&command, "")
            .trim_end()
            .to_string()
    }

    /// Applies `param.value` to `param.path`.
    ///
    /// 1. An empty value aborts with `EmptyValue` before any command runs.
    /// 2. A matching special registration delegates to its handler.
    /// 3. Otherwise the value is written with `echo`, the path re-read, and
    ///    the two compared as opaque strings (no numeric normalization).
    pub fn apply(&self, param: &KernelParam) -> ApplyOutcome {
        if param.value.is_empty() {
            return ApplyOutcome::EmptyValue;
        }

        for (predicate, handler) in &self.special {
            if predicate(&param.path) {
                debug!("custom apply for {}", param.path);
                handler(param, &self.runner);
                return ApplyOutcome::CustomApply(param.clone());
            }
        }

        let write = self.command(format!(
            "echo {} > {}",
            shell_quote(&param.value),
            param.path
        ));
        let diagnostic = self.runner.run_captured(&write, "");

        let current = self.read_value(&param.path);
        if current == param.value {
            return ApplyOutcome::Success;
        }

        let diagnostic = diagnostic.trim();
        if diagnostic.is_empty() {
            ApplyOutcome::Feedback(format!(
                "value not accepted: {} reads back as '{}'",
                param.name(),
                current
            ))
        } else {
            ApplyOutcome::Feedback(diagnostic.to_string())
        }
    }

    /// Like [`apply`](Self::apply), but commits the parameter into the store
    /// as part of a `Success` outcome.
    pub fn apply_and_persist<S: BlobStore>(
        &self,
        param: &KernelParam,
        store: &mut ParamStore<S>,
    ) -> ApplyOutcome {
        let outcome = self.apply(param);
        if outcome.is_success() {
            if let Err(e) = store.add(std::slice::from_ref(param)) {
                warn!("applied {} but saving it failed: {}", param.path, e);
            }
        }
        outcome
    }

    fn command(&self, command: String) -> String {
        if self.use_busybox {
            format!("busybox {}", command)
        } else {
            command
        }
    }
}

/// Single-quotes a value for the shell, escaping embedded quotes.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
