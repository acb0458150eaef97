//! JSON import and export of parameter sets.
//!
//! The document is an ordered array of `{path, value, tag}` records. `name`
//! is never persisted (always re-derived from the path), unknown fields are
//! ignored for forward compatibility, and a record missing `path` is
//! dropped rather than failing the whole document.

use crate::apply::{ApplyEngine, ApplyOutcome};
use crate::param::KernelParam;
use crate::runner::CommandRunner;
use crate::store::{BlobStore, ParamStore};
use serde::Deserialize;
use tracing::{debug, error, warn};

/// Errors from import and export.
#[derive(Debug)]
pub enum PortError {
    /// The document is structurally malformed. Nothing was changed.
    Format(String),
    /// The document parsed but yielded no usable candidates. Nothing was
    /// changed.
    EmptyResult,
    /// Committing the new list failed after applies succeeded. The previous
    /// list has been restored before this is returned.
    Persistence,
}

impl std::fmt::Display for PortError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortError::Format(msg) => write!(f, "malformed document: {}", msg),
            PortError::EmptyResult => write!(f, "document contains no usable parameters"),
            PortError::Persistence => {
                write!(f, "saving the imported list failed; previous list restored")
            }
        }
    }
}

impl std::error::Error for PortError {}

/// Result of a completed import. `applied` may be smaller than `candidates`;
/// partial success is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub applied: usize,
    pub candidates: usize,
}

#[derive(Deserialize)]
struct RawRecord {
    path: Option<String>,
    #[serde(default)]
    value: String,
    #[serde(default)]
    tag: String,
}

/// Serializes parameters to the document format, order preserved.
pub fn export_json(params: &[KernelParam]) -> Result<String, PortError> {
    serde_json::to_string_pretty(params).map_err(|e| PortError::Format(e.to_string()))
}

/// Parses a document into candidate parameters.
///
/// Malformed JSON is a `Format` error; records without a `path` are
/// dropped; an empty candidate set is an `EmptyResult` error.
pub fn parse_document(doc: &str) -> Result<Vec<KernelParam>, PortError> {
    let records: Vec<RawRecord> =
        serde_json::from_str(doc).map_err(|e| PortError::Format(e.to_string()))?;

    let candidates: Vec<KernelParam> = records
        .into_iter()
        .filter_map(|r| {
            r.path.map(|path| KernelParam {
                path,
                value: r.value,
                tag: r.tag,
            })
        })
        .collect();

    if candidates.is_empty() {
        return Err(PortError::EmptyResult);
    }
    Ok(candidates)
}

/// Imports a document: applies every candidate in order, then atomically
/// replaces the stored list with the subset that succeeded.
///
/// Candidates advance to the new list only on a `Success` outcome; any
/// other outcome is reflected solely in the report counts. The store
/// snapshot taken before the replace is restored if the replace fails, so
/// a failed import never leaves a half-applied list behind.
pub fn import_document<R: CommandRunner, S: BlobStore>(
    doc: &str,
    engine: &ApplyEngine<R>,
    store: &mut ParamStore<S>,
) -> Result<ImportReport, PortError> {
    let candidates = parse_document(doc)?;

    let mut successful = Vec::new();
    for candidate in &candidates {
        match engine.apply(candidate) {
            ApplyOutcome::Success => successful.push(candidate.clone()),
            outcome => debug!("import skipped {}: {:?}", candidate.path, outcome),
        }
    }

    let snapshot = store.list();
    if let Err(e) = store.replace_all(&successful) {
        warn!("import commit failed ({}), restoring previous list", e);
        if let Err(e) = store.replace_all(&snapshot) {
            error!("restoring the previous parameter list failed: {}", e);
        }
        return Err(PortError::Persistence);
    }

    Ok(ImportReport {
        applied: successful.len(),
        candidates: candidates.len(),
    })
}
