//! ag-results: persisted simulation runs.
//!
//! A run is one JSON-Lines file holding one group per line. [`RunWriter`]
//! keeps the file open for the whole run and flushes after every group so
//! an interrupted run stays readable; [`RunReader`] indexes the file and
//! loads frequency records on demand.

pub mod array;
pub mod hash;
pub mod reader;
pub mod store;
pub mod types;

pub use array::ComplexArray;
pub use hash::compute_fingerprint;
pub use reader::{FrequencyRecord, RunInfo, RunReader};
pub use store::RunWriter;
pub use types::*;

use std::path::PathBuf;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stored configuration is invalid: {0}")]
    Validation(#[from] ag_setup::ValidationError),

    #[error("Run not found: {path}")]
    RunNotFound { path: PathBuf },

    #[error("Frequency {frequency} Hz not found in run")]
    FrequencyNotFound { frequency: f64 },

    #[error("Frequency record index {index} out of range ({len} records)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Frequency {frequency} Hz already stored in run")]
    DuplicateFrequency { frequency: f64 },

    #[error("Run {path} is sealed")]
    Sealed { path: PathBuf },

    #[error("Invalid write order: {what}")]
    InvalidState { what: String },

    #[error("Missing group '{group}'")]
    MissingGroup { group: &'static str },

    #[error("Corrupt run file at line {line}: {reason}")]
    Corrupt { line: usize, reason: String },

    #[error("Refusing to store non-finite data at {frequency} Hz: {source}")]
    NonFinite {
        frequency: f64,
        source: ag_core::CoreError,
    },

    #[error("Shape mismatch for {what}: expected {expected:?}, got {got:?}")]
    Shape {
        what: &'static str,
        expected: Vec<usize>,
        got: Vec<usize>,
    },
}

impl ResultsError {
    /// Lookup misses, as opposed to storage faults.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ResultsError::RunNotFound { .. }
                | ResultsError::FrequencyNotFound { .. }
                | ResultsError::IndexOutOfRange { .. }
        )
    }
}
