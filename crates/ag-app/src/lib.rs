//! Service layer for airfoil-noise simulation runs.
//!
//! Ties the pieces together: a simulation file is loaded and compiled, the
//! per-frequency synthesis runs (optionally in parallel batches) and every
//! result is appended to a single run file. A sealed run whose fingerprint
//! matches the request is reused instead of recomputed.

pub mod error;
pub mod progress;
pub mod query;
pub mod run_service;
pub mod simulation_service;

pub use error::{AppError, AppResult, ErrorKind};
pub use progress::{FrequencyProgress, RunProgressEvent, RunStage};
pub use query::{BeamOptions, RunSummary, beam_map, get_run_summary, read_record};
pub use run_service::{
    RunOptions, RunRequest, RunResponse, RunTimingSummary, SOLVER_VERSION, ensure_run,
    ensure_run_with_progress, load_run,
};
pub use simulation_service::{load_simulation, save_simulation};
