//! Error types for the ag-app service layer.

use ag_amiet::AmietError;
use ag_beam::BeamError;
use ag_core::CoreError;
use ag_results::ResultsError;
use ag_setup::SetupError;
use ag_shear::ShearError;
use ag_synth::SynthError;
use std::path::PathBuf;

/// Failure classes reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid, unreadable or unsupported input, detected before any results
    /// are written.
    Configuration,
    /// Lookup miss in a persisted run.
    NotFound,
    /// Crossing-point solve or filter normalisation failed.
    NumericalDivergence,
    /// The run file could not be created, read or appended.
    Storage,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),

    #[error("Synthesis error: {0}")]
    Synth(#[from] SynthError),

    #[error("Results error: {0}")]
    Results(#[from] ResultsError),

    #[error("Beamforming error: {0}")]
    Beam(#[from] BeamError),

    #[error("Unsupported simulation file extension: {path}")]
    UnsupportedFile { path: PathBuf },
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Setup(_) | AppError::UnsupportedFile { .. } => ErrorKind::Configuration,
            AppError::Synth(err) => synth_kind(err.root()),
            AppError::Results(err) if err.is_not_found() => ErrorKind::NotFound,
            AppError::Results(ResultsError::Validation(_)) => ErrorKind::Configuration,
            AppError::Results(_) => ErrorKind::Storage,
            AppError::Beam(BeamError::FrequencyMismatch { .. } | BeamError::EmptyBand { .. }) => {
                ErrorKind::NotFound
            }
            AppError::Beam(BeamError::NoPositivePower) => ErrorKind::NumericalDivergence,
            AppError::Beam(_) => ErrorKind::Configuration,
        }
    }

    /// Frequency the failure happened at, when known.
    pub fn frequency(&self) -> Option<f64> {
        match self {
            AppError::Synth(err) => err.frequency(),
            AppError::Results(ResultsError::FrequencyNotFound { frequency }) => Some(*frequency),
            AppError::Beam(BeamError::EmptyBand { frequency, .. }) => Some(*frequency),
            _ => None,
        }
    }
}

fn synth_kind(err: &SynthError) -> ErrorKind {
    match err {
        SynthError::Amiet(AmietError::Core(core))
        | SynthError::Shear(ShearError::Core(core))
        | SynthError::Core(core) => core_kind(core),
        SynthError::Amiet(AmietError::NonFinite { .. }) => ErrorKind::NumericalDivergence,
        SynthError::Amiet(_) => ErrorKind::Configuration,
        SynthError::Shear(ShearError::Divergence { .. }) => ErrorKind::NumericalDivergence,
        SynthError::Shear(ShearError::Configuration { .. }) => ErrorKind::Configuration,
        SynthError::ZeroNormSteering { .. } => ErrorKind::NumericalDivergence,
        SynthError::AtFrequency { source, .. } => synth_kind(source),
    }
}

fn core_kind(err: &CoreError) -> ErrorKind {
    match err {
        CoreError::NonFinite { .. } => ErrorKind::NumericalDivergence,
        CoreError::NotPositive { .. } | CoreError::Shape { .. } => ErrorKind::Configuration,
    }
}
