//! Error types for synthesis.

use ag_amiet::AmietError;
use ag_core::CoreError;
use ag_shear::ShearError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SynthError {
    #[error("Source model error: {0}")]
    Amiet(#[from] AmietError),

    #[error("Propagation error: {0}")]
    Shear(#[from] ShearError),

    #[error("Steering filter for scan point {scan_index} has zero norm")]
    ZeroNormSteering { scan_index: usize },

    #[error("At {frequency} Hz: {source}")]
    AtFrequency {
        frequency: f64,
        source: Box<SynthError>,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SynthError {
    pub fn at_frequency(self, frequency: f64) -> Self {
        match self {
            SynthError::AtFrequency { .. } => self,
            other => SynthError::AtFrequency {
                frequency,
                source: Box::new(other),
            },
        }
    }

    /// The error without frequency context.
    pub fn root(&self) -> &SynthError {
        match self {
            SynthError::AtFrequency { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn frequency(&self) -> Option<f64> {
        match self {
            SynthError::AtFrequency { frequency, .. } => Some(*frequency),
            _ => None,
        }
    }
}

pub type SynthResult<T> = Result<T, SynthError>;
