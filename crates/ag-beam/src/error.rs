//! Error types for the beamforming adapter.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BeamError {
    #[error("Shape mismatch for {what}: expected {expected:?}, got {got:?}")]
    Shape {
        what: &'static str,
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("No steering filters for {requested} Hz (stored for {available} Hz)")]
    FrequencyMismatch { requested: f64, available: f64 },

    #[error("No computed frequency bin in the band around {frequency} Hz (n = {n})")]
    EmptyBand { frequency: f64, n: u32 },

    #[error("Beamforming map has no positive power")]
    NoPositivePower,

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },
}

pub type BeamResult<T> = Result<T, BeamError>;
