//! Error types for shear-layer propagation.

use ag_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShearError {
    #[error("Invalid shear-layer configuration: {what}")]
    Configuration { what: String },

    #[error(
        "Crossing point did not converge for source {source_index}, receiver {receiver_index} \
         after {iterations} iterations (last step {last_step:.3e} m)"
    )]
    Divergence {
        source_index: usize,
        receiver_index: usize,
        iterations: usize,
        last_step: f64,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type ShearResult<T> = Result<T, ShearError>;
