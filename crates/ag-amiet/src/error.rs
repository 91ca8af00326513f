//! Error types for the source model.

use ag_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AmietError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error(
        "Spanwise wavenumbers alias on the airfoil grid: ky_max * dy = {product:.3} >= pi \
         (ky_max = {ky_max:.3} rad/m, dy = {dy:.4} m)"
    )]
    SpanwiseAliasing { ky_max: f64, dy: f64, product: f64 },

    #[error("Non-finite {what} at {frequency} Hz")]
    NonFinite { what: &'static str, frequency: f64 },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type AmietResult<T> = Result<T, AmietError>;
