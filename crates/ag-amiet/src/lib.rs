//! Turbulence-interaction noise source model for a flat-plate airfoil.
//!
//! Follows Amiet's leading-edge theory: a frozen turbulence field convects
//! past the airfoil, each spanwise gust wavenumber produces a surface
//! pressure jump, and the jumps are summed incoherently into the surface
//! pressure cross-spectral matrix ("source CSM").

pub mod error;
pub mod gust;
pub mod source_csm;
pub mod special;
pub mod turbulence;
pub mod wavenumber;

pub use error::{AmietError, AmietResult};
pub use gust::{leading_edge_response, pressure_jump};
pub use source_csm::{SourceCsm, WeightedSourceCsm, calc_airfoil_sqq, source_csm};
pub use turbulence::TurbulenceModel;
pub use wavenumber::{FrequencyVars, KySampling, SpanwiseWavenumbers};
