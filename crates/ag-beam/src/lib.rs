//! Delay-and-sum beamforming over precomputed CSMs and steering filters.
//!
//! The inputs mirror a per-bin power-spectra container: a two-bin CSM stack
//! whose bin 1 sits at the analysis frequency, and a steering source that
//! hands out the stored filter matrix for that frequency.

pub mod beamformer;
pub mod error;
pub mod level;
pub mod spectra;
pub mod steering;

pub use beamformer::{Beamer, BeamformerBase};
pub use error::{BeamError, BeamResult};
pub use level::{l_p, level_grid, normalized_levels};
pub use spectra::PowerSpectraInput;
pub use steering::{PrecomputedSteering, SteeringSource};
