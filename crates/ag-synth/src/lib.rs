//! Microphone CSM and steering-filter synthesis.
//!
//! [`Synthesizer`] holds the frequency-independent geometry of a run and
//! turns each analysis frequency into a [`FrequencyResult`] through a chain
//! of immutable stages: wavenumbers, source CSM, forward transfer,
//! microphone CSM and steering filters.

pub mod csm;
pub mod error;
pub mod pipeline;
pub mod steering;

pub use csm::synthesize;
pub use error::{SynthError, SynthResult};
pub use pipeline::{ForwardGeometry, FrequencyResult, SynthesisConfig, Synthesizer};
pub use steering::steering_filters;
