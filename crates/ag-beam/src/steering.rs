//! Steering filter sources.

use ag_core::CMatrix;

use crate::error::{BeamError, BeamResult};

/// Supplies the steering filter matrix (channels × scan points) for a
/// frequency.
pub trait SteeringSource {
    fn num_channels(&self) -> usize;

    fn num_points(&self) -> usize;

    fn steering_for(&self, frequency: f64) -> BeamResult<&CMatrix>;
}

/// Filters computed ahead of time for a single frequency.
#[derive(Debug, Clone)]
pub struct PrecomputedSteering {
    frequency: f64,
    filters: CMatrix,
}

impl PrecomputedSteering {
    const REL_TOL: f64 = 1e-9;

    pub fn new(frequency: f64, filters: CMatrix) -> Self {
        Self { frequency, filters }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }
}

impl SteeringSource for PrecomputedSteering {
    fn num_channels(&self) -> usize {
        self.filters.nrows()
    }

    fn num_points(&self) -> usize {
        self.filters.ncols()
    }

    fn steering_for(&self, frequency: f64) -> BeamResult<&CMatrix> {
        if (frequency - self.frequency).abs() > Self::REL_TOL * self.frequency.abs() {
            return Err(BeamError::FrequencyMismatch {
                requested: frequency,
                available: self.frequency,
            });
        }
        Ok(&self.filters)
    }
}
