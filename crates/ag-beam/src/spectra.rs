//! Two-bin power spectra built from a single-frequency CSM.

use ag_core::CMatrix;

use crate::error::{BeamError, BeamResult};

/// CSM stack with the bin layout of a block-FFT estimate: bin `k` sits at
/// `k * sample_freq / block_size`. With `sample_freq = frequency *
/// block_size`, bin 1 is the analysis frequency; only bins in
/// `[ind_low, ind_high)` are evaluated.
#[derive(Debug, Clone)]
pub struct PowerSpectraInput {
    sample_freq: f64,
    block_size: usize,
    csm: Vec<CMatrix>,
    ind_low: usize,
    ind_high: usize,
}

impl PowerSpectraInput {
    /// From the stored `[zeros, csm]` stack.
    pub fn new(frequency: f64, block_size: usize, csm_stack: [CMatrix; 2]) -> BeamResult<Self> {
        if !(frequency.is_finite() && frequency > 0.0) {
            return Err(BeamError::InvalidArg {
                what: format!("frequency must be positive, got {frequency}"),
            });
        }
        if block_size == 0 {
            return Err(BeamError::InvalidArg {
                what: "block size must be positive".to_string(),
            });
        }
        let m = csm_stack[1].nrows();
        for bin in &csm_stack {
            if bin.shape() != (m, m) {
                return Err(BeamError::Shape {
                    what: "CSM bin",
                    expected: (m, m),
                    got: bin.shape(),
                });
            }
        }
        Ok(Self {
            sample_freq: frequency * block_size as f64,
            block_size,
            csm: csm_stack.into(),
            ind_low: 1,
            ind_high: 2,
        })
    }

    /// From a bare CSM; bin 0 is filled with zeros.
    pub fn from_csm(frequency: f64, block_size: usize, csm: CMatrix) -> BeamResult<Self> {
        let m = csm.nrows();
        Self::new(frequency, block_size, [CMatrix::zeros(m, m), csm])
    }

    pub fn sample_freq(&self) -> f64 {
        self.sample_freq
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn num_channels(&self) -> usize {
        self.csm[0].nrows()
    }

    pub fn num_bins(&self) -> usize {
        self.csm.len()
    }

    pub fn ind_low(&self) -> usize {
        self.ind_low
    }

    pub fn ind_high(&self) -> usize {
        self.ind_high
    }

    pub fn bin(&self, k: usize) -> &CMatrix {
        &self.csm[k]
    }

    pub fn bin_frequencies(&self) -> Vec<f64> {
        (0..self.csm.len())
            .map(|k| k as f64 * self.sample_freq / self.block_size as f64)
            .collect()
    }
}
