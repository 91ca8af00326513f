//! Frequency-domain delay-and-sum beamformer.

use ag_core::CMatrix;
use tracing::debug;

use crate::error::{BeamError, BeamResult};
use crate::level::normalized_levels;
use crate::spectra::PowerSpectraInput;
use crate::steering::{PrecomputedSteering, SteeringSource};

/// Delay-and-sum map `B(n) = w_nᴴ C w_n` over every scan point.
///
/// With `r_diag` the CSM diagonal is removed and the result is scaled by
/// `M / (M - 1)`.
pub struct BeamformerBase<'a, S: SteeringSource> {
    pub freq_data: &'a PowerSpectraInput,
    pub steer: &'a S,
    pub r_diag: bool,
}

impl<S: SteeringSource> BeamformerBase<'_, S> {
    fn bin_power(&self, k: usize, frequency: f64) -> BeamResult<Vec<f64>> {
        let w = self.steer.steering_for(frequency)?;
        let m = self.freq_data.num_channels();
        if w.nrows() != m {
            return Err(BeamError::Shape {
                what: "steering filters",
                expected: (m, w.ncols()),
                got: w.shape(),
            });
        }

        let mut csm: CMatrix = self.freq_data.bin(k).clone();
        let mut norm = 1.0;
        if self.r_diag {
            csm.fill_diagonal(ag_core::c64(0.0, 0.0));
            if m > 1 {
                norm = m as f64 / (m as f64 - 1.0);
            }
        }

        let cw = &csm * w;
        Ok((0..w.ncols())
            .map(|n| norm * w.column(n).dotc(&cw.column(n)).re)
            .collect())
    }

    /// Map summed over the bins of the `1/n`-octave band around
    /// `frequency` (`n = 0`: the single nearest bin). Bins outside
    /// `[ind_low, ind_high)` contribute nothing.
    pub fn synthetic(&self, frequency: f64, n: u32) -> BeamResult<Vec<f64>> {
        let freqs = self.freq_data.bin_frequencies();
        let bins: Vec<usize> = if n == 0 {
            let nearest = (0..freqs.len()).min_by(|&a, &b| {
                (freqs[a] - frequency)
                    .abs()
                    .total_cmp(&(freqs[b] - frequency).abs())
            });
            nearest.into_iter().collect()
        } else {
            let half = 0.5 / n as f64;
            let (f1, f2) = (frequency * 2f64.powf(-half), frequency * 2f64.powf(half));
            (0..freqs.len())
                .filter(|&k| freqs[k] >= f1 && freqs[k] < f2)
                .collect()
        };

        let active: Vec<usize> = bins
            .into_iter()
            .filter(|&k| k >= self.freq_data.ind_low() && k < self.freq_data.ind_high())
            .collect();
        if active.is_empty() {
            return Err(BeamError::EmptyBand { frequency, n });
        }

        let mut total = vec![0.0; self.steer.num_points()];
        for k in active {
            let power = self.bin_power(k, freqs[k])?;
            for (t, p) in total.iter_mut().zip(power) {
                *t += p;
            }
        }
        Ok(total)
    }
}

/// Single-frequency beamformer over stored results.
#[derive(Debug, Clone)]
pub struct Beamer {
    frequency: f64,
    power_spectra: PowerSpectraInput,
    steering: PrecomputedSteering,
    remove_diag: bool,
    modifier: f64,
}

impl Beamer {
    pub const DEFAULT_BLOCK_SIZE: usize = 128;

    pub fn new(
        frequency: f64,
        csm_stack: [CMatrix; 2],
        steering: CMatrix,
        block_size: usize,
        remove_diag: bool,
        modifier: f64,
    ) -> BeamResult<Self> {
        let power_spectra = PowerSpectraInput::new(frequency, block_size, csm_stack)?;
        if steering.nrows() != power_spectra.num_channels() {
            return Err(BeamError::Shape {
                what: "steering filters",
                expected: (power_spectra.num_channels(), steering.ncols()),
                got: steering.shape(),
            });
        }
        let bin_frequency = power_spectra.bin_frequencies()[1];
        Ok(Self {
            frequency,
            power_spectra,
            steering: PrecomputedSteering::new(bin_frequency, steering),
            remove_diag,
            modifier,
        })
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn power_spectra(&self) -> &PowerSpectraInput {
        &self.power_spectra
    }

    /// Raw delay-and-sum power per scan point.
    pub fn pressure(&self, n: u32) -> BeamResult<Vec<f64>> {
        BeamformerBase {
            freq_data: &self.power_spectra,
            steer: &self.steering,
            r_diag: self.remove_diag,
        }
        .synthetic(self.frequency, n)
    }

    /// Level map normalised by its maximum and offset by the modifier.
    pub fn beamforming(&self, n: u32) -> BeamResult<Vec<f64>> {
        let pressure = self.pressure(n)?;
        debug!(
            frequency = self.frequency,
            n,
            points = pressure.len(),
            "delay-and-sum map computed"
        );
        normalized_levels(&pressure, self.modifier)
    }
}
