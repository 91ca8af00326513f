//! Per-frequency acoustic/convective wavenumbers and spanwise gust sampling.

use ag_core::ensure_positive;
use ag_setup::{AirfoilGeometry, FlowConfiguration};
use std::f64::consts::PI;

use crate::error::{AmietError, AmietResult};

/// Frequency-dependent wavenumbers: acoustic `k0`, convective `kx` and the
/// critical spanwise gust wavenumber `ky_crit` separating radiating
/// (supercritical) from evanescent (subcritical) gusts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyVars {
    pub frequency: f64,
    pub k0: f64,
    pub kx: f64,
    pub ky_crit: f64,
}

impl FrequencyVars {
    pub fn new(frequency: f64, flow: &FlowConfiguration) -> AmietResult<Self> {
        ensure_positive(frequency, "frequency")?;
        let k0 = 2.0 * PI * frequency / flow.c0();
        let kx = k0 / flow.mach();
        let ky_crit = kx * flow.mach() / flow.beta();
        Ok(Self {
            frequency,
            k0,
            kx,
            ky_crit,
        })
    }
}

/// Sampling rule for the spanwise gust wavenumbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KySampling {
    /// `ky_max = max_factor * ky_crit`.
    pub max_factor: f64,
    /// Spacing is `2π / (2d * oversample)`.
    pub oversample: f64,
}

impl Default for KySampling {
    fn default() -> Self {
        Self {
            max_factor: 1.5,
            oversample: 4.0,
        }
    }
}

impl KySampling {
    pub fn new(max_factor: f64, oversample: f64) -> AmietResult<Self> {
        ensure_positive(max_factor, "ky max_factor")?;
        ensure_positive(oversample, "ky oversample")?;
        Ok(Self {
            max_factor,
            oversample,
        })
    }

    /// Symmetric, uniformly spaced wavenumbers `dky * (-n..=n)` covering
    /// `[-ky_max, ky_max]`.
    pub fn sample(&self, airfoil: &AirfoilGeometry, fvars: &FrequencyVars) -> SpanwiseWavenumbers {
        let ky_max = self.max_factor * fvars.ky_crit;
        let dky = 2.0 * PI / (2.0 * airfoil.d() * self.oversample);
        let n = (ky_max / dky).ceil().max(0.0) as i64;
        let values = (-n..=n).map(|i| i as f64 * dky).collect();
        SpanwiseWavenumbers { values, dky }
    }
}

/// Spanwise gust wavenumbers used by one frequency's source CSM.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanwiseWavenumbers {
    values: Vec<f64>,
    dky: f64,
}

impl SpanwiseWavenumbers {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn dky(&self) -> f64 {
        self.dky
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn ky_max(&self) -> f64 {
        self.values.last().copied().unwrap_or(0.0)
    }

    /// Highest sampled wavenumber must be resolved by the spanwise panel
    /// spacing: `ky_max * dy < π`.
    pub fn check_aliasing(&self, dy: f64) -> AmietResult<()> {
        let ky_max = self.ky_max();
        let product = ky_max * dy;
        if product >= PI {
            return Err(AmietError::SpanwiseAliasing {
                ky_max,
                dy,
                product,
            });
        }
        Ok(())
    }
}
