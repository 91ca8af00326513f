//! Two-dimensional upwash spectra of isotropic turbulence.

use ag_core::units::constants::{GAMMA_1_3, GAMMA_5_6};
use ag_setup::FlowConfiguration;
use std::f64::consts::PI;

/// Turbulence energy spectrum model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurbulenceModel {
    #[default]
    VonKarman,
    Liepmann,
}

impl TurbulenceModel {
    /// Φ_ww(kx, ky) for rms velocity `u_rms` and integral length scale
    /// `length_scale`.
    pub fn spectrum(self, kx: f64, ky: f64, u_rms: f64, length_scale: f64) -> f64 {
        let u2 = u_rms * u_rms;
        match self {
            TurbulenceModel::VonKarman => {
                let ke = (PI.sqrt() / length_scale) * (GAMMA_5_6 / GAMMA_1_3);
                let k2 = (kx / ke).powi(2) + (ky / ke).powi(2);
                (4.0 / (9.0 * PI)) * (u2 / (ke * ke)) * k2 / (1.0 + k2).powf(7.0 / 3.0)
            }
            TurbulenceModel::Liepmann => {
                let ls2 = length_scale * length_scale;
                let k2 = ls2 * (kx * kx + ky * ky);
                (3.0 * u2 * ls2 / (4.0 * PI)) * k2 / (1.0 + k2).powf(2.5)
            }
        }
    }

    /// Spectrum at one streamwise wavenumber over a set of spanwise ones,
    /// using the flow's turbulence intensity and length scale.
    pub fn spectrum_over_ky(self, kx: f64, ky: &[f64], flow: &FlowConfiguration) -> Vec<f64> {
        let u_rms = flow.ux() * flow.turb_intensity();
        ky.iter()
            .map(|&k| self.spectrum(kx, k, u_rms, flow.length_scale()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ag_setup::FlowInputs;

    #[test]
    fn spectrum_vanishes_at_zero_wavenumber() {
        for model in [TurbulenceModel::VonKarman, TurbulenceModel::Liepmann] {
            assert_eq!(model.spectrum(0.0, 0.0, 1.5, 0.007), 0.0);
        }
    }

    #[test]
    fn spectrum_scales_with_velocity_variance() {
        for model in [TurbulenceModel::VonKarman, TurbulenceModel::Liepmann] {
            let a = model.spectrum(300.0, 40.0, 1.0, 0.007);
            let b = model.spectrum(300.0, 40.0, 3.0, 0.007);
            assert!((b / a - 9.0).abs() < 1e-12);
        }
    }

    #[test]
    fn spectrum_is_even_in_ky() {
        let m = TurbulenceModel::VonKarman;
        assert_eq!(m.spectrum(100.0, 25.0, 1.0, 0.01), m.spectrum(100.0, -25.0, 1.0, 0.01));
    }

    #[test]
    fn spectrum_over_ky_uses_flow_turbulence() {
        let flow = FlowConfiguration::new(FlowInputs::default()).unwrap();
        let ky = [-10.0, 0.0, 10.0];
        let phi = TurbulenceModel::VonKarman.spectrum_over_ky(500.0, &ky, &flow);
        assert_eq!(phi.len(), 3);
        let u_rms = flow.ux() * flow.turb_intensity();
        let direct = TurbulenceModel::VonKarman.spectrum(500.0, 0.0, u_rms, flow.length_scale());
        assert_eq!(phi[1], direct);
        assert_eq!(phi[0], phi[2]);
    }
}
