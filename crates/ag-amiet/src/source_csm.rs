//! Airfoil surface-pressure cross-spectral matrix.

use ag_core::timing::Timer;
use ag_core::{C64, CMatrix, CoreError};
use ag_setup::{AirfoilGeometry, FlowConfiguration};
use nalgebra::DMatrix;
use tracing::warn;

use crate::error::{AmietError, AmietResult};
use crate::gust::pressure_jump;
use crate::turbulence::TurbulenceModel;
use crate::wavenumber::{FrequencyVars, SpanwiseWavenumbers};

/// Unweighted source CSM together with the panel-area weight it still has
/// to be multiplied by.
///
/// The raw `sqq` is a pressure-jump density; only
/// [`SourceCsm::area_weighted`] yields the matrix that may be propagated.
#[derive(Debug, Clone)]
pub struct SourceCsm {
    frequency: f64,
    sqq: CMatrix,
    weight: DMatrix<f64>,
}

/// Area-weighted source CSM, ready for propagation to the microphones.
#[derive(Debug, Clone)]
pub struct WeightedSourceCsm {
    frequency: f64,
    matrix: CMatrix,
}

impl SourceCsm {
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn sqq(&self) -> &CMatrix {
        &self.sqq
    }

    /// Outer product of panel areas, `dA_p · dA_q`.
    pub fn weight(&self) -> &DMatrix<f64> {
        &self.weight
    }

    pub fn num_points(&self) -> usize {
        self.sqq.nrows()
    }

    /// Element-wise product of `sqq` with the area weight.
    pub fn area_weighted(&self) -> WeightedSourceCsm {
        WeightedSourceCsm {
            frequency: self.frequency,
            matrix: self.sqq.zip_map(&self.weight, |s, w| s * w),
        }
    }
}

impl WeightedSourceCsm {
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn matrix(&self) -> &CMatrix {
        &self.matrix
    }

    pub fn num_points(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn into_matrix(self) -> CMatrix {
        self.matrix
    }
}

/// Source CSM from a precomputed turbulence spectrum `phi` sampled at the
/// spanwise wavenumbers `ky`.
///
/// `Sqq = U · Δky · Σ_ky δp δpᴴ`, one pressure-jump column per gust.
pub fn calc_airfoil_sqq(
    flow: &FlowConfiguration,
    airfoil: &AirfoilGeometry,
    fvars: &FrequencyVars,
    ky: &SpanwiseWavenumbers,
    phi: &[f64],
) -> AmietResult<SourceCsm> {
    if phi.len() != ky.len() {
        return Err(CoreError::Shape {
            what: "turbulence spectrum",
            expected: (ky.len(), 1),
            got: (phi.len(), 1),
        }
        .into());
    }
    if let Some(bad) = phi.iter().find(|v| !(v.is_finite() && **v >= 0.0)) {
        return Err(AmietError::InvalidArg {
            what: format!("turbulence spectrum value {bad} is not a finite non-negative number"),
        });
    }

    let points = airfoil.points();
    let (rho0, mach, b) = (flow.rho0(), flow.mach(), airfoil.b());
    let w0: Vec<f64> = phi.iter().map(|v| v.sqrt()).collect();

    let jumps = CMatrix::from_fn(points.len(), ky.len(), |p, k| {
        let pt = &points[p];
        pressure_jump(rho0, w0[k], pt.x, pt.y, fvars.kx, ky.values()[k], mach, b)
    });
    let sqq = (&jumps * jumps.adjoint()) * C64::new(flow.ux() * ky.dky(), 0.0);

    if sqq.iter().any(|z| !(z.re.is_finite() && z.im.is_finite())) {
        return Err(AmietError::NonFinite {
            what: "source CSM",
            frequency: fvars.frequency,
        });
    }

    let areas = airfoil.panel_areas();
    let weight = DMatrix::from_fn(areas.len(), areas.len(), |p, q| areas[p] * areas[q]);

    Ok(SourceCsm {
        frequency: fvars.frequency,
        sqq,
        weight,
    })
}

/// Source CSM for one frequency: samples the turbulence spectrum at the
/// convective wavenumber over `ky` and evaluates [`calc_airfoil_sqq`].
///
/// An aliasing spanwise sampling is reported but not rejected.
pub fn source_csm(
    flow: &FlowConfiguration,
    airfoil: &AirfoilGeometry,
    fvars: &FrequencyVars,
    ky: &SpanwiseWavenumbers,
    model: TurbulenceModel,
) -> AmietResult<SourceCsm> {
    let timer = Timer::start("source_csm");
    if let Err(err) = ky.check_aliasing(airfoil.dy()) {
        warn!(frequency = fvars.frequency, "{err}");
    }
    let phi = model.spectrum_over_ky(fvars.kx, ky.values(), flow);
    let csm = calc_airfoil_sqq(flow, airfoil, fvars, ky, &phi)?;
    timer.stop_and_log();
    Ok(csm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wavenumber::KySampling;
    use ag_core::{hermitian_defect, m, mps};
    use ag_setup::FlowInputs;

    fn setup() -> (FlowConfiguration, AirfoilGeometry) {
        let flow = FlowConfiguration::new(FlowInputs {
            ux: mps(68.0),
            ..FlowInputs::default()
        })
        .unwrap();
        let airfoil = AirfoilGeometry::new(m(0.075), m(0.225), 6, 7).unwrap();
        (flow, airfoil)
    }

    fn csm_at(frequency: f64) -> SourceCsm {
        let (flow, airfoil) = setup();
        let fv = FrequencyVars::new(frequency, &flow).unwrap();
        let ky = KySampling::default().sample(&airfoil, &fv);
        source_csm(&flow, &airfoil, &fv, &ky, TurbulenceModel::VonKarman).unwrap()
    }

    #[test]
    fn sqq_is_square_hermitian_with_positive_diagonal() {
        let csm = csm_at(1000.0);
        assert_eq!(csm.num_points(), 42);
        assert_eq!(csm.sqq().shape(), (42, 42));
        assert!(hermitian_defect(csm.sqq()) < 1e-12);
        for p in 0..42 {
            let d = csm.sqq()[(p, p)];
            assert!(d.re > 0.0);
            assert!(d.im.abs() <= 1e-12 * d.re);
        }
    }

    #[test]
    fn area_weight_changes_absolute_level() {
        let (_, airfoil) = setup();
        let csm = csm_at(1000.0);
        let weighted = csm.area_weighted();
        let areas = airfoil.panel_areas();

        let raw = csm.sqq()[(3, 3)].re;
        let scaled = weighted.matrix()[(3, 3)].re;
        assert!((scaled - raw * areas[3] * areas[3]).abs() <= 1e-12 * raw.abs());
        // panel areas are far below 1 m², so forgetting the weight is a
        // gross level error rather than a rounding difference
        assert!(raw / scaled > 1e4);
        assert!(hermitian_defect(weighted.matrix()) < 1e-12);
    }

    #[test]
    fn weight_is_outer_product_of_panel_areas() {
        let (_, airfoil) = setup();
        let csm = csm_at(500.0);
        let areas = airfoil.panel_areas();
        let w = csm.weight();
        assert_eq!(w.shape(), (areas.len(), areas.len()));
        assert_eq!(w[(1, 4)], areas[1] * areas[4]);
        assert_eq!(w[(4, 1)], w[(1, 4)]);
    }

    #[test]
    fn spectrum_length_must_match_wavenumbers() {
        let (flow, airfoil) = setup();
        let fv = FrequencyVars::new(1000.0, &flow).unwrap();
        let ky = KySampling::default().sample(&airfoil, &fv);
        let phi = vec![1.0; ky.len() + 1];
        let err = calc_airfoil_sqq(&flow, &airfoil, &fv, &ky, &phi).unwrap_err();
        assert!(matches!(err, AmietError::Core(CoreError::Shape { .. })));
    }

    #[test]
    fn negative_spectrum_rejected() {
        let (flow, airfoil) = setup();
        let fv = FrequencyVars::new(1000.0, &flow).unwrap();
        let ky = KySampling::default().sample(&airfoil, &fv);
        let mut phi = vec![1e-6; ky.len()];
        phi[0] = -1.0;
        assert!(matches!(
            calc_airfoil_sqq(&flow, &airfoil, &fv, &ky, &phi),
            Err(AmietError::InvalidArg { .. })
        ));
    }

    #[test]
    fn higher_turbulence_intensity_raises_level() {
        let (_, airfoil) = setup();
        let base = FlowConfiguration::new(FlowInputs::default()).unwrap();
        let strong = FlowConfiguration::new(FlowInputs {
            turb_intensity: 0.05,
            ..FlowInputs::default()
        })
        .unwrap();
        let level = |flow: &FlowConfiguration| {
            let fv = FrequencyVars::new(1000.0, flow).unwrap();
            let ky = KySampling::default().sample(&airfoil, &fv);
            source_csm(flow, &airfoil, &fv, &ky, TurbulenceModel::VonKarman)
                .unwrap()
                .sqq()[(0, 0)]
                .re
        };
        let ratio = level(&strong) / level(&base);
        assert!((ratio - 4.0).abs() < 1e-9);
    }
}
