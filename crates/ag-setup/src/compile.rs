//! Compiles a validated [`SimulationDef`] into runtime geometry.

use std::path::Path;

use ag_core::units::m;
use nalgebra::Vector3;

use crate::airfoil::{AirfoilGeometry, ChordSampling};
use crate::flow::FlowConfiguration;
use crate::frequencies::resolve_frequencies;
use crate::mic_array::MicrophoneArray;
use crate::mic_xml::load_mic_xml;
use crate::scan_grid::ScanGrid;
use crate::schema::{
    ChordSamplingDef, GridDef, KySamplingDef, MicrophonesDef, SimulationDef, TurbulenceModelDef,
};
use crate::validate::{ValidationError, check_unique_frequencies, validate_simulation};
use crate::SetupResult;

/// Everything the forward simulation needs, in runtime form.
#[derive(Debug, Clone)]
pub struct SimulationSetup {
    pub name: String,
    pub flow: FlowConfiguration,
    pub airfoil: AirfoilGeometry,
    pub microphones: MicrophoneArray,
    pub grid: ScanGrid,
    /// Analysis frequencies in Hz, in processing order.
    pub frequencies: Vec<f64>,
    pub turbulence: TurbulenceModelDef,
    pub ky_sampling: KySamplingDef,
}

/// Builds the runtime setup. Relative microphone file paths resolve
/// against `base_dir`.
pub fn compile_simulation(def: &SimulationDef, base_dir: &Path) -> SetupResult<SimulationSetup> {
    validate_simulation(def)?;

    let flow = FlowConfiguration::new(def.test_setup.to_inputs())?
        .with_dipole_axis(def.test_setup.dipole_axis);

    let sampling = match def.airfoil.chord_sampling {
        ChordSamplingDef::Uniform => ChordSampling::Uniform,
        ChordSamplingDef::Exponential { length } => ChordSampling::Exponential { length },
    };
    let airfoil = AirfoilGeometry::with_sampling(
        m(def.airfoil.b_m),
        m(def.airfoil.d_m),
        def.airfoil.nx,
        def.airfoil.ny,
        sampling,
    )?;

    let microphones = match &def.microphones {
        MicrophonesDef::Inline {
            name,
            positions,
            standoff_m,
        } => {
            let points = positions
                .iter()
                .map(|p| Vector3::new(p[0], p[1], p[2]))
                .collect();
            with_optional_standoff(MicrophoneArray::new(name.clone(), points)?, *standoff_m)
        }
        MicrophonesDef::XmlFile { path, standoff_m } => {
            let resolved = if path.is_absolute() {
                path.clone()
            } else {
                base_dir.join(path)
            };
            with_optional_standoff(load_mic_xml(&resolved)?, *standoff_m)
        }
    };

    let grid = match &def.grid {
        GridDef::Rect {
            scan_length_m,
            scan_spacing_m,
            z_m,
        } => ScanGrid::new(
            [m(scan_length_m[0]), m(scan_length_m[1])],
            [m(scan_spacing_m[0]), m(scan_spacing_m[1])],
            m(*z_m),
        )?,
        GridDef::Unsupported => {
            return Err(ValidationError::Unsupported {
                feature: "grid type".to_string(),
                reason: "only rectangular ('rect') scan grids are supported".to_string(),
            }
            .into());
        }
    };

    let frequencies = resolve_frequencies(&def.frequencies, airfoil.b(), flow.c0());
    // kc rounding can collapse neighbouring values
    check_unique_frequencies(&frequencies)?;

    tracing::debug!(
        name = %def.name,
        sources = airfoil.num_points(),
        mics = microphones.num_mics(),
        scan_points = grid.len(),
        frequencies = frequencies.len(),
        "compiled simulation setup"
    );

    Ok(SimulationSetup {
        name: def.name.clone(),
        flow,
        airfoil,
        microphones,
        grid,
        frequencies,
        turbulence: def.turbulence.model,
        ky_sampling: def.ky_sampling,
    })
}

fn with_optional_standoff(array: MicrophoneArray, standoff_m: Option<f64>) -> MicrophoneArray {
    match standoff_m {
        Some(z) => array.with_standoff(m(z)),
        None => array,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FrequenciesDef;

    #[test]
    fn example_compiles() {
        let setup = compile_simulation(&SimulationDef::example(), Path::new(".")).unwrap();
        assert_eq!(setup.airfoil.num_points(), 25);
        assert_eq!(setup.microphones.num_mics(), 4);
        assert_eq!(setup.grid.len(), 25);
        assert_eq!(setup.frequencies, vec![1000.0]);
        assert!((setup.flow.mach() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn inline_standoff_is_applied() {
        let mut def = SimulationDef::example();
        if let MicrophonesDef::Inline { standoff_m, .. } = &mut def.microphones {
            *standoff_m = Some(-0.49);
        }
        let setup = compile_simulation(&def, Path::new(".")).unwrap();
        assert!(setup.microphones.positions().iter().all(|p| p.z == -0.49));
    }

    #[test]
    fn kc_frequencies_are_converted() {
        let mut def = SimulationDef::example();
        def.frequencies = FrequenciesDef::Kc {
            values: vec![5.0, 10.0],
        };
        let setup = compile_simulation(&def, Path::new(".")).unwrap();
        assert_eq!(setup.frequencies.len(), 2);
        assert!((setup.frequencies[1] / setup.frequencies[0] - 2.0).abs() < 1e-3);
    }
}
