//! Simulation file schema definitions.

use std::path::PathBuf;

use ag_core::units::{kgpm3, m, mps, pa};
use serde::{Deserialize, Serialize};

use crate::flow::{Axis, FlowInputs};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationDef {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub test_setup: TestSetupDef,
    #[serde(default)]
    pub airfoil: AirfoilDef,
    pub microphones: MicrophonesDef,
    pub grid: GridDef,
    pub frequencies: FrequenciesDef,
    #[serde(default)]
    pub turbulence: TurbulenceDef,
    #[serde(default)]
    pub ky_sampling: KySamplingDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestSetupDef {
    pub c0_mps: f64,
    pub rho0_kg_m3: f64,
    pub p_ref_pa: f64,
    pub ux_mps: f64,
    pub turb_intensity: f64,
    pub length_scale_m: f64,
    pub z_sl_m: f64,
    #[serde(default)]
    pub dipole_axis: Axis,
}

impl Default for TestSetupDef {
    fn default() -> Self {
        let d = FlowInputs::default();
        Self {
            c0_mps: d.c0.value,
            rho0_kg_m3: d.rho0.value,
            p_ref_pa: d.p_ref.value,
            ux_mps: d.ux.value,
            turb_intensity: d.turb_intensity,
            length_scale_m: d.length_scale.value,
            z_sl_m: d.z_sl.value,
            dipole_axis: Axis::Z,
        }
    }
}

impl TestSetupDef {
    pub fn to_inputs(&self) -> FlowInputs {
        FlowInputs {
            c0: mps(self.c0_mps),
            rho0: kgpm3(self.rho0_kg_m3),
            p_ref: pa(self.p_ref_pa),
            ux: mps(self.ux_mps),
            turb_intensity: self.turb_intensity,
            length_scale: m(self.length_scale_m),
            z_sl: m(self.z_sl_m),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AirfoilDef {
    pub b_m: f64,
    pub d_m: f64,
    pub nx: usize,
    pub ny: usize,
    #[serde(default)]
    pub chord_sampling: ChordSamplingDef,
}

impl Default for AirfoilDef {
    fn default() -> Self {
        Self {
            b_m: 0.075,
            d_m: 0.225,
            nx: 100,
            ny: 101,
            chord_sampling: ChordSamplingDef::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChordSamplingDef {
    Uniform,
    Exponential { length: f64 },
}

impl Default for ChordSamplingDef {
    fn default() -> Self {
        Self::Exponential { length: 2.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MicrophonesDef {
    Inline {
        name: String,
        positions: Vec<[f64; 3]>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        standoff_m: Option<f64>,
    },
    /// Acoular-style `<MicArray>` XML file, relative to the simulation file.
    XmlFile {
        path: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        standoff_m: Option<f64>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GridDef {
    Rect {
        scan_length_m: [f64; 2],
        scan_spacing_m: [f64; 2],
        #[serde(default)]
        z_m: f64,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FrequenciesDef {
    Hz { values: Vec<f64> },
    /// Chordwise normalised frequencies k0·c, converted with the airfoil chord.
    Kc { values: Vec<f64> },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct TurbulenceDef {
    #[serde(default)]
    pub model: TurbulenceModelDef,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TurbulenceModelDef {
    #[default]
    VonKarman,
    Liepmann,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct KySamplingDef {
    #[serde(default = "default_ky_max_factor")]
    pub max_factor: f64,
    #[serde(default = "default_ky_oversample")]
    pub oversample: f64,
}

fn default_ky_max_factor() -> f64 {
    1.5
}

fn default_ky_oversample() -> f64 {
    4.0
}

impl Default for KySamplingDef {
    fn default() -> Self {
        Self {
            max_factor: default_ky_max_factor(),
            oversample: default_ky_oversample(),
        }
    }
}

impl SimulationDef {
    /// Small but complete definition: coarse airfoil, four-microphone square
    /// array one metre below the airfoil, Mach 0.2 flow.
    pub fn example() -> Self {
        Self {
            version: crate::validate::LATEST_VERSION,
            name: "example".to_string(),
            test_setup: TestSetupDef {
                ux_mps: 68.0,
                ..TestSetupDef::default()
            },
            airfoil: AirfoilDef {
                nx: 5,
                ny: 5,
                ..AirfoilDef::default()
            },
            microphones: MicrophonesDef::Inline {
                name: "square".to_string(),
                positions: vec![
                    [-0.5, -0.5, -1.0],
                    [0.5, -0.5, -1.0],
                    [0.5, 0.5, -1.0],
                    [-0.5, 0.5, -1.0],
                ],
                standoff_m: None,
            },
            grid: GridDef::Rect {
                scan_length_m: [0.2, 0.2],
                scan_spacing_m: [0.05, 0.05],
                z_m: 0.0,
            },
            frequencies: FrequenciesDef::Hz {
                values: vec![1000.0],
            },
            turbulence: TurbulenceDef::default(),
            ky_sampling: KySamplingDef::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_type_tag_parses() {
        let yaml = "type: rect\nscan_length_m: [0.65, 0.65]\nscan_spacing_m: [0.01, 0.01]\n";
        let grid: GridDef = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(grid, GridDef::Rect { z_m, .. } if z_m == 0.0));
    }

    #[test]
    fn unknown_grid_type_maps_to_unsupported() {
        let yaml = "type: polar\nradius: 1.0\n";
        let grid: GridDef = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(grid, GridDef::Unsupported);
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let yaml = r#"
version: 1
name: minimal
microphones:
  type: inline
  name: single
  positions: [[0.0, 0.0, -1.0]]
grid:
  type: rect
  scan_length_m: [0.1, 0.1]
  scan_spacing_m: [0.05, 0.05]
frequencies:
  type: kc
  values: [5.0, 10.0]
"#;
        let def: SimulationDef = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.test_setup, TestSetupDef::default());
        assert_eq!(def.airfoil, AirfoilDef::default());
        assert_eq!(def.turbulence.model, TurbulenceModelDef::VonKarman);
        assert_eq!(def.ky_sampling, KySamplingDef::default());
    }
}
