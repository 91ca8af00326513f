//! Groups of a run file.

use ag_core::units::{kgpm3, m, mps, pa};
use ag_setup::{
    AirfoilGeometry, Axis, ChordSampling, ChordSamplingDef, FlowConfiguration, FlowInputs,
    MicrophoneArray, ScanGrid,
};
use serde::{Deserialize, Serialize};

use crate::ResultsResult;
use crate::array::ComplexArray;

pub const FORMAT_NAME: &str = "augen-run";
pub const FORMAT_VERSION: u32 = 1;

/// One line of a run file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "group")]
pub enum Entry {
    #[serde(rename = "Header")]
    Header(Header),
    #[serde(rename = "TestSetup")]
    TestSetup(TestSetupGroup),
    #[serde(rename = "AirfoilGeom")]
    AirfoilGeom(AirfoilGroup),
    #[serde(rename = "Grid info")]
    GridInfo(GridInfoGroup),
    #[serde(rename = "Microphone array")]
    MicrophoneArray(MicArrayGroup),
    #[serde(rename = "Run data")]
    RunData(RunDataGroup),
    #[serde(rename = "Frequency data")]
    FrequencyData(FrequencyDataGroup),
    #[serde(rename = "Frequency data/freq")]
    FrequencyRecord(FrequencyRecordGroup),
    #[serde(rename = "Run data/end")]
    RunEnd(RunEndGroup),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub format: String,
    pub version: u32,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            format: FORMAT_NAME.to_string(),
            version: FORMAT_VERSION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSetupGroup {
    pub c0: f64,
    pub rho0: f64,
    pub p_ref: f64,
    #[serde(rename = "Ux")]
    pub ux: f64,
    pub turb_intensity: f64,
    pub length_scale: f64,
    pub z_sl: f64,
    #[serde(default)]
    pub dipole_axis: Axis,
}

impl TestSetupGroup {
    pub fn from_flow(flow: &FlowConfiguration) -> Self {
        Self {
            c0: flow.c0(),
            rho0: flow.rho0(),
            p_ref: flow.p_ref(),
            ux: flow.ux(),
            turb_intensity: flow.turb_intensity(),
            length_scale: flow.length_scale(),
            z_sl: flow.z_sl(),
            dipole_axis: flow.dipole_axis(),
        }
    }

    pub fn to_flow(&self) -> ResultsResult<FlowConfiguration> {
        let flow = FlowConfiguration::new(FlowInputs {
            c0: mps(self.c0),
            rho0: kgpm3(self.rho0),
            p_ref: pa(self.p_ref),
            ux: mps(self.ux),
            turb_intensity: self.turb_intensity,
            length_scale: m(self.length_scale),
            z_sl: m(self.z_sl),
        })?;
        Ok(flow.with_dipole_axis(self.dipole_axis))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirfoilGroup {
    pub b: f64,
    pub d: f64,
    #[serde(rename = "Nx")]
    pub nx: usize,
    #[serde(rename = "Ny")]
    pub ny: usize,
    #[serde(default)]
    pub chord_sampling: ChordSamplingDef,
}

impl AirfoilGroup {
    pub fn from_airfoil(airfoil: &AirfoilGeometry) -> Self {
        let chord_sampling = match airfoil.sampling() {
            ChordSampling::Uniform => ChordSamplingDef::Uniform,
            ChordSampling::Exponential { length } => ChordSamplingDef::Exponential { length },
        };
        Self {
            b: airfoil.b(),
            d: airfoil.d(),
            nx: airfoil.nx(),
            ny: airfoil.ny(),
            chord_sampling,
        }
    }

    pub fn to_airfoil(&self) -> ResultsResult<AirfoilGeometry> {
        let sampling = match self.chord_sampling {
            ChordSamplingDef::Uniform => ChordSampling::Uniform,
            ChordSamplingDef::Exponential { length } => ChordSampling::Exponential { length },
        };
        Ok(AirfoilGeometry::with_sampling(
            m(self.b),
            m(self.d),
            self.nx,
            self.ny,
            sampling,
        )?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridInfoGroup {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    /// Height of the scan plane
    pub z: f64,
    /// Common axis spacing, 0 when the axes differ
    pub increment: f64,
    pub scan_length: [f64; 2],
    pub scan_spacing: [f64; 2],
}

impl GridInfoGroup {
    pub fn from_grid(grid: &ScanGrid) -> Self {
        Self {
            x_min: grid.x_min(),
            x_max: grid.x_max(),
            y_min: grid.y_min(),
            y_max: grid.y_max(),
            z: grid.z(),
            increment: grid.increment(),
            scan_length: grid.scan_length(),
            scan_spacing: grid.scan_spacing(),
        }
    }

    pub fn to_grid(&self) -> ResultsResult<ScanGrid> {
        Ok(ScanGrid::new(
            [m(self.scan_length[0]), m(self.scan_length[1])],
            [m(self.scan_spacing[0]), m(self.scan_spacing[1])],
            m(self.z),
        )?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicArrayGroup {
    pub file_name: String,
    pub mics_number: usize,
    /// `[x; y; z]` rows
    pub mic_array: [Vec<f64>; 3],
}

impl MicArrayGroup {
    pub fn from_array(array: &MicrophoneArray) -> Self {
        Self {
            file_name: array.name().to_string(),
            mics_number: array.num_mics(),
            mic_array: array.to_rows(),
        }
    }

    pub fn to_array(&self) -> ResultsResult<MicrophoneArray> {
        Ok(MicrophoneArray::from_rows(
            self.file_name.clone(),
            &self.mic_array,
        )?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunDataGroup {
    /// `dd/mm/YYYY`
    pub date: String,
    /// `HH:MM:SS`
    pub start_time: String,
    /// SHA-256 of the simulation definition and solver version
    #[serde(default)]
    pub fingerprint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyDataGroup {
    /// Planned analysis frequencies, in processing order
    pub frequencies: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRecordGroup {
    pub index: usize,
    pub frequency: f64,
    /// `[M, N]`
    pub steering_vector: ComplexArray,
    /// `[2, M, M]`, bin 0 all zeros
    #[serde(rename = "CSM")]
    pub csm: ComplexArray,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEndGroup {
    /// `HH:MM:SS`
    pub end_time: String,
}

/// Run-level geometry and flow groups, written once before any frequency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfiguration {
    pub test_setup: TestSetupGroup,
    pub airfoil: AirfoilGroup,
    pub grid: GridInfoGroup,
    pub mic_array: MicArrayGroup,
}

impl RunConfiguration {
    pub fn new(
        flow: &FlowConfiguration,
        airfoil: &AirfoilGeometry,
        mics: &MicrophoneArray,
        grid: &ScanGrid,
    ) -> Self {
        Self {
            test_setup: TestSetupGroup::from_flow(flow),
            airfoil: AirfoilGroup::from_airfoil(airfoil),
            grid: GridInfoGroup::from_grid(grid),
            mic_array: MicArrayGroup::from_array(mics),
        }
    }

    /// Runtime geometry rebuilt from the stored groups.
    pub fn to_runtime(
        &self,
    ) -> ResultsResult<(FlowConfiguration, AirfoilGeometry, MicrophoneArray, ScanGrid)> {
        Ok((
            self.test_setup.to_flow()?,
            self.airfoil.to_airfoil()?,
            self.mic_array.to_array()?,
            self.grid.to_grid()?,
        ))
    }

    pub fn num_mics(&self) -> usize {
        self.mic_array.mics_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_tags_match_container_layout() {
        let entry = Entry::RunEnd(RunEndGroup {
            end_time: "12:00:00".to_string(),
        });
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"group":"Run data/end","end_time":"12:00:00"}"#);

        let setup = Entry::TestSetup(TestSetupGroup::from_flow(
            &FlowConfiguration::new(FlowInputs::default()).unwrap(),
        ));
        let json = serde_json::to_string(&setup).unwrap();
        assert!(json.starts_with(r#"{"group":"TestSetup","c0":340.0"#));
        assert!(json.contains(r#""Ux":60.0"#));
    }

    #[test]
    fn configuration_rebuilds_runtime_types() {
        let flow = FlowConfiguration::new(FlowInputs::default()).unwrap();
        let airfoil = AirfoilGeometry::new(m(0.075), m(0.225), 4, 3).unwrap();
        let mics = MicrophoneArray::from_rows(
            "pair",
            &[vec![0.0, 0.1], vec![0.0, 0.0], vec![-1.0, -1.0]],
        )
        .unwrap();
        let grid = ScanGrid::new([m(0.2), m(0.1)], [m(0.05), m(0.05)], m(0.0)).unwrap();

        let config = RunConfiguration::new(&flow, &airfoil, &mics, &grid);
        assert_eq!(config.num_mics(), 2);
        let (flow2, airfoil2, mics2, grid2) = config.to_runtime().unwrap();
        assert_eq!(flow2.ux(), flow.ux());
        assert_eq!(airfoil2, airfoil);
        assert_eq!(mics2.positions(), mics.positions());
        assert_eq!(grid2.len(), grid.len());
    }
}
