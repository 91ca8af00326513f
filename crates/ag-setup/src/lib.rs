//! ag-setup: test setup, airfoil/array/grid geometry and the simulation file format.
//!
//! Runtime types ([`FlowConfiguration`], [`AirfoilGeometry`],
//! [`MicrophoneArray`], [`ScanGrid`]) are immutable once built and derive
//! every dependent quantity at construction. The serde schema in
//! [`schema`] is the on-disk description they are compiled from.

pub mod airfoil;
pub mod compile;
pub mod flow;
pub mod frequencies;
pub mod mic_array;
pub mod mic_xml;
pub mod scan_grid;
pub mod schema;
pub mod validate;

pub use airfoil::{AirfoilGeometry, ChordSampling};
pub use compile::{SimulationSetup, compile_simulation};
pub use flow::{Axis, FlowConfiguration, FlowInputs};
pub use frequencies::frequency_by_kc;
pub use mic_array::MicrophoneArray;
pub use scan_grid::ScanGrid;
pub use schema::*;
pub use validate::{LATEST_VERSION, ValidationError, validate_simulation};

use std::path::{Path, PathBuf};

pub type SetupResult<T> = Result<T, SetupError>;

#[derive(thiserror::Error, Debug)]
pub enum SetupError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Microphone file {path}: {reason}")]
    MicFile { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &Path) -> SetupResult<SimulationDef> {
    let content = std::fs::read_to_string(path)?;
    let def: SimulationDef = serde_yaml::from_str(&content)?;
    validate_simulation(&def)?;
    Ok(def)
}

pub fn save_yaml(path: &Path, def: &SimulationDef) -> SetupResult<()> {
    validate_simulation(def)?;
    let content = serde_yaml::to_string(def)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> SetupResult<SimulationDef> {
    let content = std::fs::read_to_string(path)?;
    let def: SimulationDef = serde_json::from_str(&content)?;
    validate_simulation(&def)?;
    Ok(def)
}

pub fn save_json(path: &Path, def: &SimulationDef) -> SetupResult<()> {
    validate_simulation(def)?;
    let content = serde_json::to_string_pretty(def)?;
    std::fs::write(path, content)?;
    Ok(())
}
