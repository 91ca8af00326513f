//! Simulation file loading and saving.

use std::path::Path;

use ag_setup::SimulationDef;

use crate::error::{AppError, AppResult};

/// Load and validate a simulation file; the format follows the extension
/// (`.yaml`/`.yml` or `.json`).
pub fn load_simulation(path: &Path) -> AppResult<SimulationDef> {
    let def = match extension(path) {
        Some("yaml" | "yml") => ag_setup::load_yaml(path)?,
        Some("json") => ag_setup::load_json(path)?,
        _ => {
            return Err(AppError::UnsupportedFile {
                path: path.to_path_buf(),
            });
        }
    };
    Ok(def)
}

/// Validate and save a simulation file in the format given by its extension.
pub fn save_simulation(path: &Path, def: &SimulationDef) -> AppResult<()> {
    match extension(path) {
        Some("yaml" | "yml") => ag_setup::save_yaml(path, def)?,
        Some("json") => ag_setup::save_json(path, def)?,
        _ => {
            return Err(AppError::UnsupportedFile {
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}
