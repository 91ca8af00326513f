//! Simulation definition validation.

use ag_core::ensure_positive;

use crate::flow::FlowConfiguration;
use crate::scan_grid::grid_points;
use crate::schema::{
    AirfoilDef, ChordSamplingDef, FrequenciesDef, GridDef, KySamplingDef, MicrophonesDef,
    SimulationDef,
};

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },

    #[error("Duplicate frequency: {frequency} Hz")]
    DuplicateFrequency { frequency: f64 },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

impl ValidationError {
    pub(crate) fn invalid(field: &str, value: impl ToString, reason: &str) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub fn validate_simulation(def: &SimulationDef) -> Result<(), ValidationError> {
    if def.version > LATEST_VERSION || def.version == 0 {
        return Err(ValidationError::UnsupportedVersion {
            version: def.version,
        });
    }

    FlowConfiguration::new(def.test_setup.to_inputs())?;
    validate_airfoil(&def.airfoil)?;
    validate_microphones(&def.microphones)?;
    validate_grid(&def.grid)?;
    validate_frequencies(&def.frequencies)?;
    validate_ky_sampling(&def.ky_sampling)?;
    Ok(())
}

fn validate_airfoil(airfoil: &AirfoilDef) -> Result<(), ValidationError> {
    positive("airfoil.b_m", airfoil.b_m)?;
    positive("airfoil.d_m", airfoil.d_m)?;
    if airfoil.nx == 0 {
        return Err(ValidationError::invalid("airfoil.nx", 0, "must be at least 1"));
    }
    if airfoil.ny == 0 {
        return Err(ValidationError::invalid("airfoil.ny", 0, "must be at least 1"));
    }
    if let ChordSamplingDef::Exponential { length } = airfoil.chord_sampling {
        positive("airfoil.chord_sampling.length", length)?;
    }
    Ok(())
}

fn validate_microphones(mics: &MicrophonesDef) -> Result<(), ValidationError> {
    match mics {
        MicrophonesDef::Inline {
            positions,
            standoff_m,
            ..
        } => {
            if positions.is_empty() {
                return Err(ValidationError::invalid(
                    "microphones.positions",
                    "[]",
                    "at least one microphone is required",
                ));
            }
            for (i, p) in positions.iter().enumerate() {
                if p.iter().any(|c| !c.is_finite()) {
                    return Err(ValidationError::invalid(
                        &format!("microphones.positions[{i}]"),
                        format!("{p:?}"),
                        "coordinates must be finite",
                    ));
                }
            }
            finite_opt("microphones.standoff_m", *standoff_m)
        }
        MicrophonesDef::XmlFile { path, standoff_m } => {
            if path.as_os_str().is_empty() {
                return Err(ValidationError::invalid(
                    "microphones.path",
                    "",
                    "must name an XML file",
                ));
            }
            finite_opt("microphones.standoff_m", *standoff_m)
        }
    }
}

fn validate_grid(grid: &GridDef) -> Result<(), ValidationError> {
    match grid {
        GridDef::Rect {
            scan_length_m,
            scan_spacing_m,
            z_m,
        } => {
            for (axis, (&len, &step)) in ["x", "y"]
                .iter()
                .zip(scan_length_m.iter().zip(scan_spacing_m.iter()))
            {
                if !len.is_finite() || len < 0.0 {
                    return Err(ValidationError::invalid(
                        &format!("grid.scan_length_m.{axis}"),
                        len,
                        "must be finite and non-negative",
                    ));
                }
                positive(&format!("grid.scan_spacing_m.{axis}"), step)?;
            }
            grid_points(
                ["grid.scan_spacing_m.x", "grid.scan_spacing_m.y"],
                *scan_length_m,
                *scan_spacing_m,
            )?;
            if !z_m.is_finite() {
                return Err(ValidationError::invalid("grid.z_m", z_m, "must be finite"));
            }
            Ok(())
        }
        GridDef::Unsupported => Err(ValidationError::Unsupported {
            feature: "grid type".to_string(),
            reason: "only rectangular ('rect') scan grids are supported".to_string(),
        }),
    }
}

fn validate_frequencies(freqs: &FrequenciesDef) -> Result<(), ValidationError> {
    let (field, values) = match freqs {
        FrequenciesDef::Hz { values } => ("frequencies.values", values),
        FrequenciesDef::Kc { values } => ("frequencies.kc", values),
    };
    if values.is_empty() {
        return Err(ValidationError::invalid(field, "[]", "at least one frequency is required"));
    }
    for &v in values {
        positive(field, v)?;
    }
    check_unique_frequencies(values)
}

/// Rejects lists holding the same value twice (exact float equality).
pub fn check_unique_frequencies(values: &[f64]) -> Result<(), ValidationError> {
    for (i, a) in values.iter().enumerate() {
        if values[..i].contains(a) {
            return Err(ValidationError::DuplicateFrequency { frequency: *a });
        }
    }
    Ok(())
}

fn validate_ky_sampling(ky: &KySamplingDef) -> Result<(), ValidationError> {
    positive("ky_sampling.max_factor", ky.max_factor)?;
    positive("ky_sampling.oversample", ky.oversample)?;
    Ok(())
}

pub(crate) fn positive(field: &str, v: f64) -> Result<(), ValidationError> {
    ensure_positive(v, "value")
        .map(|_| ())
        .map_err(|_| ValidationError::invalid(field, v, "must be finite and positive"))
}

fn finite_opt(field: &str, v: Option<f64>) -> Result<(), ValidationError> {
    match v {
        Some(z) if !z.is_finite() => Err(ValidationError::invalid(field, z, "must be finite")),
        _ => Ok(()),
    }
}
