//! Flow conditions of the open-jet test setup.

use ag_core::units::{Density, Length, Pressure, Velocity, kgpm3, m, mps, pa};
use serde::{Deserialize, Serialize};

use crate::validate::{ValidationError, positive};

/// Cartesian axis, used for the mean flow and dipole directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    #[default]
    Z,
}

impl Axis {
    /// Component index into an `[x, y, z]` vector.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Raw physical inputs of a test setup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowInputs {
    /// Speed of sound
    pub c0: Velocity,
    /// Fluid density
    pub rho0: Density,
    /// Reference pressure for levels
    pub p_ref: Pressure,
    /// Mean flow velocity along +x
    pub ux: Velocity,
    /// Turbulence intensity (u_rms / U)
    pub turb_intensity: f64,
    /// Integral length scale of the turbulence
    pub length_scale: Length,
    /// Height of the shear layer plane
    pub z_sl: Length,
}

impl Default for FlowInputs {
    fn default() -> Self {
        Self {
            c0: mps(340.0),
            rho0: kgpm3(1.2),
            p_ref: pa(20e-6),
            ux: mps(60.0),
            turb_intensity: 0.025,
            length_scale: m(0.007),
            z_sl: m(-0.075),
        }
    }
}

/// Immutable flow configuration. Mach number and the Prandtl-Glauert
/// factor are derived once from the raw inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowConfiguration {
    inputs: FlowInputs,
    mach: f64,
    beta: f64,
    dipole_axis: Axis,
}

impl FlowConfiguration {
    pub fn new(inputs: FlowInputs) -> Result<Self, ValidationError> {
        positive("c0", inputs.c0.value)?;
        positive("rho0", inputs.rho0.value)?;
        positive("p_ref", inputs.p_ref.value)?;
        positive("Ux", inputs.ux.value)?;
        positive("length_scale", inputs.length_scale.value)?;
        if !inputs.turb_intensity.is_finite() || inputs.turb_intensity < 0.0 {
            return Err(ValidationError::invalid(
                "turb_intensity",
                inputs.turb_intensity,
                "must be finite and non-negative",
            ));
        }
        if !inputs.z_sl.value.is_finite() {
            return Err(ValidationError::invalid("z_sl", inputs.z_sl.value, "must be finite"));
        }

        let mach = inputs.ux.value / inputs.c0.value;
        if mach >= 1.0 {
            return Err(ValidationError::invalid(
                "Mach",
                mach,
                "flow must be subsonic",
            ));
        }
        let beta = (1.0 - mach * mach).sqrt();

        Ok(Self {
            inputs,
            mach,
            beta,
            dipole_axis: Axis::Z,
        })
    }

    pub fn with_dipole_axis(mut self, axis: Axis) -> Self {
        self.dipole_axis = axis;
        self
    }

    pub fn inputs(&self) -> &FlowInputs {
        &self.inputs
    }

    pub fn c0(&self) -> f64 {
        self.inputs.c0.value
    }

    pub fn rho0(&self) -> f64 {
        self.inputs.rho0.value
    }

    pub fn p_ref(&self) -> f64 {
        self.inputs.p_ref.value
    }

    pub fn ux(&self) -> f64 {
        self.inputs.ux.value
    }

    pub fn turb_intensity(&self) -> f64 {
        self.inputs.turb_intensity
    }

    pub fn length_scale(&self) -> f64 {
        self.inputs.length_scale.value
    }

    pub fn z_sl(&self) -> f64 {
        self.inputs.z_sl.value
    }

    pub fn mach(&self) -> f64 {
        self.mach
    }

    /// Prandtl-Glauert factor √(1 − M²).
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Flow direction and Mach number.
    pub fn flow_param(&self) -> (Axis, f64) {
        (Axis::X, self.mach)
    }

    pub fn dipole_axis(&self) -> Axis {
        self.dipole_axis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_quantities_follow_inputs() {
        let flow = FlowConfiguration::new(FlowInputs {
            ux: mps(68.0),
            ..FlowInputs::default()
        })
        .unwrap();
        assert!((flow.mach() - 0.2).abs() < 1e-15);
        assert!((flow.beta() - (1.0f64 - 0.04).sqrt()).abs() < 1e-15);
        assert_eq!(flow.flow_param(), (Axis::X, flow.mach()));
        assert_eq!(flow.dipole_axis(), Axis::Z);
    }

    #[test]
    fn zero_flow_is_rejected() {
        let err = FlowConfiguration::new(FlowInputs {
            ux: mps(0.0),
            ..FlowInputs::default()
        })
        .unwrap_err();
        assert!(format!("{err}").contains("Ux"));
    }

    #[test]
    fn negative_turbulence_intensity_is_rejected() {
        assert!(
            FlowConfiguration::new(FlowInputs {
                turb_intensity: -0.1,
                ..FlowInputs::default()
            })
            .is_err()
        );
    }
}
