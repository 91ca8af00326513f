//! Microphone array geometry.

use ag_core::units::Length;
use nalgebra::Vector3;

use crate::validate::ValidationError;

/// Ordered receiver positions.
///
/// The standoff is the array plane height. When overridden, the same z is
/// written into every microphone; x and y are left untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct MicrophoneArray {
    name: String,
    positions: Vec<Vector3<f64>>,
    standoff: f64,
}

impl MicrophoneArray {
    pub fn new(
        name: impl Into<String>,
        positions: Vec<Vector3<f64>>,
    ) -> Result<Self, ValidationError> {
        let Some(first) = positions.first() else {
            return Err(ValidationError::invalid(
                "mic_array",
                "[]",
                "at least one microphone is required",
            ));
        };
        if let Some(i) = positions
            .iter()
            .position(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
        {
            return Err(ValidationError::invalid(
                &format!("mic_array[{i}]"),
                format!("{:?}", positions[i]),
                "coordinates must be finite",
            ));
        }
        let standoff = first.z;
        Ok(Self {
            name: name.into(),
            positions,
            standoff,
        })
    }

    /// Builds an array from a `[x; y; z]` row layout (3 × M).
    pub fn from_rows(name: impl Into<String>, rows: &[Vec<f64>; 3]) -> Result<Self, ValidationError> {
        let n = rows[0].len();
        if rows[1].len() != n || rows[2].len() != n {
            return Err(ValidationError::invalid(
                "mic_array",
                format!("{}/{}/{}", rows[0].len(), rows[1].len(), rows[2].len()),
                "x, y and z rows must have the same length",
            ));
        }
        let positions = (0..n)
            .map(|i| Vector3::new(rows[0][i], rows[1][i], rows[2][i]))
            .collect();
        Self::new(name, positions)
    }

    /// Places every microphone in the plane `z = standoff`.
    pub fn with_standoff(mut self, standoff: Length) -> Self {
        let z = standoff.value;
        for p in &mut self.positions {
            p.z = z;
        }
        self.standoff = z;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_mics(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> &[Vector3<f64>] {
        &self.positions
    }

    pub fn standoff(&self) -> f64 {
        self.standoff
    }

    /// Positions as `[x; y; z]` rows (3 × M).
    pub fn to_rows(&self) -> [Vec<f64>; 3] {
        [
            self.positions.iter().map(|p| p.x).collect(),
            self.positions.iter().map(|p| p.y).collect(),
            self.positions.iter().map(|p| p.z).collect(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ag_core::units::m;

    fn square() -> MicrophoneArray {
        MicrophoneArray::new(
            "square",
            vec![
                Vector3::new(-0.5, -0.5, -1.0),
                Vector3::new(0.5, -0.5, -1.0),
                Vector3::new(0.5, 0.5, -1.2),
                Vector3::new(-0.5, 0.5, -1.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn standoff_defaults_to_first_microphone() {
        assert_eq!(square().standoff(), -1.0);
    }

    #[test]
    fn standoff_override_replaces_only_z() {
        let original = square();
        let moved = original.clone().with_standoff(m(-0.49));
        assert_eq!(moved.standoff(), -0.49);
        for (a, b) in original.positions().iter().zip(moved.positions()) {
            assert_eq!((a.x, a.y), (b.x, b.y));
            assert_eq!(b.z, -0.49);
        }
    }

    #[test]
    fn rows_roundtrip() {
        let array = square();
        let rows = array.to_rows();
        let back = MicrophoneArray::from_rows("square", &rows).unwrap();
        assert_eq!(array, back);
    }

    #[test]
    fn empty_array_is_rejected() {
        assert!(MicrophoneArray::new("none", vec![]).is_err());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let rows = [vec![0.0, 1.0], vec![0.0], vec![-1.0, -1.0]];
        assert!(MicrophoneArray::from_rows("ragged", &rows).is_err());
    }
}
