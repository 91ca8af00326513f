//! Rectangular scan grid for steering-vector synthesis.

use ag_core::linspace;
use ag_core::units::Length;
use nalgebra::Vector3;

use crate::validate::{ValidationError, positive};

/// Largest number of grid nodes accepted along one axis.
pub const MAX_POINTS_PER_AXIS: usize = 10_000;

/// Largest total number of grid nodes.
pub const MAX_SCAN_POINTS: usize = 1_000_000;

const SPACING_RTOL: f64 = 1e-6;

/// Node count along one axis. The spacing must divide the length into a
/// whole number of cells.
fn axis_points(field: &str, length: f64, spacing: f64) -> Result<usize, ValidationError> {
    let cells = length / spacing;
    if !cells.is_finite() || cells >= MAX_POINTS_PER_AXIS as f64 {
        return Err(ValidationError::invalid(
            field,
            spacing,
            &format!("gives more than {MAX_POINTS_PER_AXIS} points along the axis"),
        ));
    }
    let whole = cells.round();
    if (cells - whole).abs() > SPACING_RTOL * whole.max(1.0) {
        return Err(ValidationError::invalid(
            field,
            spacing,
            &format!("must divide the scan length {length} into whole cells"),
        ));
    }
    Ok(whole as usize + 1)
}

/// Total node count of a `length` × `spacing` grid, bounded by
/// [`MAX_SCAN_POINTS`].
pub(crate) fn grid_points(
    fields: [&str; 2],
    length: [f64; 2],
    spacing: [f64; 2],
) -> Result<(usize, usize), ValidationError> {
    let nx = axis_points(fields[0], length[0], spacing[0])?;
    let ny = axis_points(fields[1], length[1], spacing[1])?;
    if nx * ny > MAX_SCAN_POINTS {
        return Err(ValidationError::invalid(
            fields[0],
            nx * ny,
            &format!("scan grid exceeds {MAX_SCAN_POINTS} points"),
        ));
    }
    Ok((nx, ny))
}

/// Regular grid of candidate source points in the plane `z`, centred on the
/// origin, endpoints included on both axes.
///
/// Points are row-major: index `iy * nx + ix`. Steering-vector columns use
/// the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanGrid {
    scan_length: [f64; 2],
    scan_spacing: [f64; 2],
    z: f64,
    nx: usize,
    ny: usize,
    points: Vec<Vector3<f64>>,
}

impl ScanGrid {
    pub fn new(
        scan_length: [Length; 2],
        scan_spacing: [Length; 2],
        z: Length,
    ) -> Result<Self, ValidationError> {
        let scan_length = [scan_length[0].value, scan_length[1].value];
        let scan_spacing = [scan_spacing[0].value, scan_spacing[1].value];
        for (axis, len) in ["x", "y"].iter().zip(scan_length) {
            if !len.is_finite() || len < 0.0 {
                return Err(ValidationError::invalid(
                    &format!("scan_length.{axis}"),
                    len,
                    "must be finite and non-negative",
                ));
            }
        }
        positive("scan_spacing.x", scan_spacing[0])?;
        positive("scan_spacing.y", scan_spacing[1])?;
        if !z.value.is_finite() {
            return Err(ValidationError::invalid("z", z.value, "must be finite"));
        }

        let (nx, ny) = grid_points(
            ["scan_spacing.x", "scan_spacing.y"],
            scan_length,
            scan_spacing,
        )?;
        let xs = linspace(-scan_length[0] / 2.0, scan_length[0] / 2.0, nx);
        let ys = linspace(-scan_length[1] / 2.0, scan_length[1] / 2.0, ny);
        let z = z.value;
        let points = ys
            .iter()
            .flat_map(|&y| xs.iter().map(move |&x| Vector3::new(x, y, z)))
            .collect();

        Ok(Self {
            scan_length,
            scan_spacing,
            z,
            nx,
            ny,
            points,
        })
    }

    pub fn scan_length(&self) -> [f64; 2] {
        self.scan_length
    }

    pub fn scan_spacing(&self) -> [f64; 2] {
        self.scan_spacing
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Vector3<f64>] {
        &self.points
    }

    /// Flat index of grid node `(ix, iy)`.
    pub fn index(&self, ix: usize, iy: usize) -> usize {
        iy * self.nx + ix
    }

    pub fn x_min(&self) -> f64 {
        -self.scan_length[0] / 2.0
    }

    pub fn x_max(&self) -> f64 {
        self.scan_length[0] / 2.0
    }

    pub fn y_min(&self) -> f64 {
        -self.scan_length[1] / 2.0
    }

    pub fn y_max(&self) -> f64 {
        self.scan_length[1] / 2.0
    }

    /// Common spacing of both axes, or 0 when the axes differ.
    pub fn increment(&self) -> f64 {
        if self.scan_spacing[0] == self.scan_spacing[1] {
            self.scan_spacing[0]
        } else {
            0.0
        }
    }
}
