//! Flat-plate airfoil planform and its surface discretisation.

use ag_core::linspace;
use ag_core::units::Length;
use nalgebra::Vector3;

use crate::validate::{ValidationError, positive};

/// Chordwise panel distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChordSampling {
    Uniform,
    /// Exponentially stretched panels, finest at the leading edge.
    /// `length` is the exponent range; larger values cluster harder.
    Exponential { length: f64 },
}

impl Default for ChordSampling {
    fn default() -> Self {
        Self::Exponential { length: 2.0 }
    }
}

/// Airfoil of chord `2b` and span `2d` lying in the z = 0 plane, centred on
/// the origin, discretised into `nx × ny` panels.
///
/// Panel centres are stored span-major: point `p = j * nx + i` is chord
/// station `i` on span station `j`.
#[derive(Debug, Clone, PartialEq)]
pub struct AirfoilGeometry {
    b: f64,
    d: f64,
    nx: usize,
    ny: usize,
    sampling: ChordSampling,
    x: Vec<f64>,
    dx: Vec<f64>,
    y: Vec<f64>,
    dy: f64,
    points: Vec<Vector3<f64>>,
}

impl AirfoilGeometry {
    pub fn new(b: Length, d: Length, nx: usize, ny: usize) -> Result<Self, ValidationError> {
        Self::with_sampling(b, d, nx, ny, ChordSampling::default())
    }

    pub fn with_sampling(
        b: Length,
        d: Length,
        nx: usize,
        ny: usize,
        sampling: ChordSampling,
    ) -> Result<Self, ValidationError> {
        let (b, d) = (b.value, d.value);
        positive("b", b)?;
        positive("d", d)?;
        if nx == 0 || ny == 0 {
            return Err(ValidationError::invalid(
                "Nx/Ny",
                format!("{nx}x{ny}"),
                "grid resolution must be at least 1x1",
            ));
        }

        let edges = chord_edges(b, nx, sampling)?;
        let dx: Vec<f64> = edges.windows(2).map(|w| w[1] - w[0]).collect();
        let x: Vec<f64> = edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect();

        let dy = 2.0 * d / ny as f64;
        let y: Vec<f64> = (0..ny).map(|j| -d + dy * (j as f64 + 0.5)).collect();

        let points = y
            .iter()
            .flat_map(|&yj| x.iter().map(move |&xi| Vector3::new(xi, yj, 0.0)))
            .collect();

        Ok(Self {
            b,
            d,
            nx,
            ny,
            sampling,
            x,
            dx,
            y,
            dy,
            points,
        })
    }

    /// Half chord.
    pub fn b(&self) -> f64 {
        self.b
    }

    /// Half span.
    pub fn d(&self) -> f64 {
        self.d
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn sampling(&self) -> ChordSampling {
        self.sampling
    }

    /// Chordwise panel centres.
    pub fn chord_positions(&self) -> &[f64] {
        &self.x
    }

    /// Chordwise panel widths.
    pub fn dx(&self) -> &[f64] {
        &self.dx
    }

    /// Spanwise panel centres.
    pub fn span_positions(&self) -> &[f64] {
        &self.y
    }

    /// Spanwise panel width (uniform).
    pub fn dy(&self) -> f64 {
        self.dy
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[Vector3<f64>] {
        &self.points
    }

    /// Area of every panel, in point order.
    pub fn panel_areas(&self) -> Vec<f64> {
        (0..self.ny)
            .flat_map(|_| self.dx.iter().map(|dx| dx * self.dy))
            .collect()
    }

    pub fn planform_area(&self) -> f64 {
        4.0 * self.b * self.d
    }
}

fn chord_edges(b: f64, nx: usize, sampling: ChordSampling) -> Result<Vec<f64>, ValidationError> {
    match sampling {
        ChordSampling::Uniform => Ok(linspace(-b, b, nx + 1)),
        ChordSampling::Exponential { length } => {
            positive("chord_sampling.length", length)?;
            let span = length.exp() - 1.0;
            Ok((0..=nx)
                .map(|k| {
                    let u = ((length * k as f64 / nx as f64).exp() - 1.0) / span;
                    -b + 2.0 * b * u
                })
                .collect())
        }
    }
}
