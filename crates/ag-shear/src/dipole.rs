//! Convected dipole transfer function through the shear layer.

use ag_core::{C64, CMatrix};
use ag_setup::Axis;
use std::f64::consts::PI;

use crate::paths::ShearLayerPaths;

/// Transfer matrix `G` (receivers × sources) of a dipole oriented along
/// `axis`, at acoustic wavenumber `k0`:
///
/// `G = -(Δa / R) (i k0 + β² / R) e^{-i k0 c0 T} / (4π R)`
///
/// where `Δa` is the receiver-source offset along the dipole axis,
/// `R = σ + r_out` the refraction-corrected path length and `T` the
/// travel time.
pub fn dipole_transfer(paths: &ShearLayerPaths, k0: f64, axis: Axis) -> CMatrix {
    let layer = paths.layer();
    let (beta2, c0) = (layer.beta() * layer.beta(), layer.c0());
    let a = axis.index();

    paths.paths().map(|p| {
        let r = p.sigma + p.r_out;
        let directivity = -(p.offset[a] / r) * C64::new(beta2 / r, k0);
        let propagation = C64::new(0.0, -k0 * c0 * p.travel_time).exp() / (4.0 * PI * r);
        directivity * propagation
    })
}
