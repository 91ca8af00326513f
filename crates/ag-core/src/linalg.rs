//! Complex scalar and matrix aliases shared by the numerical crates.

use nalgebra::{DMatrix, DVector};

use crate::error::{CoreError, CoreResult};

/// Double precision complex scalar.
pub type C64 = nalgebra::Complex<f64>;

/// Dense complex matrix (CSMs, transfer matrices, steering filters).
pub type CMatrix = DMatrix<C64>;

/// Dense complex column vector.
pub type CVector = DVector<C64>;

/// Shorthand for building a complex scalar.
#[inline]
pub fn c64(re: f64, im: f64) -> C64 {
    C64::new(re, im)
}

/// Largest absolute entry of `a - aᴴ` relative to the largest entry of `a`.
///
/// Returns 0 for an all-zero matrix. Non-square matrices are never
/// Hermitian and report infinity.
pub fn hermitian_defect(a: &CMatrix) -> f64 {
    if !a.is_square() {
        return f64::INFINITY;
    }
    let scale = a.iter().map(|z| z.norm()).fold(0.0, f64::max);
    if scale == 0.0 {
        return 0.0;
    }
    let n = a.nrows();
    let mut worst: f64 = 0.0;
    for i in 0..n {
        for j in i..n {
            let d = (a[(i, j)] - a[(j, i)].conj()).norm();
            worst = worst.max(d);
        }
    }
    worst / scale
}

/// Every real and imaginary part of `a` is finite.
pub fn ensure_finite_matrix(a: &CMatrix, what: &'static str) -> CoreResult<()> {
    match a
        .iter()
        .flat_map(|z| [z.re, z.im])
        .find(|v| !v.is_finite())
    {
        Some(value) => Err(CoreError::NonFinite { what, value }),
        None => Ok(()),
    }
}

/// Force exact Hermitian symmetry: `(a + aᴴ) / 2`.
pub fn hermitian_part(a: &CMatrix) -> CMatrix {
    (a + a.adjoint()).map(|z| z * 0.5)
}
