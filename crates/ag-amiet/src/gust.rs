//! Amiet leading-edge gust response and the resulting surface pressure jump.

use ag_core::C64;
use std::f64::consts::{FRAC_PI_4, PI};

use crate::special::{erf, fresnel_e_conj};

/// Leading-edge response `g(x, Kx, ky)` of a flat plate of half-chord `b`
/// to a convected gust, at chordwise position `x` (m, leading edge at `-b`).
///
/// Includes the first-order leading-edge term and the trailing-edge
/// back-scatter correction, so `g` vanishes at `x = b`. Gusts with
/// `|ky| < Kx·M/β` radiate (supercritical branch); the rest decay
/// exponentially along the chord (subcritical branch).
pub fn leading_edge_response(x: f64, kx: f64, ky: f64, mach: f64, b: f64) -> C64 {
    let beta2 = 1.0 - mach * mach;
    let beta = beta2.sqrt();
    let xs = x / b;

    let mu_h = kx * b / beta2;
    let mu_a = mu_h * mach;
    let kyb = ky * b / beta;
    let ky_crit = kx * mach / beta;

    if ky.abs() < ky_crit {
        let kappa = (mu_a * mu_a - kyb * kyb).sqrt();
        let phase = C64::new(0.0, -((kappa - mu_a * mach) * (xs + 1.0) + FRAC_PI_4)).exp();
        let denom = kx * b + beta2 * kappa;
        let g1 = phase / (PI * (PI * (xs + 1.0) * denom).sqrt());
        let backscatter =
            C64::new(1.0, 0.0) - C64::new(1.0, 1.0) * fresnel_e_conj(2.0 * kappa * (1.0 - xs));
        let g2 = -phase / (PI * (2.0 * PI * denom).sqrt()) * backscatter;
        g1 + g2
    } else {
        let kappa1 = (kyb * kyb - mu_a * mu_a).sqrt();
        let decay = (C64::new(-kappa1, mu_a * mach) * (xs + 1.0)).exp()
            * C64::new(0.0, -FRAC_PI_4).exp();
        let denom = C64::new(kx * b, -beta2 * kappa1);
        let g1 = decay / (PI * (denom * (PI * (xs + 1.0))).sqrt());
        let backscatter = 1.0 - erf((2.0 * kappa1 * (1.0 - xs)).sqrt());
        let g2 = -decay / (PI * (denom * (2.0 * PI)).sqrt()) * backscatter;
        g1 + g2
    }
}

/// Pressure jump across the plate at `(x, y)` for a gust of spectral
/// amplitude `w0 = √Φ(Kx, ky)`: `2π ρ0 w0 g(x) e^{-i ky y}`.
#[allow(clippy::too_many_arguments)]
pub fn pressure_jump(
    rho0: f64,
    w0: f64,
    x: f64,
    y: f64,
    kx: f64,
    ky: f64,
    mach: f64,
    b: f64,
) -> C64 {
    2.0 * PI * rho0 * w0 * leading_edge_response(x, kx, ky, mach, b) * C64::new(0.0, -ky * y).exp()
}
