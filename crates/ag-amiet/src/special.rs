//! Special functions needed by the gust response.

use ag_core::C64;
use std::f64::consts::{FRAC_PI_2, PI};

/// Error function (Abramowitz & Stegun 7.1.26 rational approximation,
/// max error < 1.5 × 10⁻⁷).
pub fn erf(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 - erfc_positive(x)
    } else {
        erfc_positive(-x) - 1.0
    }
}

fn erfc_positive(x: f64) -> f64 {
    let t = 1.0 / (1.0 + 0.3275911 * x);
    let poly = t
        * (0.254829592
            + t * (-0.284496736 + t * (1.421413741 + t * (-1.453152027 + t * 1.061405429))));
    poly * (-x * x).exp()
}

/// Fresnel integrals `(S(x), C(x))` with the `π t² / 2` normalisation.
///
/// Power series below |x| = 1.5, modified Lentz continued fraction above.
pub fn fresnel(x: f64) -> (f64, f64) {
    const EPS: f64 = 1e-15;
    const MAXIT: usize = 200;
    const FPMIN: f64 = 1e-300;
    const XMIN: f64 = 1.5;

    let ax = x.abs();
    let (s, c) = if ax < FPMIN.sqrt() {
        (0.0, ax)
    } else if ax <= XMIN {
        let mut sum = 0.0;
        let mut sums = 0.0;
        let mut sumc = ax;
        let mut sign = 1.0;
        let fact = FRAC_PI_2 * ax * ax;
        let mut odd = true;
        let mut term = ax;
        let mut n = 3.0;
        for k in 1..=MAXIT {
            term *= fact / k as f64;
            sum += sign * term / n;
            let test = sum.abs() * EPS;
            if odd {
                sign = -sign;
                sums = sum;
                sum = sumc;
            } else {
                sumc = sum;
                sum = sums;
            }
            if term < test {
                break;
            }
            odd = !odd;
            n += 2.0;
        }
        (sums, sumc)
    } else {
        let pix2 = PI * ax * ax;
        let mut b = C64::new(1.0, -pix2);
        let mut cc = C64::new(1.0 / FPMIN, 0.0);
        let mut d = C64::new(1.0, 0.0) / b;
        let mut h = d;
        let mut n = -1.0;
        for _ in 2..=MAXIT {
            n += 2.0;
            let a = -n * (n + 1.0);
            b += C64::new(4.0, 0.0);
            d = C64::new(1.0, 0.0) / (d * a + b);
            cc = b + C64::new(a, 0.0) / cc;
            let del = cc * d;
            h *= del;
            if (del.re - 1.0).abs() + del.im.abs() < EPS {
                break;
            }
        }
        h *= C64::new(ax, -ax);
        let cs = C64::new(0.5, 0.5)
            * (C64::new(1.0, 0.0) - C64::new((0.5 * pix2).cos(), (0.5 * pix2).sin()) * h);
        (cs.im, cs.re)
    };

    if x < 0.0 { (-s, -c) } else { (s, c) }
}

/// Conjugate of the complex Fresnel integral used by Amiet:
/// `E*(x) = ∫₀ˣ e^{-it} / √(2πt) dt`.
pub fn fresnel_e_conj(x: f64) -> C64 {
    let (s, c) = fresnel((2.0 * x / PI).sqrt());
    C64::new(c, -s)
}
