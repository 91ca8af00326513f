//! Analysis frequency helpers.

use std::f64::consts::PI;

use crate::schema::FrequenciesDef;

/// Frequency in Hz for a chordwise normalised frequency `kc = k0 · 2b`,
/// rounded to two decimals.
pub fn frequency_by_kc(kc: f64, b: f64, c0: f64) -> f64 {
    let f0 = kc * c0 / (2.0 * PI * (2.0 * b));
    (f0 * 100.0).round() / 100.0
}

/// Resolves a frequency definition to a list in Hz, in declaration order.
pub fn resolve_frequencies(def: &FrequenciesDef, b: f64, c0: f64) -> Vec<f64> {
    match def {
        FrequenciesDef::Hz { values } => values.clone(),
        FrequenciesDef::Kc { values } => values
            .iter()
            .map(|&kc| frequency_by_kc(kc, b, c0))
            .collect(),
    }
}
