//! Delay-and-sum steering filters.

use ag_core::{C64, CMatrix};

use crate::error::{SynthError, SynthResult};

/// `W[:, n] = G[:, n] / ‖G[:, n]‖²` for every scan point `n`.
///
/// Columns with zero (or non-finite) norm are rejected.
pub fn steering_filters(grid_transfer: &CMatrix) -> SynthResult<CMatrix> {
    let mut w = grid_transfer.clone();
    for (n, mut col) in w.column_iter_mut().enumerate() {
        let norm2 = col.norm_squared();
        if !(norm2.is_finite() && norm2 > 0.0) {
            return Err(SynthError::ZeroNormSteering { scan_index: n });
        }
        col /= C64::new(norm2, 0.0);
    }
    Ok(w)
}
