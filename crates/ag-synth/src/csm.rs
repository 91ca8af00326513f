//! Microphone cross-spectral matrix.

use ag_amiet::WeightedSourceCsm;
use ag_core::{C64, CMatrix, CoreError, ensure_finite_matrix, hermitian_part};
use std::f64::consts::PI;

use crate::error::SynthResult;

/// `4π G S Gᴴ`, symmetrised to remove rounding asymmetry.
///
/// `forward` is the receivers × sources transfer matrix; `source` must
/// already carry the panel-area weight.
pub fn synthesize(source: &WeightedSourceCsm, forward: &CMatrix) -> SynthResult<CMatrix> {
    let s = source.matrix();
    if forward.ncols() != s.nrows() {
        return Err(CoreError::Shape {
            what: "forward transfer matrix",
            expected: (forward.nrows(), s.nrows()),
            got: forward.shape(),
        }
        .into());
    }

    let csm = (forward * s * forward.adjoint()) * C64::new(4.0 * PI, 0.0);
    ensure_finite_matrix(&csm, "microphone CSM")?;
    Ok(hermitian_part(&csm))
}
