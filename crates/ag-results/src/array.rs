//! Complex arrays as stored on disk.

use ag_core::{C64, CMatrix};
use serde::{Deserialize, Serialize};

use crate::{ResultsError, ResultsResult};

/// Row-major complex array split into real and imaginary parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexArray {
    pub shape: Vec<usize>,
    pub re: Vec<f64>,
    pub im: Vec<f64>,
}

impl ComplexArray {
    pub fn from_matrix(m: &CMatrix) -> Self {
        let (rows, cols) = m.shape();
        let mut re = Vec::with_capacity(rows * cols);
        let mut im = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                let z = m[(i, j)];
                re.push(z.re);
                im.push(z.im);
            }
        }
        Self {
            shape: vec![rows, cols],
            re,
            im,
        }
    }

    /// `[2, M, M]` stack: bin 0 all zeros, bin 1 the CSM.
    pub fn csm_stack(csm: &CMatrix) -> Self {
        let one = Self::from_matrix(csm);
        let n = one.re.len();
        let mut re = vec![0.0; n];
        let mut im = vec![0.0; n];
        re.extend_from_slice(&one.re);
        im.extend_from_slice(&one.im);
        Self {
            shape: vec![2, csm.nrows(), csm.ncols()],
            re,
            im,
        }
    }

    fn check(&self, what: &'static str) -> ResultsResult<usize> {
        let len: usize = self.shape.iter().product();
        if self.re.len() != len || self.im.len() != len {
            return Err(ResultsError::Shape {
                what,
                expected: vec![len, len],
                got: vec![self.re.len(), self.im.len()],
            });
        }
        Ok(len)
    }

    pub fn to_matrix(&self, what: &'static str) -> ResultsResult<CMatrix> {
        let [rows, cols] = self.shape[..] else {
            return Err(ResultsError::Shape {
                what,
                expected: vec![0, 0],
                got: self.shape.clone(),
            });
        };
        self.check(what)?;
        Ok(CMatrix::from_fn(rows, cols, |i, j| {
            let k = i * cols + j;
            C64::new(self.re[k], self.im[k])
        }))
    }

    /// Last bin of a `[bins, M, M]` stack.
    pub fn csm_from_stack(&self) -> ResultsResult<CMatrix> {
        let [bins, rows, cols] = self.shape[..] else {
            return Err(ResultsError::Shape {
                what: "CSM",
                expected: vec![2, 0, 0],
                got: self.shape.clone(),
            });
        };
        if bins == 0 || rows != cols {
            return Err(ResultsError::Shape {
                what: "CSM",
                expected: vec![2, rows, rows],
                got: self.shape.clone(),
            });
        }
        self.check("CSM")?;
        let offset = (bins - 1) * rows * cols;
        Ok(CMatrix::from_fn(rows, cols, |i, j| {
            let k = offset + i * cols + j;
            C64::new(self.re[k], self.im[k])
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ag_core::c64;

    #[test]
    fn row_major_layout() {
        let m = CMatrix::from_row_slice(
            2,
            2,
            &[c64(1.0, 0.5), c64(2.0, 0.0), c64(3.0, -1.0), c64(4.0, 0.0)],
        );
        let a = ComplexArray::from_matrix(&m);
        assert_eq!(a.shape, vec![2, 2]);
        assert_eq!(a.re, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(a.im, vec![0.5, 0.0, -1.0, 0.0]);
        assert_eq!(a.to_matrix("m").unwrap(), m);
    }

    #[test]
    fn csm_stack_has_zero_first_bin() {
        let m = CMatrix::from_element(3, 3, c64(1.0, 1.0));
        let a = ComplexArray::csm_stack(&m);
        assert_eq!(a.shape, vec![2, 3, 3]);
        assert!(a.re[..9].iter().all(|v| *v == 0.0));
        assert!(a.im[..9].iter().all(|v| *v == 0.0));
        assert_eq!(a.csm_from_stack().unwrap(), m);
    }

    #[test]
    fn truncated_data_rejected() {
        let mut a = ComplexArray::from_matrix(&CMatrix::from_element(2, 3, c64(1.0, 0.0)));
        a.im.pop();
        assert!(matches!(a.to_matrix("m"), Err(ResultsError::Shape { .. })));
        assert!(matches!(a.csm_from_stack(), Err(ResultsError::Shape { .. })));
    }
}
