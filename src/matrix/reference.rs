//! Reference implementations and dense helpers
//!
//! These provide a baseline for correctness testing. They trade speed for
//! obviousness and are not used on the multiplication path.

use std::collections::HashMap;

use ndarray::Array2;

use crate::constants::{COMPARE_TOLERANCE, EPSILON};
use crate::matrix::{CscBuilder, CscMatrix};

impl CscMatrix {
    /// Expands the matrix to a dense array, summing duplicate entries
    pub fn to_dense(&self) -> Array2<f64> {
        let mut dense = Array2::zeros((self.rows, self.cols));
        for j in 0..self.cols {
            for (row, value) in self.col_iter(j) {
                dense[[row, j]] += value;
            }
        }
        dense
    }

    /// Builds a CSC matrix from the entries of a dense array with
    /// magnitude above [`EPSILON`]
    pub fn from_dense(dense: &Array2<f64>) -> CscMatrix {
        let (rows, cols) = dense.dim();
        let mut builder = CscBuilder::new(rows);
        for j in 0..cols {
            for i in 0..rows {
                let value = dense[[i, j]];
                if value.abs() > EPSILON {
                    builder.push_entry(i, value);
                }
            }
            builder.close_column();
        }
        builder.into_matrix()
    }
}

/// Dense product of two CSC matrices, computed with `ndarray`
pub fn reference_dense_product(a: &CscMatrix, b: &CscMatrix) -> Array2<f64> {
    assert_eq!(
        a.cols, b.rows,
        "Matrix dimensions must be compatible for multiplication"
    );
    a.to_dense().dot(&b.to_dense())
}

/// Sparse product using a hashmap accumulator per column
///
/// Applies the same [`EPSILON`] rule as the kernel, so its output can be
/// compared structurally with the kernel's.
pub fn reference_spgemm(a: &CscMatrix, b: &CscMatrix) -> CscMatrix {
    assert_eq!(
        a.cols, b.rows,
        "Matrix dimensions must be compatible for multiplication"
    );

    let mut builder = CscBuilder::with_capacity(a.rows, b.cols, 0);

    for j in 0..b.cols {
        let mut accum: HashMap<usize, f64> = HashMap::new();

        // Column j of C is a combination of the columns of A
        for (k, b_val) in b.col_iter(j) {
            for (i, a_val) in a.col_iter(k) {
                *accum.entry(i).or_insert(0.0) += a_val * b_val;
            }
        }

        let mut col_entries: Vec<_> = accum.into_iter().collect();
        col_entries.sort_by_key(|&(row, _)| row);

        for (i, val) in col_entries {
            if val.abs() > EPSILON {
                builder.push_entry(i, val);
            }
        }
        builder.close_column();
    }

    builder.into_matrix()
}

/// Compares two matrices entry by entry in dense form
///
/// Shapes must match exactly; values may differ by at most `tolerance`.
pub fn approx_equal(a: &CscMatrix, b: &CscMatrix, tolerance: f64) -> bool {
    if a.shape() != b.shape() {
        return false;
    }
    a.to_dense()
        .iter()
        .zip(b.to_dense().iter())
        .all(|(x, y)| (x - y).abs() <= tolerance)
}

/// [`approx_equal`] with the default tolerance of `1e-6`
pub fn approx_equal_default(a: &CscMatrix, b: &CscMatrix) -> bool {
    approx_equal(a, b, COMPARE_TOLERANCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_dense_roundtrip() {
        let dense = array![[1.0, 0.0, 2.0], [0.0, 0.0, 3.0]];

        let sparse = CscMatrix::from_dense(&dense);

        assert_eq!(sparse.shape(), (2, 3));
        assert_eq!(sparse.col_ptrs, vec![0, 1, 1, 3]);
        assert_eq!(sparse.to_dense(), dense);
    }

    #[test]
    fn test_reference_multiplication() {
        // A = [1 2; 0 3], B = [4 5; 6 7], C = [16 19; 18 21]
        let a = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![1.0, 2.0, 3.0]);
        let b = CscMatrix::new(2, 2, vec![0, 2, 4], vec![0, 1, 0, 1], vec![4.0, 6.0, 5.0, 7.0]);

        let result = reference_spgemm(&a, &b);

        assert_eq!(result.nnz(), 4);
        assert_eq!(result.to_dense(), array![[16.0, 19.0], [18.0, 21.0]]);
        assert_eq!(reference_dense_product(&a, &b), result.to_dense());
    }

    #[test]
    fn test_approx_equal() {
        let a = CscMatrix::identity(2);
        let mut b = CscMatrix::identity(2);
        b.values[1] += 1e-8;

        assert!(approx_equal_default(&a, &b));
        assert!(!approx_equal(&a, &b, 1e-9));
        assert!(!approx_equal(&a, &CscMatrix::identity(3), 1.0));
    }
}
