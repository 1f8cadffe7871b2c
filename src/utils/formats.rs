//! Conversions between our CSC matrix and the `sprs` crate

use sprs::CsMat;

use crate::error::{Result, SpgemmError};
use crate::matrix::CscMatrix;

/// Converts our CSC matrix to an sprs `CsMat` in CSC storage
///
/// sprs requires sorted, duplicate-free indices within each column;
/// products computed by this crate satisfy that, but arbitrary inputs may
/// not and are reported as [`SpgemmError::InvalidStructure`].
pub fn to_sprs_csc(matrix: &CscMatrix) -> Result<CsMat<f64>> {
    CsMat::try_new_csc(
        (matrix.rows, matrix.cols),
        matrix.col_ptrs.clone(),
        matrix.row_indices.clone(),
        matrix.values.clone(),
    )
    .map_err(|(_, _, _, err)| SpgemmError::InvalidStructure(format!("sprs rejected matrix: {err}")))
}

/// Converts an sprs `CsMat` (either storage) to our CSC matrix
pub fn from_sprs_csc(matrix: CsMat<f64>) -> Result<CscMatrix> {
    // Ensure matrix is in CSC format
    let matrix = if matrix.is_csc() {
        matrix
    } else {
        matrix.to_csc()
    };

    let (rows, cols) = matrix.shape();
    let (indptr, indices, data) = matrix.into_raw_storage();

    CscMatrix::try_new(rows, cols, indptr, indices, data)
}
