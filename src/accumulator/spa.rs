//! Sparse accumulator (SPA) kernel for a column slice of the product
//!
//! Column `j` of the product is `Σ_k B[k, j] · A[:, k]`. For each entry of
//! the local column of B, the matching column of A is scaled and added into
//! a dense work array indexed by output row. Each touched row is tagged with
//! `j`, so the arrays are reused across columns without being cleared. The
//! column is emitted by scanning the rows in increasing order.

use log::trace;

use crate::constants::{EPSILON, UNMARKED_ROW};
use crate::error::{Result, SpgemmError};
use crate::matrix::{CscBuilder, CscMatrix};
use crate::partition::LocalColumns;

/// Dense work arrays shared by all columns of one kernel invocation
///
/// `temp_row[i]` holds the partial value of `C[i, j]` for the column being
/// built; `row_marker[i]` is the last column that wrote it.
pub struct SparseAccumulator {
    temp_row: Vec<f64>,
    row_marker: Vec<i64>,
}

impl SparseAccumulator {
    /// Create an accumulator over `n_rows` output rows
    pub fn new(n_rows: usize) -> Self {
        Self {
            temp_row: vec![0.0; n_rows],
            row_marker: vec![UNMARKED_ROW; n_rows],
        }
    }

    /// Add `scale * value` for every `(row, value)` into column `col`
    ///
    /// The first write to a row in this column resets it; later writes to the
    /// same row add to it.
    #[inline]
    pub fn accumulate(
        &mut self,
        col: i64,
        scale: f64,
        entries: impl Iterator<Item = (usize, f64)>,
    ) {
        for (row, val) in entries {
            let product = val * scale;
            if self.row_marker[row] != col {
                self.row_marker[row] = col;
                self.temp_row[row] = product;
            } else {
                self.temp_row[row] += product;
            }
        }
    }

    /// Entries of column `col` with magnitude above [`EPSILON`], by
    /// increasing row
    pub fn entries(&self, col: i64) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.row_marker
            .iter()
            .zip(&self.temp_row)
            .enumerate()
            .filter(move |&(_, (&marker, val))| marker == col && val.abs() > EPSILON)
            .map(|(row, (_, &val))| (row, val))
    }
}

/// Checks that a column slice is well formed and fits the inner dimension
fn validate_local(local_b: &LocalColumns, inner_dim: usize) -> Result<()> {
    let nnz = local_b.values.len();
    if local_b.row_indices.len() != nnz {
        return Err(SpgemmError::length_mismatch(
            "local row_indices",
            nnz,
            local_b.row_indices.len(),
        ));
    }
    if local_b.col_ptrs.first() != Some(&0) || local_b.col_ptrs.last() != Some(&nnz) {
        return Err(SpgemmError::InvalidStructure(format!(
            "local column pointers {:?} do not span {} entries",
            local_b.col_ptrs, nnz
        )));
    }
    if let Some(j) = local_b.col_ptrs.windows(2).position(|w| w[0] > w[1]) {
        return Err(SpgemmError::InvalidStructure(format!(
            "local col_ptrs decreases at column {j}"
        )));
    }
    if let Some(&k) = local_b.row_indices.iter().find(|&&k| k >= inner_dim) {
        return Err(SpgemmError::InvalidStructure(format!(
            "B row index {k} out of bounds (inner dimension = {inner_dim})"
        )));
    }
    Ok(())
}

/// Multiply A by a local column slice of B, given the transpose of A
///
/// # Arguments
///
/// * `at` - Transpose of the left operand; `at.cols` is the number of rows
///   of the product
/// * `local_b` - Columns of B assigned to this worker, re-based to start at 0
///
/// # Returns
///
/// The product columns as a CSC matrix with `at.cols` rows and
/// `local_b.n_cols()` columns. Within each column rows are increasing;
/// values with magnitude at or below [`EPSILON`] are dropped.
///
/// # Errors
///
/// Returns [`SpgemmError::InvalidStructure`] if `local_b` is malformed or
/// refers to a row outside `0..at.rows`.
pub fn multiply_local(at: &CscMatrix, local_b: &LocalColumns) -> Result<CscMatrix> {
    validate_local(local_b, at.rows)?;

    // Column k of A is column k of the transpose's transpose
    let a = at.transpose();
    let out_rows = a.rows;
    let loc_cols = local_b.n_cols();

    let mut spa = SparseAccumulator::new(out_rows);
    let mut builder = CscBuilder::with_capacity(out_rows, loc_cols, local_b.nnz());

    for j in 0..loc_cols {
        if local_b.col_ptrs[j] == local_b.col_ptrs[j + 1] {
            builder.close_column();
            continue;
        }

        let tag = j as i64;
        for (k, b_val) in local_b.col_iter(j) {
            spa.accumulate(tag, b_val, a.col_iter(k));
        }

        for (i, val) in spa.entries(tag) {
            builder.push_entry(i, val);
        }

        builder.close_column();
    }

    trace!(
        "local multiply: {} columns, {} entries",
        loc_cols,
        builder.nnz()
    );

    Ok(builder.into_matrix())
}
