//! Counting-sort transpose of CSC matrices

use log::trace;

use crate::matrix::CscMatrix;
use crate::utils::exclusive_scan;

impl CscMatrix {
    /// Returns the transpose of this matrix, also in CSC format
    ///
    /// Column `i` of the result holds row `i` of `self`. Entries land in the
    /// order their source columns are scanned, so every column of the
    /// result has increasing row indices.
    pub fn transpose(&self) -> CscMatrix {
        let nnz = self.nnz();

        if nnz == 0 {
            return CscMatrix::zeros(self.cols, self.rows);
        }

        // Count entries per source row; these become the column counts
        let mut row_counts = vec![0; self.rows];
        for &row in &self.row_indices {
            row_counts[row] += 1;
        }

        let col_ptrs = exclusive_scan(&row_counts);

        let mut row_indices = vec![0; nnz];
        let mut values = vec![0.0; nnz];
        let mut cursor = col_ptrs.clone();

        for j in 0..self.cols {
            for idx in self.col_ptrs[j]..self.col_ptrs[j + 1] {
                let row = self.row_indices[idx];
                let pos = cursor[row];

                row_indices[pos] = j;
                values[pos] = self.values[idx];

                cursor[row] += 1;
            }
        }

        trace!("transposed {}×{} matrix with {} entries", self.rows, self.cols, nnz);

        CscMatrix {
            rows: self.cols,
            cols: self.rows,
            col_ptrs,
            row_indices,
            values,
        }
    }
}
