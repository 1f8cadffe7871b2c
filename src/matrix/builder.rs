//! Incremental CSC construction
//!
//! Entries are pushed column by column and each column is explicitly closed,
//! so `col_ptrs` always has exactly one entry per closed column plus the
//! leading zero.

use crate::error::{Result, SpgemmError};
use crate::matrix::CscMatrix;

/// Column-by-column builder for [`CscMatrix`]
#[derive(Debug, Clone)]
pub struct CscBuilder {
    rows: usize,
    col_ptrs: Vec<usize>,
    row_indices: Vec<usize>,
    values: Vec<f64>,
}

impl CscBuilder {
    /// Starts an empty matrix with `rows` rows and no columns
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            col_ptrs: vec![0],
            row_indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Starts a builder with room for `cols` columns and `nnz` entries
    pub fn with_capacity(rows: usize, cols: usize, nnz: usize) -> Self {
        let mut col_ptrs = Vec::with_capacity(cols + 1);
        col_ptrs.push(0);
        Self {
            rows,
            col_ptrs,
            row_indices: Vec::with_capacity(nnz),
            values: Vec::with_capacity(nnz),
        }
    }

    /// Appends an entry to the currently open column
    #[inline]
    pub fn push_entry(&mut self, row: usize, value: f64) {
        debug_assert!(row < self.rows, "row {} out of bounds ({})", row, self.rows);
        self.row_indices.push(row);
        self.values.push(value);
    }

    /// Closes the current column, recording the cumulative entry count
    #[inline]
    pub fn close_column(&mut self) {
        self.col_ptrs.push(self.values.len());
    }

    /// Appends a whole slice whose local column pointers start at 0
    ///
    /// The leading 0 of `local_col_ptrs` is skipped; every other pointer is
    /// shifted by the number of entries already stored.
    pub fn append_slice(
        &mut self,
        values: &[f64],
        row_indices: &[usize],
        local_col_ptrs: &[usize],
    ) -> Result<()> {
        if values.len() != row_indices.len() {
            return Err(SpgemmError::length_mismatch(
                "slice row_indices",
                values.len(),
                row_indices.len(),
            ));
        }
        match local_col_ptrs.last() {
            Some(&last) if last == values.len() && local_col_ptrs[0] == 0 => {}
            _ => {
                return Err(SpgemmError::InvalidStructure(format!(
                    "slice column pointers {:?} do not span {} entries",
                    local_col_ptrs,
                    values.len()
                )))
            }
        }

        let value_offset = self.values.len();
        self.values.extend_from_slice(values);
        self.row_indices.extend_from_slice(row_indices);
        self.col_ptrs
            .extend(local_col_ptrs[1..].iter().map(|&ptr| ptr + value_offset));

        Ok(())
    }

    /// Number of closed columns
    pub fn n_cols(&self) -> usize {
        self.col_ptrs.len() - 1
    }

    /// Number of stored entries, including those in the open column
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Finishes the matrix
    ///
    /// Entries pushed after the last `close_column` are rejected.
    pub fn finish(self) -> Result<CscMatrix> {
        let cols = self.n_cols();
        if self.col_ptrs[cols] != self.values.len() {
            return Err(SpgemmError::InvalidStructure(format!(
                "{} entries pushed after the last closed column",
                self.values.len() - self.col_ptrs[cols]
            )));
        }
        CscMatrix::try_new(self.rows, cols, self.col_ptrs, self.row_indices, self.values)
    }

    /// Finishes a matrix whose columns were all closed by crate code
    pub(crate) fn into_matrix(self) -> CscMatrix {
        debug_assert_eq!(self.col_ptrs[self.n_cols()], self.values.len());
        CscMatrix {
            rows: self.rows,
            cols: self.n_cols(),
            col_ptrs: self.col_ptrs,
            row_indices: self.row_indices,
            values: self.values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_columns() {
        let mut builder = CscBuilder::new(3);
        builder.push_entry(0, 1.0);
        builder.push_entry(2, 4.0);
        builder.close_column();
        builder.close_column(); // empty column
        builder.push_entry(1, 3.0);
        builder.close_column();

        let matrix = builder.finish().unwrap();

        assert_eq!(matrix.shape(), (3, 3));
        assert_eq!(matrix.col_ptrs, vec![0, 2, 2, 3]);
        assert_eq!(matrix.row_indices, vec![0, 2, 1]);
        assert_eq!(matrix.values, vec![1.0, 4.0, 3.0]);
    }

    #[test]
    fn test_unclosed_column_is_rejected() {
        let mut builder = CscBuilder::new(2);
        builder.push_entry(0, 1.0);

        assert!(builder.finish().is_err());
    }

    #[test]
    fn test_append_slice_offsets_pointers() {
        let mut builder = CscBuilder::with_capacity(2, 3, 3);
        builder.push_entry(1, 1.0);
        builder.close_column();
        builder
            .append_slice(&[2.0, 3.0], &[0, 1], &[0, 1, 2])
            .unwrap();

        let matrix = builder.finish().unwrap();

        assert_eq!(matrix.col_ptrs, vec![0, 1, 2, 3]);
        assert_eq!(matrix.row_indices, vec![1, 0, 1]);
    }

    #[test]
    fn test_append_slice_rejects_bad_pointers() {
        let mut builder = CscBuilder::new(2);

        assert!(builder.append_slice(&[1.0], &[0], &[0, 2]).is_err());
        assert!(builder.append_slice(&[1.0], &[0, 1], &[0, 1]).is_err());
        assert!(builder.append_slice(&[], &[], &[]).is_err());
    }
}
