//! Compressed Sparse Column (CSC) matrix format implementation

use std::fmt;

use crate::constants::{DEBUG_MAX_COLUMNS, DEBUG_MAX_ENTRIES};
use crate::error::{Result, SpgemmError};

/// A sparse matrix of `f64` values in Compressed Sparse Column (CSC) format
///
/// The CSC format stores a sparse matrix using three arrays:
/// - col_ptrs: Array of size cols + 1 containing offsets into row_indices and values
/// - row_indices: Array of size nnz containing row indices of non-zero elements
/// - values: Array of size nnz containing the non-zero values
///
/// Row indices within a column are not required to be sorted or unique.
/// Products computed by this crate always store them in increasing order.
#[derive(Clone, PartialEq)]
pub struct CscMatrix {
    /// Number of rows in the matrix
    pub rows: usize,

    /// Number of columns in the matrix
    pub cols: usize,

    /// Column pointers (size: cols + 1)
    /// col_ptrs[j] is the index in row_indices and values where column j starts
    /// col_ptrs[cols] is equal to nnz
    pub col_ptrs: Vec<usize>,

    /// Row indices (size: nnz)
    pub row_indices: Vec<usize>,

    /// Non-zero values (size: nnz)
    pub values: Vec<f64>,
}

impl CscMatrix {
    /// Creates a new CSC matrix with the given dimensions and data
    ///
    /// # Arguments
    ///
    /// * `rows` - Number of rows
    /// * `cols` - Number of columns
    /// * `col_ptrs` - Column pointers
    /// * `row_indices` - Row indices
    /// * `values` - Non-zero values
    ///
    /// # Panics
    ///
    /// Panics if the input arrays are inconsistent; see [`CscMatrix::try_new`]
    /// for the list of checks.
    pub fn new(
        rows: usize,
        cols: usize,
        col_ptrs: Vec<usize>,
        row_indices: Vec<usize>,
        values: Vec<f64>,
    ) -> Self {
        match Self::try_new(rows, cols, col_ptrs, row_indices, values) {
            Ok(matrix) => matrix,
            Err(err) => panic!("{}", err),
        }
    }

    /// Creates a new CSC matrix, validating the structure
    ///
    /// The following must hold:
    /// - col_ptrs.len() == cols + 1 and col_ptrs[0] == 0
    /// - col_ptrs is non-decreasing
    /// - row_indices.len() == values.len() == col_ptrs[cols]
    /// - every row index is below `rows`
    pub fn try_new(
        rows: usize,
        cols: usize,
        col_ptrs: Vec<usize>,
        row_indices: Vec<usize>,
        values: Vec<f64>,
    ) -> Result<Self> {
        if col_ptrs.len() != cols + 1 {
            return Err(SpgemmError::length_mismatch("col_ptrs", cols + 1, col_ptrs.len()));
        }
        if row_indices.len() != values.len() {
            return Err(SpgemmError::length_mismatch(
                "row_indices",
                values.len(),
                row_indices.len(),
            ));
        }
        if col_ptrs[0] != 0 {
            return Err(SpgemmError::InvalidStructure(format!(
                "col_ptrs[0] is {}, expected 0",
                col_ptrs[0]
            )));
        }
        if let Some(j) = col_ptrs.windows(2).position(|w| w[0] > w[1]) {
            return Err(SpgemmError::InvalidStructure(format!(
                "col_ptrs decreases at column {j}"
            )));
        }
        if col_ptrs[cols] != values.len() {
            return Err(SpgemmError::InvalidStructure(format!(
                "col_ptrs[{cols}] is {}, expected nnz {}",
                col_ptrs[cols],
                values.len()
            )));
        }
        if let Some(&row) = row_indices.iter().find(|&&row| row >= rows) {
            return Err(SpgemmError::InvalidStructure(format!(
                "Row index {row} out of bounds (rows = {rows})"
            )));
        }

        Ok(Self {
            rows,
            cols,
            col_ptrs,
            row_indices,
            values,
        })
    }

    /// Returns the number of stored entries in the matrix
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Returns (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of stored entries in column j
    pub fn col_nnz(&self, j: usize) -> usize {
        self.col_ptrs[j + 1] - self.col_ptrs[j]
    }

    /// Returns an iterator over the stored elements in column j
    ///
    /// Each item is a tuple (row_index, value)
    pub fn col_iter(&self, j: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        assert!(j < self.cols, "Column index out of bounds");

        let start = self.col_ptrs[j];
        let end = self.col_ptrs[j + 1];

        self.row_indices[start..end]
            .iter()
            .copied()
            .zip(self.values[start..end].iter().copied())
    }

    /// Value at (row, col), summing duplicate entries; zero if not stored
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.col_iter(col)
            .filter(|&(r, _)| r == row)
            .map(|(_, v)| v)
            .sum()
    }

    /// Creates an empty matrix with the given dimensions
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            col_ptrs: vec![0; cols + 1],
            row_indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Creates an identity matrix of the given size
    pub fn identity(n: usize) -> Self {
        Self {
            rows: n,
            cols: n,
            col_ptrs: (0..=n).collect(),
            row_indices: (0..n).collect(),
            values: vec![1.0; n],
        }
    }

    /// The 0×0 matrix returned by ranks that do not hold the result
    pub fn placeholder() -> Self {
        Self::zeros(0, 0)
    }

    /// True for the 0×0 placeholder
    pub fn is_placeholder(&self) -> bool {
        self.rows == 0 && self.cols == 0
    }
}

impl Default for CscMatrix {
    fn default() -> Self {
        Self::placeholder()
    }
}

impl fmt::Debug for CscMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CscMatrix {{")?;
        writeln!(f, "  dimensions: {} × {}", self.rows, self.cols)?;
        writeln!(f, "  nnz: {}", self.nnz())?;

        let max_cols_to_print = DEBUG_MAX_COLUMNS.min(self.cols);

        if max_cols_to_print > 0 {
            writeln!(f, "  content sample:")?;

            for j in 0..max_cols_to_print {
                write!(f, "    col {}: ", j)?;
                let start = self.col_ptrs[j];
                let end = self.col_ptrs[j + 1];

                if start == end {
                    writeln!(f, "(empty)")?;
                } else {
                    let max_elements = DEBUG_MAX_ENTRIES.min(end - start);

                    for i in start..(start + max_elements) {
                        write!(f, "({}, {:?}) ", self.row_indices[i], self.values[i])?;
                    }

                    if end - start > max_elements {
                        write!(f, "... ({} more)", end - start - max_elements)?;
                    }

                    writeln!(f)?;
                }
            }

            if self.cols > max_cols_to_print {
                writeln!(f, "    ... ({} more columns)", self.cols - max_cols_to_print)?;
            }
        }

        write!(f, "}}")
    }
}
