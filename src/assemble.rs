//! Assembly of per-worker product slices into one CSC matrix
//!
//! Slices cover disjoint contiguous column ranges in worker-id order and
//! carry local column pointers starting at 0. Row indices already refer to
//! the full row range, so only the column pointers need shifting.

use log::debug;

use crate::error::{Result, SpgemmError};
use crate::matrix::{CscBuilder, CscMatrix};
use crate::utils::exclusive_scan;

/// Offsets of each slice within the assembled matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceOffsets {
    /// Entries stored by all earlier slices
    pub value_offsets: Vec<usize>,
    /// Columns covered by all earlier slices
    pub col_offsets: Vec<usize>,
}

/// Computes value and column offsets as prefix sums over the slices
pub fn slice_offsets(slices: &[CscMatrix]) -> SliceOffsets {
    let nnz: Vec<usize> = slices.iter().map(|s| s.nnz()).collect();
    let cols: Vec<usize> = slices.iter().map(|s| s.cols).collect();

    SliceOffsets {
        value_offsets: exclusive_scan(&nnz),
        col_offsets: exclusive_scan(&cols),
    }
}

/// Concatenates column slices into a `rows × Σcols` matrix
///
/// # Errors
///
/// Returns [`SpgemmError::InvalidStructure`] if a slice has a different row
/// count than `rows`, or if `expected_cols` is given and the slices do not
/// cover exactly that many columns.
pub fn assemble(
    rows: usize,
    slices: &[CscMatrix],
    expected_cols: Option<usize>,
) -> Result<CscMatrix> {
    let offsets = slice_offsets(slices);
    let total_nnz = offsets.value_offsets[slices.len()];
    let total_cols = offsets.col_offsets[slices.len()];

    if let Some(expected) = expected_cols {
        if expected != total_cols {
            return Err(SpgemmError::InvalidStructure(format!(
                "slices cover {total_cols} columns, expected {expected}"
            )));
        }
    }

    let mut builder = CscBuilder::with_capacity(rows, total_cols, total_nnz);

    for (id, slice) in slices.iter().enumerate() {
        if slice.rows != rows {
            return Err(SpgemmError::InvalidStructure(format!(
                "slice {id} has {} rows, expected {rows}",
                slice.rows
            )));
        }
        debug_assert_eq!(builder.nnz(), offsets.value_offsets[id]);
        debug_assert_eq!(builder.n_cols(), offsets.col_offsets[id]);

        builder.append_slice(&slice.values, &slice.row_indices, &slice.col_ptrs)?;
    }

    debug!(
        "assembled {} slices into {}×{} matrix with {} entries",
        slices.len(),
        rows,
        total_cols,
        total_nnz
    );

    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slice_a() -> CscMatrix {
        // 3 rows, 2 columns, 3 entries
        CscMatrix::new(3, 2, vec![0, 2, 3], vec![0, 2, 1], vec![1.0, 2.0, 3.0])
    }

    fn slice_b() -> CscMatrix {
        // 3 rows, 1 column, 1 entry
        CscMatrix::new(3, 1, vec![0, 1], vec![2], vec![4.0])
    }

    #[test]
    fn test_slice_offsets() {
        let offsets = slice_offsets(&[slice_a(), CscMatrix::zeros(3, 0), slice_b()]);

        assert_eq!(offsets.value_offsets, vec![0, 3, 3, 4]);
        assert_eq!(offsets.col_offsets, vec![0, 2, 2, 3]);
    }

    #[test]
    fn test_assemble_two_slices() {
        let c = assemble(3, &[slice_a(), slice_b()], Some(3)).unwrap();

        assert_eq!(c.shape(), (3, 3));
        assert_eq!(c.col_ptrs, vec![0, 2, 3, 4]);
        assert_eq!(c.row_indices, vec![0, 2, 1, 2]);
        assert_eq!(c.values, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_assemble_with_empty_slices() {
        let c = assemble(
            3,
            &[CscMatrix::zeros(3, 0), slice_b(), CscMatrix::zeros(3, 2)],
            None,
        )
        .unwrap();

        assert_eq!(c.shape(), (3, 3));
        assert_eq!(c.col_ptrs, vec![0, 1, 1, 1]);
    }

    #[test]
    fn test_assemble_single_slice_is_identity() {
        let c = assemble(3, &[slice_a()], Some(2)).unwrap();

        assert_eq!(c, slice_a());
    }

    #[test]
    fn test_assemble_rejects_mismatches() {
        assert!(assemble(4, &[slice_a()], None).is_err());
        assert!(assemble(3, &[slice_a()], Some(5)).is_err());
    }
}
