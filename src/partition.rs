//! Column partitioning of the right operand
//!
//! Columns of B are split into contiguous, near-equal blocks, one per
//! worker, in worker-id order. The first `total % count` workers get one
//! extra column.

use std::ops::Range;

use log::trace;

use crate::matrix::CscMatrix;

/// Half-open column range `[start, end)` assigned to one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnPartition {
    pub start: usize,
    pub end: usize,
}

impl ColumnPartition {
    /// Number of columns in the range
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True when the worker has no columns to process
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Computes the column range of `worker_id` among `worker_count` workers
///
/// # Panics
///
/// Panics if `worker_count` is zero or `worker_id >= worker_count`.
pub fn split_columns(total_cols: usize, worker_id: usize, worker_count: usize) -> ColumnPartition {
    assert!(worker_count > 0, "worker_count must be at least 1");
    assert!(
        worker_id < worker_count,
        "worker_id {} out of range for {} workers",
        worker_id,
        worker_count
    );

    let base = total_cols / worker_count;
    let remainder = total_cols % worker_count;

    let start = worker_id * base + worker_id.min(remainder);
    let end = start + base + usize::from(worker_id < remainder);

    ColumnPartition { start, end }
}

/// All partitions for `worker_count` workers, in worker-id order
pub fn partition_columns(total_cols: usize, worker_count: usize) -> Vec<ColumnPartition> {
    (0..worker_count)
        .map(|id| split_columns(total_cols, id, worker_count))
        .collect()
}

/// A contiguous column slice of a CSC matrix, re-based so its column
/// pointers start at 0
///
/// Row indices still refer to the full row range of the source matrix.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocalColumns {
    pub values: Vec<f64>,
    pub row_indices: Vec<usize>,
    pub col_ptrs: Vec<usize>,
}

impl LocalColumns {
    /// Number of columns in the slice
    pub fn n_cols(&self) -> usize {
        self.col_ptrs.len().saturating_sub(1)
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Returns an iterator over the (row, value) pairs of local column j
    pub fn col_iter(&self, j: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let start = self.col_ptrs[j];
        let end = self.col_ptrs[j + 1];

        self.row_indices[start..end]
            .iter()
            .copied()
            .zip(self.values[start..end].iter().copied())
    }
}

/// Copies the columns of `b` covered by `partition`
///
/// # Panics
///
/// Panics if the partition extends past `b.cols`.
pub fn extract_local_columns(b: &CscMatrix, partition: ColumnPartition) -> LocalColumns {
    assert!(
        partition.end <= b.cols,
        "partition {:?} exceeds {} columns",
        partition,
        b.cols
    );

    let first = b.col_ptrs[partition.start];
    let last = b.col_ptrs[partition.end];

    let local = LocalColumns {
        values: b.values[first..last].to_vec(),
        row_indices: b.row_indices[first..last].to_vec(),
        col_ptrs: b.col_ptrs[partition.start..=partition.end]
            .iter()
            .map(|&ptr| ptr - first)
            .collect(),
    };

    trace!(
        "extracted columns {:?} with {} entries",
        partition.range(),
        local.nnz()
    );

    local
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_split() {
        let parts = partition_columns(9, 3);

        assert_eq!(
            parts,
            vec![
                ColumnPartition { start: 0, end: 3 },
                ColumnPartition { start: 3, end: 6 },
                ColumnPartition { start: 6, end: 9 },
            ]
        );
    }

    #[test]
    fn test_remainder_goes_to_first_workers() {
        let parts = partition_columns(10, 4);
        let sizes: Vec<_> = parts.iter().map(|p| p.len()).collect();

        assert_eq!(sizes, vec![3, 3, 2, 2]);
        assert_eq!(parts[0].start, 0);
        assert_eq!(parts[3].end, 10);
    }

    #[test]
    fn test_more_workers_than_columns() {
        let parts = partition_columns(2, 4);

        assert_eq!(parts[0], ColumnPartition { start: 0, end: 1 });
        assert_eq!(parts[1], ColumnPartition { start: 1, end: 2 });
        assert!(parts[2].is_empty());
        assert!(parts[3].is_empty());
        assert_eq!(parts[3].start, 2);
    }

    #[test]
    fn test_zero_columns() {
        let part = split_columns(0, 0, 1);

        assert!(part.is_empty());
        assert_eq!(part.start, 0);
    }

    #[test]
    #[should_panic(expected = "worker_count must be at least 1")]
    fn test_zero_workers() {
        split_columns(5, 0, 0);
    }

    #[test]
    fn test_extract_local_columns() {
        // 3×4 with columns of 2, 0, 1, 2 entries
        let b = CscMatrix::new(
            3,
            4,
            vec![0, 2, 2, 3, 5],
            vec![0, 2, 1, 0, 1],
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
        );

        let local = extract_local_columns(&b, ColumnPartition { start: 1, end: 4 });

        assert_eq!(local.n_cols(), 3);
        assert_eq!(local.col_ptrs, vec![0, 0, 1, 3]);
        assert_eq!(local.row_indices, vec![1, 0, 1]);
        assert_eq!(local.values, vec![3.0, 4.0, 5.0]);

        let col: Vec<_> = local.col_iter(2).collect();
        assert_eq!(col, vec![(0, 4.0), (1, 5.0)]);
    }

    #[test]
    fn test_extract_empty_partition() {
        let b = CscMatrix::identity(2);

        let local = extract_local_columns(&b, ColumnPartition { start: 2, end: 2 });

        assert_eq!(local.n_cols(), 0);
        assert_eq!(local.col_ptrs, vec![0]);
        assert!(local.values.is_empty());
    }
}
