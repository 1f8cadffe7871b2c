//! # Shared-memory parallel multiplication
//!
//! Same partition / multiply / assemble pipeline as the distributed
//! driver, but the column blocks of B are processed on a Rayon pool that
//! shares one transpose of A instead of broadcasting it.

use log::debug;
use rayon::prelude::*;

use crate::accumulator::multiply_local;
use crate::assemble::assemble;
use crate::driver::validate_shapes;
use crate::error::{Result, SpgemmError};
use crate::matrix::CscMatrix;
use crate::partition::{extract_local_columns, partition_columns};

/// Multiplies `a × b` with B's columns split into `n_partitions` blocks
/// processed in parallel.
///
/// The result is identical to the sequential and distributed products:
/// blocks are collected in partition order before assembly.
///
/// # Examples
///
/// ```
/// use ccs_spgemm::{CscMatrix, multiply_parallel};
///
/// let a = CscMatrix::new(2, 2, vec![0, 1, 2], vec![0, 1], vec![1.0, 1.0]);
/// let b = CscMatrix::new(2, 2, vec![0, 1, 2], vec![0, 1], vec![2.0, 2.0]);
///
/// let c = multiply_parallel(&a, &b, 2).unwrap();
///
/// // Result should be a diagonal matrix with elements 2.0
/// assert_eq!(c.values, vec![2.0, 2.0]);
/// assert_eq!(c.col_ptrs, vec![0, 1, 2]);
/// ```
pub fn multiply_parallel(a: &CscMatrix, b: &CscMatrix, n_partitions: usize) -> Result<CscMatrix> {
    if n_partitions == 0 {
        return Err(SpgemmError::InvalidWorkers(
            "at least one partition is required".to_string(),
        ));
    }
    validate_shapes(a, b)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(n_partitions)
        .build()
        .map_err(|e| SpgemmError::Execution(format!("Failed to create thread pool: {e}")))?;

    let at = a.transpose();
    let partitions = partition_columns(b.cols, n_partitions);

    let slices: Vec<CscMatrix> = pool.install(|| {
        partitions
            .par_iter()
            .map(|&partition| multiply_local(&at, &extract_local_columns(b, partition)))
            .collect::<Result<_>>()
    })?;

    debug!(
        "parallel multiply: {} partitions over {} columns",
        n_partitions, b.cols
    );

    assemble(a.rows, &slices, Some(b.cols))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::multiply_sequential;

    #[test]
    fn test_parallel_vs_sequential() {
        let a = CscMatrix::new(
            3,
            3,
            vec![0, 2, 4, 6],
            vec![0, 1, 0, 2, 1, 2],
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        );
        let b = CscMatrix::new(
            3,
            3,
            vec![0, 2, 4, 6],
            vec![0, 2, 0, 1, 1, 2],
            vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0],
        );

        let expected = multiply_sequential(&a, &b).unwrap();
        for n in 1..=4 {
            assert_eq!(multiply_parallel(&a, &b, n).unwrap(), expected);
        }
    }

    #[test]
    fn test_zero_partitions() {
        let a = CscMatrix::identity(2);

        assert!(matches!(
            multiply_parallel(&a, &a, 0),
            Err(SpgemmError::InvalidWorkers(_))
        ));
    }
}
