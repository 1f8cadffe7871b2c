//! # ccs-spgemm: sparse matrix multiplication in Compressed Sparse Column format
//!
//! Computes `C = A × B` for sparse `f64` matrices stored column-major,
//! optionally splitting the columns of B across several workers.
//!
//! ## Algorithm Components
//!
//! 1. **Transpose**: the left operand is transposed once (counting sort)
//!    and shared with every worker.
//!
//! 2. **Column partitioning**: columns of B are split into contiguous
//!    blocks whose sizes differ by at most one.
//!
//! 3. **Sparse accumulator kernel**: each block of the product is built
//!    column by column by adding scaled columns of A into dense work
//!    arrays that are tagged per column rather than cleared. Values with
//!    magnitude at or below `1e-10` are dropped.
//!
//! 4. **Assembly**: blocks are concatenated in worker order with shifted
//!    column pointers.
//!
//! ## Backends
//!
//! - **Sequential**: one block, no distribution.
//! - **Parallel**: blocks on a Rayon pool sharing one transpose.
//! - **Distributed**: message-passing ranks; rank 0 broadcasts the
//!   transpose and gathers every rank's block in rank order.
//!
//! ## Usage
//!
//! ```
//! use ccs_spgemm::{CscMatrix, SpgemmConfig, Backend, spgemm};
//!
//! // [[1 0], [0 2]] times the identity
//! let a = CscMatrix::new(2, 2, vec![0, 1, 2], vec![0, 1], vec![1.0, 2.0]);
//! let b = CscMatrix::identity(2);
//!
//! let config = SpgemmConfig::with_workers(Backend::Distributed, 2);
//! let c = spgemm(&a, &b, &config).unwrap();
//!
//! assert_eq!(c, a);
//! ```

pub mod accumulator;
pub mod assemble;
pub mod comm;
pub mod constants;
pub mod driver;
pub mod error;
pub mod matrix;
pub mod parallel;
pub mod partition;
pub mod utils;

// Re-export primary components
pub use accumulator::{multiply_local, SparseAccumulator};
pub use assemble::{assemble, slice_offsets, SliceOffsets};
pub use comm::{create_world, run_world, Communicator, Message};
pub use driver::{
    multiply_distributed, multiply_sequential, run_task, validate_shapes, DistributedSpgemm,
    Phase, SequentialSpgemm, SpgemmTask,
};
pub use error::{Result, SpgemmError};
pub use matrix::{
    approx_equal, approx_equal_default, reference_dense_product, reference_spgemm, Backend,
    CscBuilder, CscMatrix, SpgemmConfig, SystemParameters,
};
pub use parallel::multiply_parallel;
pub use partition::{
    extract_local_columns, partition_columns, split_columns, ColumnPartition, LocalColumns,
};
pub use utils::{from_sprs_csc, to_sprs_csc};

/// Performs sparse general matrix-matrix multiplication (SpGEMM)
/// with the backend chosen in `config`.
///
/// This is the main entry point for the library.
///
/// # Arguments
///
/// * `a` - Left input matrix in CSC format
/// * `b` - Right input matrix in CSC format
/// * `config` - Backend and worker count
///
/// # Returns
///
/// The result matrix C = A×B in CSC format, or the first error raised by
/// any worker.
pub fn spgemm(a: &CscMatrix, b: &CscMatrix, config: &SpgemmConfig) -> Result<CscMatrix> {
    let n_workers = config.effective_workers();
    log::debug!(
        "spgemm {}×{} by {}×{} on {:?} with {} workers",
        a.rows,
        a.cols,
        b.rows,
        b.cols,
        config.backend,
        n_workers
    );

    match config.backend {
        Backend::Sequential => multiply_sequential(a, b),
        Backend::Parallel => multiply_parallel(a, b, n_workers),
        Backend::Distributed => multiply_distributed(a, b, n_workers),
    }
}

/// Version information for the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
