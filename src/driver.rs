//! Task lifecycle and orchestration of a multiplication request
//!
//! A request moves through
//! `Init → ValidateShapes → [BroadcastTranspose] → PartitionAndExtract →
//! LocalMultiply → (GatherAndAssemble | AssembleSingle) → Done`.
//! The bracketed phase and the gather only happen with several ranks.

use log::{debug, error, warn};

use crate::accumulator::multiply_local;
use crate::assemble::assemble;
use crate::comm::{run_world, Communicator};
use crate::constants::COORDINATOR_RANK;
use crate::error::{Result, SpgemmError};
use crate::matrix::CscMatrix;
use crate::partition::{extract_local_columns, split_columns};

/// Phases of one multiplication request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    ValidateShapes,
    BroadcastTranspose,
    PartitionAndExtract,
    LocalMultiply,
    GatherAndAssemble,
    AssembleSingle,
    Done,
}

/// Lifecycle hooks invoked by an external task runner
pub trait SpgemmTask {
    /// Checks that `a × b` is defined and both operands are non-empty
    fn validate(&self, a: &CscMatrix, b: &CscMatrix) -> bool {
        validate_shapes(a, b).is_ok()
    }

    /// Reserved for the caller's lifecycle; does nothing
    fn prepare(&mut self) -> bool {
        true
    }

    /// Computes the product
    fn execute(&mut self, a: &CscMatrix, b: &CscMatrix) -> Result<CscMatrix>;

    /// Checks the post-condition on the value returned by `execute`
    fn finalize(&self, result: &CscMatrix) -> bool;
}

/// Validates operand shapes for multiplication
///
/// Both operands must have non-zero dimensions and `a.cols == b.rows`.
pub fn validate_shapes(a: &CscMatrix, b: &CscMatrix) -> Result<()> {
    for (operand, m) in [("A", a), ("B", b)] {
        if m.rows == 0 || m.cols == 0 {
            return Err(SpgemmError::InvalidDimensions {
                operand,
                rows: m.rows,
                cols: m.cols,
            });
        }
    }
    if a.cols != b.rows {
        return Err(SpgemmError::ShapeMismatch {
            a_rows: a.rows,
            a_cols: a.cols,
            b_rows: b.rows,
            b_cols: b.cols,
        });
    }
    Ok(())
}

/// Post-condition for the rank that holds the product
fn is_valid_product(result: &CscMatrix) -> bool {
    result.rows > 0 && result.cols > 0 && result.col_ptrs.len() == result.cols + 1
}

/// Single-worker multiplication: one whole-range partition, no messaging
#[derive(Debug)]
pub struct SequentialSpgemm {
    phase: Phase,
}

impl SequentialSpgemm {
    pub fn new() -> Self {
        Self { phase: Phase::Init }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}

impl Default for SequentialSpgemm {
    fn default() -> Self {
        Self::new()
    }
}

impl SpgemmTask for SequentialSpgemm {
    fn execute(&mut self, a: &CscMatrix, b: &CscMatrix) -> Result<CscMatrix> {
        self.phase = Phase::ValidateShapes;
        validate_shapes(a, b)?;

        self.phase = Phase::PartitionAndExtract;
        let at = a.transpose();
        let partition = split_columns(b.cols, 0, 1);
        let local = extract_local_columns(b, partition);

        self.phase = Phase::LocalMultiply;
        let partial = multiply_local(&at, &local)?;

        self.phase = Phase::AssembleSingle;
        let product = assemble(a.rows, &[partial], Some(b.cols))?;

        self.phase = Phase::Done;
        Ok(product)
    }

    fn finalize(&self, result: &CscMatrix) -> bool {
        is_valid_product(result)
    }
}

/// One rank of a distributed multiplication
///
/// Every rank holds both operands. The coordinator transposes A once and
/// broadcasts it; each rank multiplies its own block of B's columns and
/// the coordinator gathers the slices in rank order. Non-coordinating
/// ranks return the 0×0 placeholder.
pub struct DistributedSpgemm {
    comm: Communicator,
    phase: Phase,
}

impl DistributedSpgemm {
    pub fn new(comm: Communicator) -> Self {
        Self {
            comm,
            phase: Phase::Init,
        }
    }

    pub fn rank(&self) -> usize {
        self.comm.rank()
    }

    pub fn is_coordinator(&self) -> bool {
        self.comm.rank() == COORDINATOR_RANK
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}

impl SpgemmTask for DistributedSpgemm {
    fn execute(&mut self, a: &CscMatrix, b: &CscMatrix) -> Result<CscMatrix> {
        let rank = self.comm.rank();
        let size = self.comm.size();

        self.phase = Phase::ValidateShapes;
        validate_shapes(a, b)?;

        self.phase = Phase::BroadcastTranspose;
        let at = self.is_coordinator().then(|| a.transpose());
        let at = self.comm.broadcast_matrix(COORDINATOR_RANK, at)?;
        if at.rows != a.cols || at.cols != a.rows {
            return Err(SpgemmError::InvalidStructure(format!(
                "broadcast transpose is {}×{}, expected {}×{}",
                at.rows, at.cols, a.cols, a.rows
            )));
        }

        self.phase = Phase::PartitionAndExtract;
        let partition = split_columns(b.cols, rank, size);
        let local = extract_local_columns(b, partition);
        debug!(
            "rank {} owns columns {:?} ({} entries)",
            rank,
            partition.range(),
            local.nnz()
        );

        self.phase = Phase::LocalMultiply;
        let partial = multiply_local(&at, &local)?;

        self.phase = Phase::GatherAndAssemble;
        let product = match self.comm.gather_partials(COORDINATOR_RANK, partial, a.rows)? {
            Some(partials) => assemble(a.rows, &partials, Some(b.cols))?,
            None => CscMatrix::placeholder(),
        };

        self.phase = Phase::Done;
        Ok(product)
    }

    fn finalize(&self, result: &CscMatrix) -> bool {
        if self.is_coordinator() {
            is_valid_product(result)
        } else {
            result.is_placeholder()
        }
    }
}

/// Drives a task through validate, prepare, execute and finalize
///
/// Returns `None` if any step fails; the reason is logged.
pub fn run_task<T: SpgemmTask>(task: &mut T, a: &CscMatrix, b: &CscMatrix) -> Option<CscMatrix> {
    if !task.validate(a, b) {
        warn!(
            "validation failed for {}×{} times {}×{}",
            a.rows, a.cols, b.rows, b.cols
        );
        return None;
    }
    if !task.prepare() {
        warn!("prepare failed");
        return None;
    }
    let result = match task.execute(a, b) {
        Ok(result) => result,
        Err(err) => {
            error!("execution failed: {}", err);
            return None;
        }
    };
    if !task.finalize(&result) {
        warn!("post-condition failed on {}×{} result", result.rows, result.cols);
        return None;
    }
    Some(result)
}

/// Multiplies with a single worker
pub fn multiply_sequential(a: &CscMatrix, b: &CscMatrix) -> Result<CscMatrix> {
    SequentialSpgemm::new().execute(a, b)
}

/// Multiplies across `n_workers` message-passing ranks
///
/// Every rank must succeed; the first failing rank's error is returned and
/// no partial product is ever exposed.
pub fn multiply_distributed(a: &CscMatrix, b: &CscMatrix, n_workers: usize) -> Result<CscMatrix> {
    let results = run_world(n_workers, |comm| DistributedSpgemm::new(comm).execute(a, b))?;

    let mut product = None;
    for (rank, result) in results.into_iter().enumerate() {
        let matrix = result?;
        if rank == COORDINATOR_RANK {
            product = Some(matrix);
        }
    }

    product.ok_or_else(|| SpgemmError::InvalidWorkers(format!("no coordinator among {n_workers} ranks")))
}
