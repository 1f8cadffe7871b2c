//! Error types for CSC sparse matrix multiplication

use thiserror::Error;

/// Result type alias using the crate's error type
pub type Result<T> = std::result::Result<T, SpgemmError>;

/// Errors that can occur while building or multiplying CSC matrices
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpgemmError {
    /// The inner dimensions of the operands disagree
    #[error("Shape mismatch: A is {a_rows}×{a_cols}, B is {b_rows}×{b_cols}")]
    ShapeMismatch {
        a_rows: usize,
        a_cols: usize,
        b_rows: usize,
        b_cols: usize,
    },

    /// An operand has a zero dimension
    #[error("Invalid dimensions {rows}×{cols} for operand {operand}")]
    InvalidDimensions {
        operand: &'static str,
        rows: usize,
        cols: usize,
    },

    /// The raw CSC arrays violate a structural invariant
    #[error("Invalid CSC structure: {0}")]
    InvalidStructure(String),

    /// A peer rank could not be reached during a collective operation
    #[error("Communication failure between rank {from} and rank {to}: {reason}")]
    Communication {
        from: usize,
        to: usize,
        reason: String,
    },

    /// A message arrived out of the fixed protocol order
    #[error("Protocol violation from rank {source_rank}: expected {expected}, got {got}")]
    Protocol {
        source_rank: usize,
        expected: &'static str,
        got: &'static str,
    },

    /// A worker configuration that cannot run
    #[error("Invalid worker configuration: {0}")]
    InvalidWorkers(String),

    /// Failure to build the worker thread pool
    #[error("Execution error: {0}")]
    Execution(String),
}

impl SpgemmError {
    /// Create an error for a raw array length that disagrees with the shape
    pub fn length_mismatch(what: &str, expected: usize, actual: usize) -> Self {
        Self::InvalidStructure(format!(
            "{what} has length {actual}, expected {expected}"
        ))
    }

    /// Create an error for a peer that hung up
    pub fn disconnected(from: usize, to: usize) -> Self {
        Self::Communication {
            from,
            to,
            reason: "peer disconnected".to_string(),
        }
    }
}
