//! Accumulator for sparse matrix multiplication
//!
//! The product is built one column slice at a time with a sparse
//! accumulator whose dense work arrays are allocated once per slice and
//! tagged with the current column instead of being cleared.

pub mod spa;

pub use spa::{multiply_local, SparseAccumulator};
