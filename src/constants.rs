//! Centralized constants for the CSC multiplication library
//!
//! All numeric thresholds and fixed ranks live here rather than being
//! scattered through the kernels.

// ============================================================================
// NUMERIC THRESHOLDS
// ============================================================================

/// Accumulated products with magnitude at or below this are dropped
pub const EPSILON: f64 = 1e-10;

/// Default per-entry tolerance when comparing two matrices densely
pub const COMPARE_TOLERANCE: f64 = 1e-6;

// ============================================================================
// DISTRIBUTION
// ============================================================================

/// Rank that transposes A, broadcasts it, and gathers the partial products
pub const COORDINATOR_RANK: usize = 0;

// ============================================================================
// SPARSE ACCUMULATOR
// ============================================================================

/// Marker value meaning "row not touched by any column yet"
pub const UNMARKED_ROW: i64 = -1;

// ============================================================================
// DEBUG OUTPUT
// ============================================================================

/// Columns shown by the `Debug` implementation before eliding
pub const DEBUG_MAX_COLUMNS: usize = 5;

/// Entries per column shown by the `Debug` implementation before eliding
pub const DEBUG_MAX_ENTRIES: usize = 5;
