//! Error types for the expiring map
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the expiring map.
///
/// Construction is the only fallible step; every other cache operation is
/// total and reports absence through `Option`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Capacity was zero, negative, or not representable as `usize`
    #[error("Invalid capacity: {0} (must be a positive integer)")]
    InvalidCapacity(String),
}

// == Result Type Alias ==
/// Convenience Result type for the expiring map.
pub type Result<T> = std::result::Result<T, CacheError>;
