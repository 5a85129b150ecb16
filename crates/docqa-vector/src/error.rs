//! Error types for docqa-vector.

use thiserror::Error;

/// Result type for docqa-vector operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in docqa-vector operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Attempted to build an index from zero vectors.
    #[error("Cannot build an index from an empty vector set")]
    EmptyInput,

    /// Search was invoked before any successful build.
    #[error("Index not built yet")]
    IndexNotBuilt,

    /// Dimension mismatch between a vector and the index.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions.
        expected: usize,
        /// Actual dimensions provided.
        actual: usize,
    },

    /// Invalid vector (e.g., zero-dimensional, contains NaN).
    #[error("Invalid vector: {0}")]
    InvalidVector(String),
}
