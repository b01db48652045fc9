//! Structured error taxonomy for the index's public API.
//!
//! Failures a caller can act on (bad dimensions, undersized output buffers,
//! out-of-range parameters) are reported as [`IndexError`] values. A query
//! issued before `build()` is not an error: it is documented degenerate
//! behavior that zero-fills the output buffer.

use thiserror::Error;

/// Errors returned by the public [`crate::HnswIndex`] operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    /// `build()` was called with a dimension of zero.
    #[error("dimension must be greater than zero")]
    InvalidDimension,

    /// The flattened base array length is not a multiple of `dim`.
    #[error("base vector length {base_len} is not a multiple of dimension {dim}")]
    BaseLengthMismatch {
        /// Length of the flattened base array, in `f32` elements.
        base_len: usize,
        /// Declared dimensionality.
        dim: usize,
    },

    /// `search()` was called with an output buffer of the wrong length.
    #[error("output buffer length {actual} does not match the required length {expected}")]
    OutputLengthMismatch {
        /// Required output length.
        expected: usize,
        /// Actual length the caller supplied.
        actual: usize,
    },

    /// The query vector's length does not match the index's dimension.
    #[error("query length {actual} does not match index dimension {expected}")]
    QueryDimensionMismatch {
        /// Expected length, equal to the index's dimension.
        expected: usize,
        /// Actual length of the supplied query.
        actual: usize,
    },

    /// `set_parameters()` was given a non-positive `M`, `ef_construction`, or `ef_search`.
    #[error("M, ef_construction and ef_search must all be greater than zero")]
    InvalidParameters,

    /// `set_parameters()` was called after `build()`.
    #[error("parameters cannot be changed after build() has run")]
    ParametersLocked,

    /// `build()` was called more than once on the same index.
    #[error("build() has already been called on this index")]
    AlreadyBuilt,
}

/// Convenience alias for results returned by the index's public API.
pub type Result<T> = std::result::Result<T, IndexError>;
