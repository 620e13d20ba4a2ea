//! Error types for the cache and the matrix operations built on it.
//!
//! Recoverable conditions (allocator refusal, sink failure, detected
//! corruption) come back as values; the cache never aborts the process on
//! them. Precondition violations such as reclaiming the cache while live
//! handles remain are out of contract and are not runtime-checked.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::memory::index::CacheFault;

/// Errors that can occur while allocating from or inspecting the cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The general allocator could not satisfy a request.
    ///
    /// Reported once through the diagnostic layer and returned to the
    /// caller; never retried automatically.
    #[error("allocation of {bytes} bytes failed")]
    AllocationFailed {
        /// Footprint of the refused request.
        bytes: usize,
        /// The underlying reservation failure.
        #[source]
        source: TryReserveError,
    },

    /// An explicit audit found a malformed index entry.
    ///
    /// Only ever produced by [`audit`](crate::memory::MatrixCache::audit) or
    /// [`dump`](crate::memory::MatrixCache::dump); the hot path performs no
    /// integrity checking.
    #[error("cache corrupted: {fault}")]
    Corrupted {
        /// The first malformed entry encountered.
        fault: CacheFault,
    },

    /// The sink handed to [`dump`](crate::memory::MatrixCache::dump) failed.
    #[error("dump sink failed")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during matrix arithmetic.
#[derive(Debug, Error)]
pub enum MatrixError {
    /// Operand shapes are incompatible with the requested operation.
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// The shape the operation required.
        expected: String,
        /// The shape it was given.
        actual: String,
    },

    /// Allocating the result matrix failed.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl MatrixError {
    /// Create a `ShapeMismatch` error.
    pub fn shape_mismatch<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: std::fmt::Display,
        S2: std::fmt::Display,
    {
        Self::ShapeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Result alias used throughout the library.
pub type Result<T, E = CacheError> = std::result::Result<T, E>;
