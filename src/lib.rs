//! Complex-valued matrices backed by a footprint-keyed object cache.
//!
//! This crate targets resource-constrained environments where hitting the
//! general-purpose allocator for every short-lived matrix is undesirable.
//! Released matrices are parked in a thread-safe cache keyed by their exact
//! byte footprint, and later allocations of equal footprint reuse them
//! without touching the general allocator.
//!
//! # Key Concepts
//!
//! - **Footprint**: header plus row-major body size in bytes; the cache's
//!   matching key. Shapes with equal element counts (2x3 and 3x2) share one.
//! - **Peer chain**: the free objects of one footprint, vended
//!   last-released-first.
//! - **Ownership**: a matrix is owned by exactly one party at a time, a
//!   client while live or the cache while free. Release consumes the handle.
//!
//! # Modules
//!
//! - [`error`]: Error types for the cache and the arithmetic layer
//! - [`memory`]: Object model, size index, and allocator facade
//! - [`ops`]: Matrix arithmetic implemented as cache clients
//! - [`types`]: The element type and footprint arithmetic
//!
//! # Example
//!
//! ```
//! use braket::prelude::*;
//!
//! let cache = MatrixCache::new();
//! let mut a = cache.allocate(2, 2)?;
//! a[(0, 1)] = Element::new(1.0, -1.0);
//!
//! let t = braket::ops::transpose(&cache, &a)?;
//! assert_eq!(t[(1, 0)], Element::new(1.0, -1.0));
//!
//! cache.release(a);
//! cache.release(t);
//! cache.bulk_reclaim();
//! # Ok::<(), braket::MatrixError>(())
//! ```

pub mod error;
pub mod memory;
pub mod ops;
pub mod types;

// Re-export commonly used items at the crate root
pub use error::{CacheError, MatrixError, Result};
pub use memory::{CacheFault, FaultReason, Matrix, MatrixCache};
pub use types::{footprint, Element};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use braket::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{CacheError, MatrixError, Result};
    pub use crate::memory::{CacheFault, FaultReason, Matrix, MatrixCache};
    pub use crate::ops;
    pub use crate::types::{footprint, Element, ELEMENT_BYTES, HEADER_BYTES, MIN_FOOTPRINT};
}
