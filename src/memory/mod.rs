//! Memory management: the matrix object model, the size index, and the
//! allocator facade in front of the general allocator.

pub mod cache;
pub mod index;
pub mod object;

// Re-export key items
pub use cache::MatrixCache;
pub use index::{CacheFault, FaultReason};
pub use object::Matrix;
