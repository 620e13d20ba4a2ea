//! Type definitions and aliases for complex matrix storage.
//!
//! This module fixes the element type used throughout the library and the
//! byte-level constants derived from it.

use num_complex::Complex64;

/// The element type of every matrix: a double-precision complex number.
pub type Element = Complex64;

/// Size in bytes of one matrix element.
pub const ELEMENT_BYTES: usize = std::mem::size_of::<Element>();

/// Size in bytes of a matrix header (row count plus column count).
pub const HEADER_BYTES: usize = 2 * std::mem::size_of::<usize>();

/// Smallest footprint the cache ever keys on.
///
/// Every footprint is raised to at least this value, so even degenerate
/// shapes (0x0, 1x1) are backed by a real allocation whose identity survives
/// a trip through the cache.
pub const MIN_FOOTPRINT: usize = HEADER_BYTES + 2 * ELEMENT_BYTES;

/// Total byte size of one matrix object: header plus row-major body, raised
/// to [`MIN_FOOTPRINT`].
///
/// This is the cache's matching key. Two shapes with the same element count
/// (for example 2x3 and 3x2) share a footprint and therefore share a pool.
///
/// Saturates instead of overflowing for absurd shapes; no such footprint can
/// be backed, so the general allocator refuses it downstream and the request
/// surfaces as an allocation failure rather than a panic.
pub fn footprint(rows: usize, columns: usize) -> usize {
    rows.saturating_mul(columns)
        .saturating_mul(ELEMENT_BYTES)
        .saturating_add(HEADER_BYTES)
        .max(MIN_FOOTPRINT)
}

/// Number of elements a body buffer must hold to back `footprint` bytes.
pub(crate) fn body_capacity(footprint: usize) -> usize {
    (footprint - HEADER_BYTES) / ELEMENT_BYTES
}
