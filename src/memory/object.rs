//! The matrix object: a shape header plus a flat row-major body.
//!
//! A [`Matrix`] is one contiguous buffer of complex elements owned either by
//! a client (live) or by the cache (while free). Element `(r, c)` lives at
//! flat offset `r * columns + c`.

use num_traits::Zero;

use crate::types::{footprint, Element};

/// Body storage for one matrix: a flat buffer of complex elements whose
/// capacity is sized by footprint, not by shape.
pub(crate) type Body = Vec<Element>;

/// A complex-valued matrix vended by a [`MatrixCache`](crate::memory::MatrixCache).
///
/// The handle owns its storage exclusively. Releasing it back to the cache
/// consumes the handle, so use-after-release is a compile error rather than
/// the caller-side null-overwrite convention of pointer-based designs.
#[derive(Debug)]
pub struct Matrix {
    rows: usize,
    columns: usize,
    body: Body,
}

impl Matrix {
    /// Prepare a body for a client: zero the elements and write the header.
    ///
    /// Runs on every vend, pooled or fresh, because a pooled body carries
    /// whatever the previous owner left in it.
    pub(crate) fn vend(mut body: Body, rows: usize, columns: usize) -> Self {
        body.clear();
        body.resize(rows * columns, Element::zero());
        Self {
            rows,
            columns,
            body,
        }
    }

    /// Surrender the body so the cache can chain it.
    pub(crate) fn into_body(self) -> Body {
        self.body
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Total byte footprint of this object (header plus body, padded).
    ///
    /// Recomputed from the header alone; this is the key under which a
    /// released object re-enters the cache.
    pub fn footprint(&self) -> usize {
        footprint(self.rows, self.columns)
    }

    /// Flat offset of element `(row, column)` within the body.
    pub fn offset(&self, row: usize, column: usize) -> usize {
        row * self.columns + column
    }

    /// Fast element access: no shape check.
    ///
    /// A coordinate outside the shape either aliases another element of the
    /// flattened body or panics at the body boundary; it is never read out of
    /// bounds. Production arithmetic uses this path, tests use [`get`](Self::get).
    pub fn at(&self, row: usize, column: usize) -> &Element {
        &self.body[self.offset(row, column)]
    }

    /// Fast mutable element access: no shape check.
    pub fn at_mut(&mut self, row: usize, column: usize) -> &mut Element {
        let offset = self.offset(row, column);
        &mut self.body[offset]
    }

    /// Checked element access: `None` when `row >= rows` or `column >= columns`.
    pub fn get(&self, row: usize, column: usize) -> Option<&Element> {
        if row < self.rows && column < self.columns {
            Some(self.at(row, column))
        } else {
            None
        }
    }

    /// Checked mutable element access.
    pub fn get_mut(&mut self, row: usize, column: usize) -> Option<&mut Element> {
        if row < self.rows && column < self.columns {
            Some(self.at_mut(row, column))
        } else {
            None
        }
    }

    /// The row-major body as a slice.
    pub fn body(&self) -> &[Element] {
        &self.body
    }

    /// The row-major body as a mutable slice.
    pub fn body_mut(&mut self) -> &mut [Element] {
        &mut self.body
    }

    /// Base address of the body buffer.
    ///
    /// Stable for the lifetime of the object and preserved across a
    /// release/allocate round trip of equal footprint; tests use it to verify
    /// reuse identity.
    pub fn as_ptr(&self) -> *const Element {
        self.body.as_ptr()
    }
}

impl std::ops::Index<(usize, usize)> for Matrix {
    type Output = Element;

    fn index(&self, (row, column): (usize, usize)) -> &Element {
        self.at(row, column)
    }
}

impl std::ops::IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, column): (usize, usize)) -> &mut Element {
        self.at_mut(row, column)
    }
}
