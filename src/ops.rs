//! Matrix arithmetic, implemented as clients of the cache.
//!
//! Every operation validates operand shapes first, allocates exactly one
//! result matrix from the injected [`MatrixCache`], then fills it with
//! ordinary nested-loop arithmetic over the flat bodies. Operations never
//! release their operands; what a caller allocated, the caller releases.

use num_traits::Zero;

use crate::error::{MatrixError, Result};
use crate::memory::{Matrix, MatrixCache};
use crate::types::Element;

/// `rows x columns` rendering of a shape for error messages.
fn shape_of(m: &Matrix) -> String {
    format!("{}x{}", m.rows(), m.columns())
}

/// Require two operands of identical shape; returns that shape.
fn elementwise_shape(a: &Matrix, b: &Matrix) -> Result<(usize, usize), MatrixError> {
    if a.rows() != b.rows() || a.columns() != b.columns() {
        return Err(MatrixError::shape_mismatch(shape_of(a), shape_of(b)));
    }
    Ok((a.rows(), a.columns()))
}

/// Transpose: `out(c, r) = a(r, c)`.
pub fn transpose(cache: &MatrixCache, a: &Matrix) -> Result<Matrix, MatrixError> {
    let mut out = cache.allocate(a.columns(), a.rows())?;
    for row in 0..a.rows() {
        for column in 0..a.columns() {
            *out.at_mut(column, row) = *a.at(row, column);
        }
    }
    Ok(out)
}

/// Elementwise sum of two equal-shape matrices.
pub fn add(cache: &MatrixCache, a: &Matrix, b: &Matrix) -> Result<Matrix, MatrixError> {
    let (rows, columns) = elementwise_shape(a, b)?;
    let mut out = cache.allocate(rows, columns)?;
    for row in 0..rows {
        for column in 0..columns {
            *out.at_mut(row, column) = *a.at(row, column) + *b.at(row, column);
        }
    }
    Ok(out)
}

/// Elementwise difference of two equal-shape matrices.
pub fn sub(cache: &MatrixCache, a: &Matrix, b: &Matrix) -> Result<Matrix, MatrixError> {
    let (rows, columns) = elementwise_shape(a, b)?;
    let mut out = cache.allocate(rows, columns)?;
    for row in 0..rows {
        for column in 0..columns {
            *out.at_mut(row, column) = *a.at(row, column) - *b.at(row, column);
        }
    }
    Ok(out)
}

/// Matrix product: inner dimensions must agree.
pub fn mul(cache: &MatrixCache, a: &Matrix, b: &Matrix) -> Result<Matrix, MatrixError> {
    if a.columns() != b.rows() {
        return Err(MatrixError::shape_mismatch(
            format!("{}xN", a.columns()),
            shape_of(b),
        ));
    }
    let mut out = cache.allocate(a.rows(), b.columns())?;
    for row in 0..a.rows() {
        for column in 0..b.columns() {
            let mut sum = Element::zero();
            for inner in 0..a.columns() {
                sum += *a.at(row, inner) * *b.at(inner, column);
            }
            *out.at_mut(row, column) = sum;
        }
    }
    Ok(out)
}

/// Hadamard (elementwise) product of two equal-shape matrices.
pub fn hadamard(cache: &MatrixCache, a: &Matrix, b: &Matrix) -> Result<Matrix, MatrixError> {
    let (rows, columns) = elementwise_shape(a, b)?;
    let mut out = cache.allocate(rows, columns)?;
    for row in 0..rows {
        for column in 0..columns {
            *out.at_mut(row, column) = *a.at(row, column) * *b.at(row, column);
        }
    }
    Ok(out)
}

/// Kronecker product: every element of `a` scales a full copy of `b`.
pub fn kronecker(cache: &MatrixCache, a: &Matrix, b: &Matrix) -> Result<Matrix, MatrixError> {
    let mut out = cache.allocate(a.rows() * b.rows(), a.columns() * b.columns())?;
    for a_row in 0..a.rows() {
        for a_column in 0..a.columns() {
            let scale = *a.at(a_row, a_column);
            for b_row in 0..b.rows() {
                for b_column in 0..b.columns() {
                    *out.at_mut(a_row * b.rows() + b_row, a_column * b.columns() + b_column) =
                        scale * *b.at(b_row, b_column);
                }
            }
        }
    }
    Ok(out)
}
