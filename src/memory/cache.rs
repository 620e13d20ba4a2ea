//! The allocator facade: footprint-keyed reuse in front of the general
//! allocator.
//!
//! A [`MatrixCache`] vends [`Matrix`] objects, preferring a cached body of
//! exactly the requested footprint and falling back to a fresh fallible
//! allocation on a miss. One mutex serializes all index mutation; the lock
//! covers exactly the search-plus-mutate pair and is never held across the
//! general-allocator call or body initialization.

use std::io::Write;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::{error, trace};

use crate::error::{CacheError, Result};
use crate::memory::index::{CacheFault, SizeIndex};
use crate::memory::object::{Body, Matrix};
use crate::types::{body_capacity, footprint};

/// Process-wide default cache, shared by convention.
static GLOBAL: Lazy<MatrixCache> = Lazy::new(MatrixCache::new);

/// Thread-safe object cache for complex matrices.
///
/// Cloning yields another handle to the same underlying cache. Independent
/// caches may be constructed freely for test isolation; a single top-level
/// instance exists by convention via [`global`](Self::global).
#[derive(Debug, Clone, Default)]
pub struct MatrixCache {
    index: Arc<Mutex<SizeIndex>>,
}

impl MatrixCache {
    /// Create a new, empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide default instance.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Allocate a zeroed `rows` x `columns` matrix.
    ///
    /// Reuses a cached body of the same byte footprint when one exists;
    /// otherwise asks the general allocator for exactly that footprint.
    /// Allocator refusal comes back as [`CacheError::AllocationFailed`] and
    /// is never retried. The body is zeroed on every vend, pooled or fresh.
    pub fn allocate(&self, rows: usize, columns: usize) -> Result<Matrix> {
        let bytes = footprint(rows, columns);
        let pooled = self.index.lock().remove_one_of_size(bytes);
        let body = match pooled {
            Some(body) => {
                trace!(bytes, "vending cached body");
                body
            }
            None => {
                trace!(bytes, "cache miss, allocating fresh body");
                fresh_body(bytes)?
            }
        };
        Ok(Matrix::vend(body, rows, columns))
    }

    /// Return a matrix to the cache for later reuse.
    ///
    /// The footprint is recomputed from the object's own header. Consuming
    /// the handle makes use-after-release unrepresentable at the call site.
    pub fn release(&self, matrix: Matrix) {
        let bytes = matrix.footprint();
        let body = matrix.into_body();
        self.index.lock().insert_or_chain(bytes, body);
    }

    /// Empty the cache back to the general allocator.
    ///
    /// Intended for shutdown and test teardown. Unsupported while any live
    /// handle remains that will later be released into this cache; that is
    /// an out-of-contract hazard, not defended against.
    pub fn bulk_reclaim(&self) {
        let detached = self.index.lock().detach();
        // Freeing happens outside the critical section.
        drop(detached);
    }

    /// Verify the index is well-formed; first malformed entry or `None`.
    ///
    /// Never runs automatically: the hot path trades continuous
    /// self-checking for speed.
    pub fn audit(&self) -> Option<CacheFault> {
        self.index.lock().audit()
    }

    /// Write a human-readable listing of the cache to `sink` and return the
    /// total cached byte count.
    ///
    /// Audits first and fails with [`CacheError::Corrupted`] rather than
    /// enumerating a malformed index.
    pub fn dump<W: Write>(&self, sink: &mut W) -> Result<usize> {
        let index = self.index.lock();
        if let Some(fault) = index.audit() {
            return Err(CacheError::Corrupted { fault });
        }
        let mut total = 0;
        writeln!(sink, "cache: begin")?;
        for (bytes, chain) in index.entries() {
            write!(sink, "cache: [{bytes}]")?;
            for body in chain {
                write!(sink, " @{:p}", body.as_ptr())?;
                total += bytes;
            }
            writeln!(sink)?;
        }
        writeln!(sink, "cache: end, {total} bytes")?;
        Ok(total)
    }

    /// Total bytes currently cached.
    pub fn cached_bytes(&self) -> usize {
        self.index.lock().cached_bytes()
    }

    /// Number of free objects currently cached.
    pub fn cached_objects(&self) -> usize {
        self.index.lock().cached_objects()
    }

    /// Number of distinct footprints currently cached.
    pub fn distinct_footprints(&self) -> usize {
        self.index.lock().distinct_footprints()
    }
}

/// Ask the general allocator for a body backing exactly `bytes`.
fn fresh_body(bytes: usize) -> Result<Body> {
    let mut body = Body::new();
    if let Err(source) = body.try_reserve_exact(body_capacity(bytes)) {
        error!(bytes, "general allocator refused the request");
        return Err(CacheError::AllocationFailed { bytes, source });
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    use crate::types::Element;

    #[test]
    fn allocate_vends_the_requested_shape_zeroed() {
        let cache = MatrixCache::new();
        let m = cache.allocate(2, 3).unwrap();

        assert_eq!(m.rows(), 2);
        assert_eq!(m.columns(), 3);
        assert!(m.body().iter().all(Element::is_zero));
        // Nothing cached until something is released.
        assert_eq!(cache.cached_objects(), 0);
    }

    #[test]
    fn release_then_allocate_reuses_the_body() {
        let cache = MatrixCache::new();
        let m = cache.allocate(4, 4).unwrap();
        let ptr = m.as_ptr();

        cache.release(m);
        assert_eq!(cache.cached_objects(), 1);

        let again = cache.allocate(4, 4).unwrap();
        assert_eq!(again.as_ptr(), ptr);
        assert_eq!(cache.cached_objects(), 0);
    }

    #[test]
    fn reuse_crosses_shapes_of_equal_footprint() {
        let cache = MatrixCache::new();
        let wide = cache.allocate(2, 3).unwrap();
        let ptr = wide.as_ptr();

        cache.release(wide);
        let tall = cache.allocate(3, 2).unwrap();

        assert_eq!(tall.as_ptr(), ptr);
        assert_eq!(tall.rows(), 3);
        assert_eq!(tall.columns(), 2);
    }

    #[test]
    fn pooled_bodies_are_rezeroed_on_vend() {
        let cache = MatrixCache::new();
        let mut m = cache.allocate(2, 2).unwrap();
        for e in m.body_mut() {
            *e = Element::new(7.0, -7.0);
        }

        cache.release(m);
        let again = cache.allocate(2, 2).unwrap();
        assert!(again.body().iter().all(Element::is_zero));
    }

    #[test]
    fn bulk_reclaim_empties_the_cache() {
        let cache = MatrixCache::new();
        for _ in 0..3 {
            let m = cache.allocate(3, 3).unwrap();
            cache.release(m);
        }
        let m = cache.allocate(5, 1).unwrap();
        cache.release(m);
        assert!(cache.cached_bytes() > 0);

        cache.bulk_reclaim();
        assert_eq!(cache.cached_bytes(), 0);
        assert_eq!(cache.distinct_footprints(), 0);
        assert_eq!(cache.audit(), None);
    }

    #[test]
    fn dump_reports_the_cached_total() {
        let cache = MatrixCache::new();
        let a = cache.allocate(2, 3).unwrap();
        let b = cache.allocate(3, 2).unwrap();
        let c = cache.allocate(0, 0).unwrap();
        let expected = a.footprint() + b.footprint() + c.footprint();
        cache.release(a);
        cache.release(b);
        cache.release(c);

        let mut listing = Vec::new();
        let total = cache.dump(&mut listing).unwrap();

        assert_eq!(total, expected);
        assert_eq!(total, cache.cached_bytes());
        let text = String::from_utf8(listing).unwrap();
        assert!(text.starts_with("cache: begin"));
        assert!(text.contains(&format!("end, {total} bytes")));
    }

    #[test]
    fn clones_share_one_cache() {
        let cache = MatrixCache::new();
        let alias = cache.clone();

        let m = cache.allocate(6, 6).unwrap();
        let ptr = m.as_ptr();
        alias.release(m);

        assert_eq!(cache.allocate(6, 6).unwrap().as_ptr(), ptr);
    }

    #[test]
    fn global_is_one_instance() {
        let m = MatrixCache::global().allocate(1, 1).unwrap();
        MatrixCache::global().release(m);
        assert!(MatrixCache::global().cached_objects() >= 1);
        MatrixCache::global().bulk_reclaim();
    }
}
