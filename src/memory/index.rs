//! The size index: an ordered map from byte footprint to a peer chain of
//! free bodies sharing exactly that footprint.
//!
//! The index orders entries strictly by footprint, never by address. Its
//! size bounds the number of *distinct* footprints ever freed, not the
//! number of free objects: peers of an existing footprint chain onto the
//! entry in O(1) after the search.

use std::collections::BTreeMap;
use std::fmt;

use crate::memory::object::Body;
use crate::types::{body_capacity, ELEMENT_BYTES, HEADER_BYTES, MIN_FOOTPRINT};

/// Why an audited index entry is malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultReason {
    /// Key is not strictly greater than its predecessor.
    MisorderedKey {
        /// The preceding key.
        previous: usize,
    },
    /// Key is below the minimum footprint ever vended.
    UndersizedKey,
    /// Key minus the header is not a whole number of elements.
    MisalignedKey,
    /// Entry exists but owns no free bodies.
    EmptyChain,
    /// A chained body is too small to back its key.
    ShortBody {
        /// Capacity of the offending body, in elements.
        capacity: usize,
        /// Capacity its key requires, in elements.
        expected: usize,
    },
}

/// The first malformed index entry found by an audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheFault {
    /// Footprint key of the offending entry.
    pub footprint: usize,
    /// What is wrong with it.
    pub reason: FaultReason,
}

impl fmt::Display for CacheFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            FaultReason::MisorderedKey { previous } => {
                write!(f, "footprint {} not above predecessor {}", self.footprint, previous)
            }
            FaultReason::UndersizedKey => {
                write!(f, "footprint {} below minimum {}", self.footprint, MIN_FOOTPRINT)
            }
            FaultReason::MisalignedKey => {
                write!(f, "footprint {} not element-aligned past the header", self.footprint)
            }
            FaultReason::EmptyChain => {
                write!(f, "footprint {} has an empty peer chain", self.footprint)
            }
            FaultReason::ShortBody { capacity, expected } => {
                write!(
                    f,
                    "footprint {} chains a body of {} elements, needs {}",
                    self.footprint, capacity, expected
                )
            }
        }
    }
}

/// Ordered map from footprint to peer chain.
///
/// Not synchronized itself; the [`MatrixCache`](crate::memory::MatrixCache)
/// facade owns the one lock that serializes all mutation.
#[derive(Debug, Default)]
pub(crate) struct SizeIndex {
    entries: BTreeMap<usize, Vec<Body>>,
}

impl SizeIndex {
    /// Chain a free body under its footprint, creating the entry on first use.
    ///
    /// Peers vend last-released-first: release pushes onto the chain tail and
    /// [`remove_one_of_size`](Self::remove_one_of_size) pops from it.
    pub(crate) fn insert_or_chain(&mut self, footprint: usize, body: Body) {
        self.entries.entry(footprint).or_default().push(body);
    }

    /// Pop one free body of exactly `footprint` bytes, if any is cached.
    ///
    /// Removes the entry when its chain empties, so the index never carries
    /// keys with nothing behind them.
    pub(crate) fn remove_one_of_size(&mut self, footprint: usize) -> Option<Body> {
        let chain = self.entries.get_mut(&footprint)?;
        let body = chain.pop();
        if chain.is_empty() {
            self.entries.remove(&footprint);
        }
        body
    }

    /// Detach the entire index, leaving it empty.
    pub(crate) fn detach(&mut self) -> BTreeMap<usize, Vec<Body>> {
        std::mem::take(&mut self.entries)
    }

    /// Verify ordering and well-formedness; first offending entry or `None`.
    pub(crate) fn audit(&self) -> Option<CacheFault> {
        let mut previous: Option<usize> = None;
        for (&footprint, chain) in &self.entries {
            let fault = |reason| Some(CacheFault { footprint, reason });
            if let Some(previous) = previous {
                if footprint <= previous {
                    return fault(FaultReason::MisorderedKey { previous });
                }
            }
            if footprint < MIN_FOOTPRINT {
                return fault(FaultReason::UndersizedKey);
            }
            if (footprint - HEADER_BYTES) % ELEMENT_BYTES != 0 {
                return fault(FaultReason::MisalignedKey);
            }
            if chain.is_empty() {
                return fault(FaultReason::EmptyChain);
            }
            let expected = body_capacity(footprint);
            for body in chain {
                if body.capacity() < expected {
                    return fault(FaultReason::ShortBody {
                        capacity: body.capacity(),
                        expected,
                    });
                }
            }
            previous = Some(footprint);
        }
        None
    }

    /// Iterate entries in ascending footprint order.
    pub(crate) fn entries(&self) -> impl Iterator<Item = (usize, &[Body])> + '_ {
        self.entries.iter().map(|(&footprint, chain)| (footprint, chain.as_slice()))
    }

    /// Total bytes currently cached.
    pub(crate) fn cached_bytes(&self) -> usize {
        self.entries
            .iter()
            .map(|(&footprint, chain)| footprint * chain.len())
            .sum()
    }

    /// Number of free objects currently cached.
    pub(crate) fn cached_objects(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Number of distinct footprints currently cached.
    pub(crate) fn distinct_footprints(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{footprint, Element};

    fn body_for(footprint: usize) -> Body {
        Vec::with_capacity(body_capacity(footprint))
    }

    #[test]
    fn chains_peers_under_one_key() {
        let mut index = SizeIndex::default();
        let key = footprint(2, 3);

        index.insert_or_chain(key, body_for(key));
        index.insert_or_chain(key, body_for(key));

        assert_eq!(index.distinct_footprints(), 1);
        assert_eq!(index.cached_objects(), 2);
        assert_eq!(index.cached_bytes(), 2 * key);
    }

    #[test]
    fn pops_last_released_first() {
        let mut index = SizeIndex::default();
        let key = footprint(2, 3);

        let first = body_for(key);
        let second = body_for(key);
        let first_ptr = first.as_ptr();
        let second_ptr = second.as_ptr();

        index.insert_or_chain(key, first);
        index.insert_or_chain(key, second);

        assert_eq!(index.remove_one_of_size(key).unwrap().as_ptr(), second_ptr);
        assert_eq!(index.remove_one_of_size(key).unwrap().as_ptr(), first_ptr);
        assert!(index.remove_one_of_size(key).is_none());
    }

    #[test]
    fn exhausted_keys_leave_the_index() {
        let mut index = SizeIndex::default();
        let key = footprint(4, 4);

        index.insert_or_chain(key, body_for(key));
        assert_eq!(index.distinct_footprints(), 1);

        index.remove_one_of_size(key);
        assert_eq!(index.distinct_footprints(), 0);
        assert_eq!(index.cached_bytes(), 0);
    }

    #[test]
    fn missing_sizes_report_none() {
        let mut index = SizeIndex::default();
        index.insert_or_chain(footprint(2, 2), body_for(footprint(2, 2)));

        assert!(index.remove_one_of_size(footprint(9, 9)).is_none());
        // The near miss must not disturb the existing entry.
        assert_eq!(index.cached_objects(), 1);
    }

    #[test]
    fn audit_accepts_a_well_formed_index() {
        let mut index = SizeIndex::default();
        for (rows, columns) in [(0, 0), (2, 3), (4, 4), (5, 7)] {
            let key = footprint(rows, columns);
            index.insert_or_chain(key, body_for(key));
        }
        assert_eq!(index.audit(), None);
    }

    #[test]
    fn audit_flags_an_undersized_key() {
        let mut index = SizeIndex::default();
        index.insert_or_chain(MIN_FOOTPRINT - ELEMENT_BYTES, Body::new());

        let fault = index.audit().unwrap();
        assert_eq!(fault.reason, FaultReason::UndersizedKey);
    }

    #[test]
    fn audit_flags_a_short_body() {
        let mut index = SizeIndex::default();
        let key = footprint(8, 8);
        // A body with no capacity cannot back a 64-element key.
        index.insert_or_chain(key, Vec::<Element>::new());

        let fault = index.audit().unwrap();
        assert_eq!(fault.footprint, key);
        assert!(matches!(fault.reason, FaultReason::ShortBody { .. }));
    }

    #[test]
    fn detach_empties_the_index() {
        let mut index = SizeIndex::default();
        let key = footprint(3, 3);
        index.insert_or_chain(key, body_for(key));

        let detached = index.detach();
        assert_eq!(detached.len(), 1);
        assert_eq!(index.cached_objects(), 0);
        assert_eq!(index.audit(), None);
    }
}
