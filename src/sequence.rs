//! Sequence allocator
//!
//! Surrogate integer ids are minted from per-collection counter documents
//! in the fixed `sequence` collection. Each counter is keyed by the
//! logical collection name and moved only through the store's atomic
//! increment-and-fetch, so allocator correctness is exactly the
//! atomicity of that primitive.
//!
//! Counters are monotonically non-decreasing except for explicit
//! compensating decrements after failed writes. Two overlapping failed
//! writes that both refund can over-correct the counter; that race is
//! inherited from the compensation scheme and documented on `next`.

use std::sync::Arc;

use crate::store::{DocumentStore, StoreResult};

/// Collection holding the counter documents; deliberately unprefixed
pub const SEQUENCE_COLLECTION: &str = "sequence";

/// Integer field holding the running count
pub const SEQUENCE_FIELD: &str = "seq";

/// A contiguous block of reserved ids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceBlock {
    first: i64,
    len: u64,
}

impl SequenceBlock {
    /// First id in the block
    pub fn first(&self) -> i64 {
        self.first
    }

    /// Last id in the block
    pub fn last(&self) -> i64 {
        self.first + self.len as i64 - 1
    }

    /// Number of ids reserved
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The reserved ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = i64> {
        self.first..self.first + self.len as i64
    }
}

/// Mints ids for one logical collection
pub struct SequenceAllocator<S> {
    store: Arc<S>,
    key: String,
}

impl<S: DocumentStore> SequenceAllocator<S> {
    /// Allocator for the counter keyed by `key` (the logical collection
    /// name)
    pub fn new(store: Arc<S>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Counter key this allocator mutates
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Atomically add `delta` to the counter (upsert-create at zero) and
    /// return the resulting value.
    ///
    /// Negative deltas are the compensation path for failed writes. The
    /// refund is NOT exact under concurrency: overlapping failed writes
    /// can each decrement and jointly over-correct.
    pub fn next(&self, delta: i64) -> StoreResult<i64> {
        self.store
            .find_one_and_increment(SEQUENCE_COLLECTION, &self.key, SEQUENCE_FIELD, delta)
    }

    /// Current counter value without consuming an id
    pub fn current(&self) -> StoreResult<i64> {
        self.next(0)
    }

    /// Reserve `n` contiguous ids in one atomic increment.
    ///
    /// The block ends at the post-increment counter value, so interleaved
    /// reservations never overlap. Reserving zero ids touches nothing.
    pub fn reserve(&self, n: u64) -> StoreResult<SequenceBlock> {
        if n == 0 {
            return Ok(SequenceBlock { first: 1, len: 0 });
        }

        let last = self.next(n as i64)?;
        Ok(SequenceBlock {
            first: last - n as i64 + 1,
            len: n,
        })
    }
}
