//! Document store abstraction
//!
//! Collections hold JSON object documents addressed by an `_id` field.
//! The trait is the seam for the real wire driver; `MemoryStore` is the
//! in-process reference implementation used by tests and local tooling.
//!
//! Invariants:
//! - Updates merge the supplied fields; they never replace whole documents.
//! - `find_one_and_increment` is atomic with upsert-create-at-zero.
//! - No operation panics across the trait boundary; faults are
//!   `StoreError` values.

mod errors;
mod filter;
mod memory;
mod query;

pub use errors::{StoreError, StoreResult};
pub use filter::{Comparator, Condition, Filter};
pub use memory::MemoryStore;
pub use query::{FindOptions, SortKey};

/// A stored document; always a JSON object carrying `_id`
pub type Document = serde_json::Value;

/// Identifier field present on every stored document
pub const ID_FIELD: &str = "_id";

/// Synchronous document store operations
///
/// Calls block until the store answers; timeout and retry policy belong
/// to the driver behind the implementation.
pub trait DocumentStore: Send + Sync {
    /// Insert one document. The document must be a JSON object; its `_id`
    /// must not collide with an existing one.
    fn insert_one(&self, collection: &str, document: Document) -> StoreResult<()>;

    /// Insert many documents in order, stopping at the first failure.
    /// Returns the inserted count on full success; on failure, documents
    /// before the failing one may have been written.
    fn insert_many(&self, collection: &str, documents: Vec<Document>) -> StoreResult<u64>;

    /// Merge `changes` into the first matching document; returns the
    /// modified count (0 or 1).
    fn update_one(&self, collection: &str, filter: &Filter, changes: &Document) -> StoreResult<u64>;

    /// Merge `changes` into every matching document; returns the modified
    /// count.
    fn update_many(&self, collection: &str, filter: &Filter, changes: &Document) -> StoreResult<u64>;

    /// First matching document under the given options, if any.
    fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Option<Document>>;

    /// All matching documents, eagerly materialized.
    fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>>;

    /// Delete the first matching document; returns the deleted count
    /// (0 or 1).
    fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;

    /// Delete every matching document; returns the deleted count.
    fn delete_many(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;

    /// Atomically add `delta` to the integer `field` of the document whose
    /// `_id` equals `key`, creating the document with the field at zero if
    /// absent, and return the resulting value.
    fn find_one_and_increment(
        &self,
        collection: &str,
        key: &str,
        field: &str,
        delta: i64,
    ) -> StoreResult<i64>;
}
