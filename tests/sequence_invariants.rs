//! Sequence and CRUD adapter invariant tests
//!
//! Covered invariants:
//! - Successful inserts return the counter value at the moment of the
//!   call; sequential inserts never share an id.
//! - A failed single insert leaves the counter unchanged.
//! - A failed batch insert of size N refunds the whole block.
//! - Updates merge the supplied fields and never touch others.
//! - Single and batch delete report through one outcome shape.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::json;

use docbase::config::StoreConfig;
use docbase::dao::{CollectionDao, DeleteOutcome};
use docbase::sequence::SequenceAllocator;
use docbase::store::{
    Document, DocumentStore, Filter, FindOptions, MemoryStore, StoreError, StoreResult,
};

// =============================================================================
// Test Utilities
// =============================================================================

/// Store wrapper that rejects writes while armed, standing in for a
/// driver fault. Reads and the sequence increment keep working so the
/// counter stays observable.
#[derive(Default)]
struct FaultStore {
    inner: MemoryStore,
    rejecting: AtomicBool,
}

impl FaultStore {
    fn arm(&self) {
        self.rejecting.store(true, Ordering::SeqCst);
    }

    fn disarm(&self) {
        self.rejecting.store(false, Ordering::SeqCst);
    }

    fn gate(&self) -> StoreResult<()> {
        if self.rejecting.load(Ordering::SeqCst) {
            Err(StoreError::WriteConflict("simulated rejection".to_string()))
        } else {
            Ok(())
        }
    }
}

impl DocumentStore for FaultStore {
    fn insert_one(&self, collection: &str, document: Document) -> StoreResult<()> {
        self.gate()?;
        self.inner.insert_one(collection, document)
    }

    fn insert_many(&self, collection: &str, documents: Vec<Document>) -> StoreResult<u64> {
        self.gate()?;
        self.inner.insert_many(collection, documents)
    }

    fn update_one(&self, collection: &str, filter: &Filter, changes: &Document) -> StoreResult<u64> {
        self.gate()?;
        self.inner.update_one(collection, filter, changes)
    }

    fn update_many(&self, collection: &str, filter: &Filter, changes: &Document) -> StoreResult<u64> {
        self.gate()?;
        self.inner.update_many(collection, filter, changes)
    }

    fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Option<Document>> {
        self.inner.find_one(collection, filter, options)
    }

    fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>> {
        self.inner.find(collection, filter, options)
    }

    fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        self.gate()?;
        self.inner.delete_one(collection, filter)
    }

    fn delete_many(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        self.gate()?;
        self.inner.delete_many(collection, filter)
    }

    fn find_one_and_increment(
        &self,
        collection: &str,
        key: &str,
        field: &str,
        delta: i64,
    ) -> StoreResult<i64> {
        self.inner.find_one_and_increment(collection, key, field, delta)
    }
}

fn fixture() -> (Arc<FaultStore>, CollectionDao<FaultStore>, SequenceAllocator<FaultStore>) {
    let store = Arc::new(FaultStore::default());
    let dao = CollectionDao::new(Arc::clone(&store), &StoreConfig::default(), "article");
    let counter = SequenceAllocator::new(Arc::clone(&store), "article");
    (store, dao, counter)
}

// =============================================================================
// INVARIANT: ids are the counter value at the moment of the call
// =============================================================================

#[test]
fn test_sequential_inserts_get_distinct_sequential_ids() {
    let (_, dao, counter) = fixture();

    let mut seen = Vec::new();
    for i in 1..=5 {
        let id = dao.insert(json!({"n": i})).unwrap();
        assert_eq!(id, counter.current().unwrap(), "id must equal the counter");
        assert!(!seen.contains(&id), "id {} issued twice", id);
        seen.push(id);
    }
    assert_eq!(seen, vec![1, 2, 3, 4, 5]);
}

// =============================================================================
// INVARIANT: failed writes leave the counter where it started
// =============================================================================

#[test]
fn test_failed_single_insert_leaves_counter_unchanged() {
    let (store, dao, counter) = fixture();

    dao.insert(json!({"name": "A"})).unwrap();
    let before = counter.current().unwrap();

    store.arm();
    assert!(dao.insert(json!({"name": "B"})).is_err());
    store.disarm();

    assert_eq!(counter.current().unwrap(), before);
}

#[test]
fn test_failed_batch_insert_refunds_whole_block() {
    let (store, dao, counter) = fixture();

    dao.insert(json!({"name": "A"})).unwrap();
    let before = counter.current().unwrap();

    store.arm();
    let batch: Vec<Document> = (0..4).map(|i| json!({"n": i})).collect();
    assert!(dao.batch_insert(batch).is_err());
    store.disarm();

    assert_eq!(counter.current().unwrap(), before);
}

/// Worked example: A gets 1, B gets 2, a rejected insert reverts the
/// counter to 2, and the next success gets 3.
#[test]
fn test_worked_example_counter_reverts_after_rejection() {
    let (store, dao, counter) = fixture();

    assert_eq!(dao.insert(json!({"name": "A"})).unwrap(), 1);
    assert_eq!(counter.current().unwrap(), 1);

    assert_eq!(dao.insert(json!({"name": "B"})).unwrap(), 2);
    assert_eq!(counter.current().unwrap(), 2);

    store.arm();
    assert!(dao.insert(json!({})).is_err());
    store.disarm();
    assert_eq!(counter.current().unwrap(), 2);

    assert_eq!(dao.insert(json!({"name": "C"})).unwrap(), 3);
}

// =============================================================================
// INVARIANT: batch ids come from one contiguous reservation
// =============================================================================

#[test]
fn test_batch_ids_are_contiguous_and_blocks_never_overlap() {
    let (_, dao, _) = fixture();

    dao.batch_insert(vec![json!({"b": 1}), json!({"b": 1}), json!({"b": 1})])
        .unwrap();
    dao.batch_insert(vec![json!({"b": 2}), json!({"b": 2})]).unwrap();

    let ids: Vec<i64> = dao
        .find_all()
        .unwrap()
        .iter()
        .map(|doc| doc["_id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

// =============================================================================
// INVARIANT: updates merge, never replace
// =============================================================================

#[test]
fn test_update_never_alters_absent_fields() {
    let (_, dao, _) = fixture();

    let id = dao
        .insert(json!({"title": "T", "body": "B", "views": 7}))
        .unwrap();
    dao.update(&Filter::by_id(id), &json!({"title": "T2"})).unwrap();

    let doc = dao
        .find_one(&Filter::by_id(id), &FindOptions::default())
        .unwrap()
        .unwrap();
    assert_eq!(doc["title"], "T2");
    assert_eq!(doc["body"], "B");
    assert_eq!(doc["views"], 7);
}

#[test]
fn test_batch_update_merges_across_matches() {
    let (_, dao, _) = fixture();

    dao.batch_insert(vec![
        json!({"status": "draft", "kept": 1}),
        json!({"status": "draft", "kept": 2}),
    ])
    .unwrap();

    let modified = dao
        .batch_update(&Filter::eq("status", "draft"), &json!({"status": "published"}))
        .unwrap();
    assert_eq!(modified, 2);

    for doc in dao.find_all().unwrap() {
        assert_eq!(doc["status"], "published");
        assert!(doc["kept"].is_i64());
    }
}

// =============================================================================
// INVARIANT: one delete outcome shape for single and batch
// =============================================================================

#[test]
fn test_delete_outcomes_are_unified() {
    let (_, dao, _) = fixture();

    dao.batch_insert(vec![json!({"k": "x"}), json!({"k": "x"}), json!({"k": "y"})])
        .unwrap();

    assert_eq!(
        dao.delete(&Filter::eq("k", "x")).unwrap(),
        DeleteOutcome { deleted: 1, acknowledged: true }
    );
    assert_eq!(
        dao.batch_delete(&Filter::eq("k", "x")).unwrap(),
        DeleteOutcome { deleted: 1, acknowledged: true }
    );
    assert_eq!(
        dao.batch_delete(&Filter::eq("k", "missing")).unwrap(),
        DeleteOutcome { deleted: 0, acknowledged: true }
    );
}

// =============================================================================
// Error classification at the adapter boundary
// =============================================================================

#[test]
fn test_fault_kind_crosses_the_boundary() {
    let (store, dao, _) = fixture();

    store.arm();
    let err = dao.insert(json!({"name": "A"})).unwrap_err();
    assert!(matches!(err, StoreError::WriteConflict(_)));

    let err = dao.update(&Filter::all(), &json!({"x": 1})).unwrap_err();
    assert!(matches!(err, StoreError::WriteConflict(_)));
    store.disarm();

    let err = dao.insert(json!(42)).unwrap_err();
    assert!(matches!(err, StoreError::InvalidArgument(_)));
}
