//! CRUD adapter
//!
//! `CollectionDao` binds one logical collection to the document store and
//! its sequence counter. Identifiers are allocator-issued integers,
//! assigned strictly before the write attempt; failed inserts refund
//! their allocation. Every failure is logged at this boundary with the
//! collection name and the store's diagnostic text, then returned as a
//! typed error.

mod account;

pub use account::{Account, AccountDao, ACCOUNT_COLLECTION};

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::StoreConfig;
use crate::observability::Logger;
use crate::sequence::SequenceAllocator;
use crate::store::{Document, DocumentStore, Filter, FindOptions, StoreError, StoreResult, ID_FIELD};

/// Unified result of delete operations, single and batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    /// Number of documents removed
    pub deleted: u64,

    /// Whether the store acknowledged the operation
    pub acknowledged: bool,
}

/// CRUD operations for one logical collection
pub struct CollectionDao<S> {
    store: Arc<S>,
    /// Physical collection name (prefix + logical name)
    collection: String,
    sequence: SequenceAllocator<S>,
}

impl<S: DocumentStore> CollectionDao<S> {
    /// Bind a logical collection. The physical name is the configured
    /// prefix plus the logical name; the sequence counter is keyed by the
    /// logical name alone.
    pub fn new(store: Arc<S>, config: &StoreConfig, collection: &str) -> Self {
        Self {
            collection: config.collection_name(collection),
            sequence: SequenceAllocator::new(Arc::clone(&store), collection),
            store,
        }
    }

    /// Physical collection name this adapter writes to
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Insert one document and return its assigned id.
    ///
    /// The id is spent optimistically: allocated before the write,
    /// refunded by a compensating decrement when the write fails. Under
    /// sequential execution a failed insert leaves the counter unchanged;
    /// concurrent overlapping failures can over-correct it.
    pub fn insert(&self, mut document: Document) -> StoreResult<i64> {
        let id = self.sequence.next(1)?;

        let written = match document.as_object_mut() {
            Some(fields) => {
                fields.insert(ID_FIELD.to_string(), Value::from(id));
                self.store.insert_one(&self.collection, document)
            }
            None => Err(StoreError::InvalidArgument(
                "document must be a JSON object".to_string(),
            )),
        };

        match written {
            Ok(()) => Ok(id),
            Err(err) => {
                self.refund(1);
                self.fail("dao.insert", &err);
                Err(err)
            }
        }
    }

    /// Insert many documents in one write and return the inserted count.
    ///
    /// Ids come from a single atomic block reservation, so a batch's ids
    /// are contiguous and interleaved batches never collide. On any
    /// failure the whole block is refunded in one compensating decrement;
    /// when the underlying write partially succeeded first, that refund
    /// is a known approximation and the counter can drift from the true
    /// count of unconsumed ids.
    pub fn batch_insert(&self, documents: Vec<Document>) -> StoreResult<u64> {
        if documents.is_empty() {
            return Ok(0);
        }

        let count = documents.len() as u64;
        let block = self.sequence.reserve(count)?;

        let mut stamped = Vec::with_capacity(documents.len());
        for (mut document, id) in documents.into_iter().zip(block.ids()) {
            match document.as_object_mut() {
                Some(fields) => {
                    fields.insert(ID_FIELD.to_string(), Value::from(id));
                    stamped.push(document);
                }
                None => {
                    let err = StoreError::InvalidArgument(
                        "documents must be JSON objects".to_string(),
                    );
                    self.refund(count);
                    self.fail("dao.batch_insert", &err);
                    return Err(err);
                }
            }
        }

        match self.store.insert_many(&self.collection, stamped) {
            Ok(inserted) => Ok(inserted),
            Err(err) => {
                self.refund(count);
                self.fail("dao.batch_insert", &err);
                Err(err)
            }
        }
    }

    /// Merge `changes` into the first matching document; returns the
    /// modified count. Fields absent from `changes` are never touched.
    pub fn update(&self, filter: &Filter, changes: &Document) -> StoreResult<u64> {
        self.store
            .update_one(&self.collection, filter, changes)
            .map_err(|err| {
                self.fail("dao.update", &err);
                err
            })
    }

    /// Merge `changes` into every matching document; returns the modified
    /// count.
    pub fn batch_update(&self, filter: &Filter, changes: &Document) -> StoreResult<u64> {
        self.store
            .update_many(&self.collection, filter, changes)
            .map_err(|err| {
                self.fail("dao.batch_update", &err);
                err
            })
    }

    /// All matching documents, eagerly materialized
    pub fn find(&self, filter: &Filter, options: &FindOptions) -> StoreResult<Vec<Document>> {
        self.store
            .find(&self.collection, filter, options)
            .map_err(|err| {
                self.fail("dao.find", &err);
                err
            })
    }

    /// First matching document, if any
    pub fn find_one(&self, filter: &Filter, options: &FindOptions) -> StoreResult<Option<Document>> {
        self.store
            .find_one(&self.collection, filter, options)
            .map_err(|err| {
                self.fail("dao.find_one", &err);
                err
            })
    }

    /// Every document in the collection, in insertion order
    pub fn find_all(&self) -> StoreResult<Vec<Document>> {
        self.find(&Filter::all(), &FindOptions::default())
    }

    /// Delete the first matching document
    pub fn delete(&self, filter: &Filter) -> StoreResult<DeleteOutcome> {
        match self.store.delete_one(&self.collection, filter) {
            Ok(deleted) => Ok(DeleteOutcome {
                deleted,
                acknowledged: true,
            }),
            Err(err) => {
                self.fail("dao.delete", &err);
                Err(err)
            }
        }
    }

    /// Delete every matching document
    pub fn batch_delete(&self, filter: &Filter) -> StoreResult<DeleteOutcome> {
        match self.store.delete_many(&self.collection, filter) {
            Ok(deleted) => Ok(DeleteOutcome {
                deleted,
                acknowledged: true,
            }),
            Err(err) => {
                self.fail("dao.batch_delete", &err);
                Err(err)
            }
        }
    }

    /// Compensating decrement for ids allocated to a failed write
    fn refund(&self, n: u64) {
        if let Err(err) = self.sequence.next(-(n as i64)) {
            Logger::error(
                "dao.sequence_refund",
                &[
                    ("collection", self.collection.as_str()),
                    ("count", &n.to_string()),
                    ("error", &err.to_string()),
                ],
            );
        }
    }

    fn fail(&self, event: &str, err: &StoreError) {
        Logger::error(
            event,
            &[
                ("collection", self.collection.as_str()),
                ("kind", err.kind()),
                ("error", &err.to_string()),
            ],
        );
    }
}
