//! In-memory document store
//!
//! Reference implementation of `DocumentStore` over `RwLock`-guarded
//! collections. Documents keep insertion order; reads materialize
//! snapshots, so a returned `Vec` never observes later writes.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;

use super::errors::{StoreError, StoreResult};
use super::filter::{compare_values, Filter};
use super::query::FindOptions;
use super::{Document, DocumentStore, ID_FIELD};

/// In-memory collections keyed by name
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, HashMap<String, Vec<Document>>>> {
        self.collections
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, HashMap<String, Vec<Document>>>> {
        self.collections
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    /// Append one document to a collection, rejecting `_id` collisions.
    /// The caller holds the write lock.
    fn append(collection: &mut Vec<Document>, document: Document) -> StoreResult<()> {
        let fields = document
            .as_object()
            .ok_or_else(|| StoreError::InvalidArgument("document must be a JSON object".to_string()))?;

        if let Some(id) = fields.get(ID_FIELD) {
            if collection.iter().any(|doc| doc.get(ID_FIELD) == Some(id)) {
                return Err(StoreError::WriteConflict(format!("duplicate _id: {}", id)));
            }
        }

        collection.push(document);
        Ok(())
    }

    /// Merge `changes` into `target`, field by field. `_id` is immutable.
    fn merge(target: &mut Document, changes: &Document) -> StoreResult<()> {
        let patches = changes
            .as_object()
            .ok_or_else(|| StoreError::InvalidArgument("changes must be a JSON object".to_string()))?;

        if patches.contains_key(ID_FIELD) {
            return Err(StoreError::InvalidArgument("cannot modify _id".to_string()));
        }

        if let Some(fields) = target.as_object_mut() {
            for (key, value) in patches {
                fields.insert(key.clone(), value.clone());
            }
        }

        Ok(())
    }

    fn apply_options(mut matched: Vec<Document>, options: &FindOptions) -> Vec<Document> {
        // Later sort keys are subordinate, so apply them first; the sort
        // is stable.
        for key in options.sort.iter().rev() {
            matched.sort_by(|a, b| {
                let ordering = compare_values(a.get(&key.field), b.get(&key.field));
                if key.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        matched
            .into_iter()
            .skip(options.skip)
            .take(options.limit.unwrap_or(usize::MAX))
            .collect()
    }
}

impl DocumentStore for MemoryStore {
    fn insert_one(&self, collection: &str, document: Document) -> StoreResult<()> {
        let mut collections = self.write()?;
        let docs = collections.entry(collection.to_string()).or_default();
        Self::append(docs, document)
    }

    fn insert_many(&self, collection: &str, documents: Vec<Document>) -> StoreResult<u64> {
        let mut collections = self.write()?;
        let docs = collections.entry(collection.to_string()).or_default();

        // Ordered semantics: stop at the first failure, keeping what was
        // written before it, exactly like the wire driver's bulk insert.
        let mut inserted = 0u64;
        for document in documents {
            Self::append(docs, document)?;
            inserted += 1;
        }
        Ok(inserted)
    }

    fn update_one(&self, collection: &str, filter: &Filter, changes: &Document) -> StoreResult<u64> {
        let mut collections = self.write()?;
        let docs = match collections.get_mut(collection) {
            Some(docs) => docs,
            None => return Ok(0),
        };

        match docs.iter_mut().find(|doc| filter.matches(doc)) {
            Some(doc) => {
                Self::merge(doc, changes)?;
                Ok(1)
            }
            None => {
                // Malformed change sets fail even when nothing matches.
                Self::merge(&mut Value::Object(Default::default()), changes)?;
                Ok(0)
            }
        }
    }

    fn update_many(&self, collection: &str, filter: &Filter, changes: &Document) -> StoreResult<u64> {
        let mut collections = self.write()?;
        let docs = match collections.get_mut(collection) {
            Some(docs) => docs,
            None => return Ok(0),
        };

        Self::merge(&mut Value::Object(Default::default()), changes)?;

        let mut modified = 0u64;
        for doc in docs.iter_mut().filter(|doc| filter.matches(doc)) {
            Self::merge(doc, changes)?;
            modified += 1;
        }
        Ok(modified)
    }

    fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Option<Document>> {
        let mut found = self.find(collection, filter, options)?;
        if found.is_empty() {
            Ok(None)
        } else {
            Ok(Some(found.swap_remove(0)))
        }
    }

    fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>> {
        let collections = self.read()?;
        let matched: Vec<Document> = collections
            .get(collection)
            .map(|docs| docs.iter().filter(|doc| filter.matches(doc)).cloned().collect())
            .unwrap_or_default();

        Ok(Self::apply_options(matched, options))
    }

    fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let mut collections = self.write()?;
        let docs = match collections.get_mut(collection) {
            Some(docs) => docs,
            None => return Ok(0),
        };

        match docs.iter().position(|doc| filter.matches(doc)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn delete_many(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let mut collections = self.write()?;
        let docs = match collections.get_mut(collection) {
            Some(docs) => docs,
            None => return Ok(0),
        };

        let before = docs.len();
        docs.retain(|doc| !filter.matches(doc));
        Ok((before - docs.len()) as u64)
    }

    fn find_one_and_increment(
        &self,
        collection: &str,
        key: &str,
        field: &str,
        delta: i64,
    ) -> StoreResult<i64> {
        let mut collections = self.write()?;
        let docs = collections.entry(collection.to_string()).or_default();

        let position = docs
            .iter()
            .position(|doc| doc.get(ID_FIELD).and_then(Value::as_str) == Some(key));

        let doc = match position {
            Some(index) => &mut docs[index],
            None => {
                docs.push(serde_json::json!({ ID_FIELD: key, field: 0 }));
                docs.last_mut().ok_or_else(|| {
                    StoreError::Unavailable("collection vanished during upsert".to_string())
                })?
            }
        };

        let current = match doc.get(field) {
            Some(value) => value.as_i64().ok_or_else(|| {
                StoreError::InvalidArgument(format!("field {} is not an integer", field))
            })?,
            None => 0,
        };

        let updated = current
            .checked_add(delta)
            .ok_or_else(|| StoreError::WriteConflict(format!("counter overflow on {}", key)))?;

        if let Some(fields) = doc.as_object_mut() {
            fields.insert(field.to_string(), Value::from(updated));
        }

        Ok(updated)
    }
}
