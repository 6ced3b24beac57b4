//! Find options
//!
//! Sort, skip, and limit for read queries. Results are always
//! materialized eagerly; pagination beyond skip/limit is the caller's
//! concern.

use serde::{Deserialize, Serialize};

/// Sort key with direction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub ascending: bool,
}

/// Options applied to find queries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindOptions {
    /// Sort keys, applied in order; empty preserves insertion order
    #[serde(default)]
    pub sort: Vec<SortKey>,

    /// Maximum number of documents to return (None = unbounded)
    #[serde(default)]
    pub limit: Option<usize>,

    /// Number of matching documents to skip
    #[serde(default)]
    pub skip: usize,
}

impl FindOptions {
    /// Sort ascending by a field (builder style)
    pub fn sort_asc(mut self, field: impl Into<String>) -> Self {
        self.sort.push(SortKey {
            field: field.into(),
            ascending: true,
        });
        self
    }

    /// Sort descending by a field (builder style)
    pub fn sort_desc(mut self, field: impl Into<String>) -> Self {
        self.sort.push(SortKey {
            field: field.into(),
            ascending: false,
        });
        self
    }

    /// Cap the number of returned documents (builder style)
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip the first `skip` matching documents (builder style)
    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }
}
