//! Account DAO
//!
//! Typed wrapper over `CollectionDao` for the `user` collection. The
//! stored document carries the salted password digest and per-account
//! salt; plaintext passwords never reach the store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::crypto;
use crate::config::StoreConfig;
use crate::store::{DocumentStore, Filter, FindOptions, StoreError, StoreResult};

use super::CollectionDao;

/// Logical collection holding accounts
pub const ACCOUNT_COLLECTION: &str = "user";

/// Stored account document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Allocator-issued identifier
    #[serde(rename = "_id")]
    pub id: i64,

    /// Phone number, the account's lookup key
    pub phone: String,

    /// Salted password digest
    pub password: String,

    /// Per-account salt
    pub salt: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_ip: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_time: Option<DateTime<Utc>>,
}

impl Account {
    /// Compare a presented password against the stored digest
    pub fn verify_password(&self, presented: &str) -> bool {
        crypto::verify_password(presented, &self.salt, &self.password)
    }
}

/// Accounts keyed by phone number
pub struct AccountDao<S> {
    dao: CollectionDao<S>,
}

impl<S: DocumentStore> AccountDao<S> {
    pub fn new(store: Arc<S>, config: &StoreConfig) -> Self {
        Self {
            dao: CollectionDao::new(store, config, ACCOUNT_COLLECTION),
        }
    }

    /// Create an account with a fresh salt and digest; returns the
    /// assigned id.
    pub fn create(&self, phone: &str, password: &str) -> StoreResult<i64> {
        let salt = crypto::generate_salt();
        let digest = crypto::hash_password(password, &salt);

        self.dao.insert(serde_json::json!({
            "phone": phone,
            "password": digest,
            "salt": salt,
        }))
    }

    /// Look up an account by phone number
    pub fn get_by_phone(&self, phone: &str) -> StoreResult<Option<Account>> {
        let found = self
            .dao
            .find_one(&Filter::eq("phone", phone), &FindOptions::default())?;

        match found {
            Some(document) => serde_json::from_value(document)
                .map(Some)
                .map_err(|err| StoreError::InvalidArgument(format!("malformed account document: {}", err))),
            None => Ok(None),
        }
    }
}
