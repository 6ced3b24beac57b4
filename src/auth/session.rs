//! Session cache
//!
//! One active session per account (phone) and per device (UUID). The
//! cache is keyed both ways: phone resolves to the currently bound
//! device, device resolves to the session payload. Per-key operations
//! are atomic, but no transaction spans the invalidate-old/write-new
//! pair at login; a crash between the two can leave a stale session.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{AuthError, AuthResult};

/// Session payload held in the cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Account phone number
    pub phone: String,

    /// Device holding this session
    pub device: Uuid,

    /// Opaque login token
    pub token: String,

    /// Client ip recorded at login
    pub login_ip: String,

    /// When the session was issued
    pub login_time: DateTime<Utc>,

    /// Lifetime in seconds; 0 = unbounded
    pub duration: i64,
}

impl Session {
    /// Whether the session has outlived its duration
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.duration > 0 && self.login_time + Duration::seconds(self.duration) < now
    }
}

/// Session cache collaborator contract
pub trait SessionCache: Send + Sync {
    /// Bind the session to its phone and device keys, replacing any
    /// session the device already held
    fn put(&self, session: Session) -> AuthResult<()>;

    /// Session currently held by a device
    fn get(&self, device: Uuid) -> AuthResult<Option<Session>>;

    /// Device currently bound to an account
    fn device_for(&self, phone: &str) -> AuthResult<Option<Uuid>>;

    /// Invalidate the session for one device; returns whether one existed
    fn remove_by_device(&self, device: Uuid) -> AuthResult<bool>;

    /// Invalidate an account's session regardless of device; returns
    /// whether one existed
    fn remove_by_phone(&self, phone: &str) -> AuthResult<bool>;
}

/// In-memory session cache
#[derive(Debug, Default)]
pub struct MemorySessionCache {
    by_device: RwLock<HashMap<Uuid, Session>>,
    by_phone: RwLock<HashMap<String, Uuid>>,
}

impl MemorySessionCache {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> AuthError {
    AuthError::CacheUnavailable("lock poisoned".to_string())
}

impl SessionCache for MemorySessionCache {
    fn put(&self, session: Session) -> AuthResult<()> {
        // No transaction spans the two keyed writes.
        let displaced = self
            .by_device
            .write()
            .map_err(poisoned)?
            .insert(session.device, session.clone());

        let mut by_phone = self.by_phone.write().map_err(poisoned)?;

        // A device rebinding to a new account unbinds the old account.
        if let Some(old) = displaced {
            if old.phone != session.phone && by_phone.get(&old.phone) == Some(&session.device) {
                by_phone.remove(&old.phone);
            }
        }

        by_phone.insert(session.phone, session.device);
        Ok(())
    }

    fn get(&self, device: Uuid) -> AuthResult<Option<Session>> {
        Ok(self.by_device.read().map_err(poisoned)?.get(&device).cloned())
    }

    fn device_for(&self, phone: &str) -> AuthResult<Option<Uuid>> {
        Ok(self.by_phone.read().map_err(poisoned)?.get(phone).copied())
    }

    fn remove_by_device(&self, device: Uuid) -> AuthResult<bool> {
        let removed = self.by_device.write().map_err(poisoned)?.remove(&device);

        if let Some(session) = &removed {
            let mut by_phone = self.by_phone.write().map_err(poisoned)?;
            if by_phone.get(&session.phone) == Some(&device) {
                by_phone.remove(&session.phone);
            }
        }

        Ok(removed.is_some())
    }

    fn remove_by_phone(&self, phone: &str) -> AuthResult<bool> {
        let device = self.by_phone.write().map_err(poisoned)?.remove(phone);

        match device {
            Some(device) => {
                self.by_device.write().map_err(poisoned)?.remove(&device);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
