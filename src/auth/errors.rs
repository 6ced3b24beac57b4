//! Auth errors
//!
//! Business-rule failures carry a numeric code and a human-readable
//! message; they are values, never panics.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    // ==================
    // Business-rule failures
    // ==================
    /// Caller presented no device identifier
    #[error("unknown device")]
    UnknownDevice,

    /// Login input failed validation
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No account for the presented phone number
    #[error("account not found")]
    AccountNotFound,

    /// Password digest mismatch
    #[error("incorrect password")]
    BadCredentials,

    // ==================
    // Infrastructure failures
    // ==================
    /// Session cache operation failed
    #[error("session cache unavailable: {0}")]
    CacheUnavailable(String),

    /// Account lookup failed in the document store
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Numeric business code reported alongside the message
    pub fn code(&self) -> i32 {
        match self {
            AuthError::UnknownDevice
            | AuthError::InvalidInput(_)
            | AuthError::AccountNotFound
            | AuthError::BadCredentials => -1,

            AuthError::CacheUnavailable(_) | AuthError::Store(_) => -2,
        }
    }

    /// Whether this is a business-rule rejection rather than an
    /// infrastructure fault
    pub fn is_business(&self) -> bool {
        self.code() == -1
    }
}
