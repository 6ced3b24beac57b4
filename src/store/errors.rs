//! Store error taxonomy
//!
//! Every driver-level fault is classified into one of three kinds so
//! callers can react per fault class instead of inspecting logs.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Document store errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Caller-supplied document or filter is malformed
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The store rejected the write (duplicate id, conflicting update)
    #[error("write conflict: {0}")]
    WriteConflict(String),

    /// Driver or connectivity fault
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Short kind tag used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::InvalidArgument(_) => "invalid_argument",
            StoreError::WriteConflict(_) => "write_conflict",
            StoreError::Unavailable(_) => "unavailable",
        }
    }

    /// Whether the fault originates from caller input
    pub fn is_caller_fault(&self) -> bool {
        matches!(self, StoreError::InvalidArgument(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(StoreError::InvalidArgument("x".into()).kind(), "invalid_argument");
        assert_eq!(StoreError::WriteConflict("x".into()).kind(), "write_conflict");
        assert_eq!(StoreError::Unavailable("x".into()).kind(), "unavailable");
    }

    #[test]
    fn test_caller_fault_classification() {
        assert!(StoreError::InvalidArgument("bad filter".into()).is_caller_fault());
        assert!(!StoreError::WriteConflict("dup".into()).is_caller_fault());
        assert!(!StoreError::Unavailable("down".into()).is_caller_fault());
    }
}
