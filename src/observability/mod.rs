//! Observability for docbase
//!
//! Structured JSON logging only. Logging is synchronous, line-oriented,
//! and deterministic; a logging failure never fails the operation that
//! produced it.

mod logger;

pub use logger::{Logger, Severity};
