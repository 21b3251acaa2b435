//! Utilities shared by every connector

pub mod error;
pub mod liveness;
pub mod retry;

pub use error::{DatabaseError, DatabaseResult};
pub use liveness::ConnectionStatus;
pub use retry::{RetryConfig, retry, retry_with_backoff};
