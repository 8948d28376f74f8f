use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when talking to the key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The Redis client or server reported an error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A command did not complete before its deadline.
    #[error("Store operation {operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// The store answered with a reply shape the command never produces.
    #[error("Unexpected reply to {command}: {reply}")]
    UnexpectedReply {
        command: &'static str,
        reply: String,
    },
}

/// Result type for key-value store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
