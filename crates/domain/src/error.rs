//! Repository error types.

use common::OrderId;
use kv_store::StoreError;
use thiserror::Error;

/// Errors returned by the order repository.
///
/// Every lower-level cause is kept as the error's `source`.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No record exists for the requested order ID.
    #[error("Order does not exist")]
    NotExist,

    /// A record already exists for this order ID.
    #[error("Order {0} already exists")]
    AlreadyExists(OrderId),

    /// The order could not be serialized.
    #[error("Failed to encode order: {0}")]
    Encode(#[source] serde_json::Error),

    /// Stored bytes could not be deserialized (corruption or schema drift).
    #[error("Failed to decode order at {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A write to the store failed.
    #[error("Store write failed: {0}")]
    StoreWrite(#[source] StoreError),

    /// A read from the store failed.
    #[error("Store read failed: {0}")]
    StoreRead(#[source] StoreError),
}

impl RepositoryError {
    /// Returns true for [`RepositoryError::NotExist`].
    pub fn is_not_exist(&self) -> bool {
        matches!(self, RepositoryError::NotExist)
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RepositoryError::NotExist => "not_exist",
            RepositoryError::AlreadyExists(_) => "already_exists",
            RepositoryError::Encode(_) => "encode",
            RepositoryError::Decode { .. } => "decode",
            RepositoryError::StoreWrite(_) => "store_write",
            RepositoryError::StoreRead(_) => "store_read",
        }
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
