//! Key-value store collaborator for the order repository.
//!
//! Exposes the handful of primitives the repository relies on (point reads,
//! conditional writes, set scans, multi-get and atomic write batches) behind
//! the [`KeyValueStore`] trait, with an in-memory and a Redis implementation.

pub mod error;
pub mod memory;
pub mod redis_store;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryKeyValueStore;
pub use redis_store::{RedisConfig, RedisKeyValueStore};
pub use store::{KeyValueStore, ScanPage, WriteBatch, WriteCommand};
