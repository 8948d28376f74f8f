//! Domain layer for the order repository.
//!
//! This crate provides:
//! - The `Order` record and its value objects
//! - The key-space policy mapping order IDs to store keys
//! - `OrderRepository`, the CRUD and pagination surface over a key-value store

pub mod error;
pub mod order;

pub use common::OrderId;
pub use error::{RepositoryError, Result};
pub use order::{
    Cursor, CustomerId, DEFAULT_PAGE_SIZE, FindAllPage, FindResult, LineItem, Money, Order,
    OrderError, OrderRepository, OrderStatus, order_key,
};
pub use order::{decode as decode_order, encode as encode_order};
