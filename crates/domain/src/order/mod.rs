//! Order record, key-space policy and repository.

mod codec;
mod keyspace;
mod page;
mod record;
mod repository;
mod status;
mod value_objects;

pub use codec::{decode, encode};
pub use keyspace::{ORDER_INDEX, ORDER_KEY_PATTERN, order_key};
pub use page::{Cursor, DEFAULT_PAGE_SIZE, FindAllPage, FindResult};
pub use record::Order;
pub use repository::OrderRepository;
pub use status::OrderStatus;
pub use value_objects::{CustomerId, LineItem, Money};

use thiserror::Error;

/// Errors that can occur when changing an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Order is not in a status that allows the action.
    #[error("Invalid status transition: cannot {action} a {current} order")]
    InvalidStatusTransition {
        current: OrderStatus,
        action: &'static str,
    },
}
