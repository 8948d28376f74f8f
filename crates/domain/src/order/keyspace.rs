//! Where orders live in the key-value store.

use common::OrderId;

/// Name of the set holding the key of every live order.
pub const ORDER_INDEX: &str = "orders";

/// Pattern used when scanning the index; every member is an order key.
pub const ORDER_KEY_PATTERN: &str = "*";

const ORDER_KEY_PREFIX: &str = "order:";

/// Returns the store key for an order: `order:<decimal id>`.
pub fn order_key(id: OrderId) -> String {
    format!("{ORDER_KEY_PREFIX}{id}")
}
