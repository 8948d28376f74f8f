//! Byte encoding of order records.

use super::Order;

/// Encodes an order as JSON.
pub fn encode(order: &Order) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(order)
}

/// Decodes an order from JSON bytes.
///
/// Empty input is rejected like any other malformed record.
pub fn decode(bytes: &[u8]) -> serde_json::Result<Order> {
    serde_json::from_slice(bytes)
}
