//! Order fulfilment status.

use serde::{Deserialize, Serialize};

/// Where an order is in its lifecycle, derived from its timestamps.
///
/// State transitions:
/// ```text
/// Pending ──► Shipped ──► Completed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order has been placed but not shipped.
    #[default]
    Pending,

    /// Order has left the warehouse.
    Shipped,

    /// Order has been delivered (terminal state).
    Completed,
}

impl OrderStatus {
    /// Returns true if the order can be shipped in this status.
    pub fn can_ship(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if the order can be completed in this status.
    pub fn can_complete(&self) -> bool {
        matches!(self, OrderStatus::Shipped)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "shipped" => Ok(OrderStatus::Shipped),
            "completed" => Ok(OrderStatus::Completed),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}
