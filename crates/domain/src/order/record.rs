//! The persisted order record.

use chrono::{DateTime, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};

use super::{CustomerId, LineItem, Money, OrderError, OrderStatus};

/// An order as stored in the key-value store.
///
/// The repository only ever looks at `order_id`; every other field is
/// payload that must survive an encode/decode cycle unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub line_items: Vec<LineItem>,
    pub created_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Creates a pending order placed at `now`.
    pub fn new(
        order_id: OrderId,
        customer_id: CustomerId,
        line_items: Vec<LineItem>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id,
            customer_id,
            line_items,
            created_at: Some(now),
            shipped_at: None,
            completed_at: None,
        }
    }

    /// Returns the lifecycle status implied by the timestamps.
    pub fn status(&self) -> OrderStatus {
        if self.completed_at.is_some() {
            OrderStatus::Completed
        } else if self.shipped_at.is_some() {
            OrderStatus::Shipped
        } else {
            OrderStatus::Pending
        }
    }

    /// Returns the sum of all line totals.
    pub fn total(&self) -> Money {
        self.line_items.iter().map(LineItem::total_price).sum()
    }

    /// Records that the order shipped at `now`.
    pub fn mark_shipped(&mut self, now: DateTime<Utc>) -> Result<(), OrderError> {
        let current = self.status();
        if !current.can_ship() {
            return Err(OrderError::InvalidStatusTransition {
                current,
                action: "ship",
            });
        }
        self.shipped_at = Some(now);
        Ok(())
    }

    /// Records that the order completed at `now`.
    pub fn mark_completed(&mut self, now: DateTime<Utc>) -> Result<(), OrderError> {
        let current = self.status();
        if !current.can_complete() {
            return Err(OrderError::InvalidStatusTransition {
                current,
                action: "complete",
            });
        }
        self.completed_at = Some(now);
        Ok(())
    }

    /// Moves the order to `target`, which must be the next status in its lifecycle.
    pub fn transition_to(
        &mut self,
        target: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        match target {
            OrderStatus::Shipped => self.mark_shipped(now),
            OrderStatus::Completed => self.mark_completed(now),
            OrderStatus::Pending => Err(OrderError::InvalidStatusTransition {
                current: self.status(),
                action: "reopen",
            }),
        }
    }
}
