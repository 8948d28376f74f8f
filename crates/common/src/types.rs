use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an order.
///
/// Assigned by the caller, never by the repository. The decimal rendering
/// produced by `Display` is part of the stored key format.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OrderId(u64);

impl OrderId {
    /// Creates an order ID from a raw value.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Creates a new random order ID for callers that have no natural one.
    pub fn random() -> Self {
        Self(Uuid::new_v4().as_u64_pair().0)
    }

    /// Returns the underlying value.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OrderId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<OrderId> for u64 {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_random_creates_unique_ids() {
        let id1 = OrderId::random();
        let id2 = OrderId::random();
        assert_ne!(id1, id2);
    }

    #[test]
    fn order_id_displays_as_decimal() {
        assert_eq!(OrderId::new(42).to_string(), "42");
        assert_eq!(OrderId::new(u64::MAX).to_string(), "18446744073709551615");
    }

    #[test]
    fn order_id_parses_decimal() {
        assert_eq!("7".parse::<OrderId>().unwrap(), OrderId::new(7));
        assert!("-1".parse::<OrderId>().is_err());
        assert!("abc".parse::<OrderId>().is_err());
    }

    #[test]
    fn order_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&OrderId::new(12)).unwrap();
        assert_eq!(json, "12");
        let deserialized: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, OrderId::new(12));
    }
}
