//! Order-system view of an order, as far as payments care about it.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::{CustomerId, OrderId};

/// Order-level status pushed to the order system after a payment change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Paid,
    PaymentFailed,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::PaymentFailed => "payment_failed",
            Self::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    /// Unit price in smallest currency unit
    pub unit_price: i64,
    pub quantity: i64,
}

/// Order contents as returned by the order system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::PaymentFailed).unwrap(),
            r#""payment_failed""#
        );
        assert_eq!(OrderStatus::Paid.as_str(), "paid");
        assert_eq!(OrderStatus::Refunded.to_string(), "refunded");
    }

    #[test]
    fn test_order_deserializes_without_optional_fields() {
        let id = OrderId::new();
        let order: Order = serde_json::from_str(&format!(r#"{{"id":"{id}"}}"#)).unwrap();
        assert!(order.items.is_empty());
        assert!(order.customer_id.is_none());
    }
}
