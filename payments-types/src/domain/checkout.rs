//! Hosted checkout session types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::order::{Order, OrderItem};
use crate::error::DomainError;

/// Metadata key carrying the order id through the provider.
pub const METADATA_ORDER_ID: &str = "order_id";
/// Metadata key carrying the customer id through the provider.
pub const METADATA_CUSTOMER_ID: &str = "customer_id";

/// One checkout line, derived 1:1 from an order item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    /// Unit price in smallest currency unit
    pub unit_amount: i64,
    pub quantity: i64,
}

impl LineItem {
    /// Converts an order item; quantity and price must both be positive.
    pub fn from_order_item(index: usize, item: &OrderItem) -> Result<Self, DomainError> {
        if item.quantity <= 0 {
            return Err(DomainError::InvalidLineItem {
                index,
                name: item.name.clone(),
                reason: format!("quantity must be positive, got {}", item.quantity),
            });
        }
        if item.unit_price <= 0 {
            return Err(DomainError::InvalidLineItem {
                index,
                name: item.name.clone(),
                reason: format!("unit price must be positive, got {}", item.unit_price),
            });
        }
        Ok(Self {
            name: item.name.clone(),
            unit_amount: item.unit_price,
            quantity: item.quantity,
        })
    }

    /// Builds the line items for an order; an order without items is rejected.
    pub fn for_order(order: &Order) -> Result<Vec<Self>, DomainError> {
        if order.items.is_empty() {
            return Err(DomainError::EmptyOrder(order.id));
        }
        order
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| Self::from_order_item(index, item))
            .collect()
    }
}

/// Request to open a hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSessionRequest {
    pub line_items: Vec<LineItem>,
    /// Where the provider redirects after a successful payment
    pub success_url: String,
    /// Opaque correlation data the provider echoes back unmodified
    pub metadata: BTreeMap<String, String>,
}

/// A created checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider session id; becomes the payment's transaction id
    pub id: String,
    /// Hosted page the customer is redirected to
    pub url: String,
}
