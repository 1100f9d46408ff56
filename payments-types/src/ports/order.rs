//! Order system port.

use crate::domain::{CallContext, Caller, Order, OrderId, OrderStatus};
use crate::error::GatewayError;

/// Client for the external order system.
///
/// Calls are synchronous from the caller's point of view, fallible, and never
/// retried by the implementation.
#[async_trait::async_trait]
pub trait OrderClient: Send + Sync + 'static {
    /// Fetches order contents, reading as `as_identity`.
    async fn fetch_order(
        &self,
        ctx: &CallContext,
        order_id: OrderId,
        as_identity: &Caller,
    ) -> Result<Order, GatewayError>;

    /// Pushes a new order-level status.
    async fn update_status(
        &self,
        ctx: &CallContext,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), GatewayError>;
}
