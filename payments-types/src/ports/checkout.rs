//! Checkout provider port.

use crate::domain::{CallContext, CheckoutSession, CheckoutSessionRequest};
use crate::error::GatewayError;

/// Hosted checkout provider (e.g. Stripe Checkout).
#[async_trait::async_trait]
pub trait CheckoutProvider: Send + Sync + 'static {
    /// Opens a checkout session and returns its redirect URL.
    ///
    /// The request metadata must be echoed back unmodified by the provider in
    /// its settlement record.
    async fn create_session(
        &self,
        ctx: &CallContext,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError>;
}
