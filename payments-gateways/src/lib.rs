//! # Payments Gateways
//!
//! Outbound adapters for the payment orchestration service:
//! - [`HttpOrderClient`] implements `OrderClient` against the order system's HTTP API
//! - [`StripeCheckout`] implements `CheckoutProvider` with Stripe Checkout Sessions
//!
//! Neither adapter retries. Each request timeout is capped by the caller's
//! remaining deadline.

mod http;
pub mod order;
pub mod stripe;

pub use order::HttpOrderClient;
pub use stripe::{StripeCheckout, StripeConfig};
