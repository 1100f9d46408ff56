//! Domain models for the payment service.

pub mod caller;
pub mod checkout;
pub mod ids;
pub mod order;
pub mod payment;

pub use caller::{CallContext, Caller};
pub use checkout::{CheckoutSession, CheckoutSessionRequest, LineItem};
pub use ids::{CustomerId, OrderId, PaymentId, TransactionId};
pub use order::{Order, OrderItem, OrderStatus};
pub use payment::{Amount, Payment, PaymentStatus, ProviderOutcome};
