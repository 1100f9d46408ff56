//! # Payments Types
//!
//! Domain types and port traits for the payment orchestration service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Payment, Order, checkout line items, caller identity)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects and the response envelope for API boundaries
//! - `error/` - Domain, repository, gateway and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    Amount, CallContext, Caller, CheckoutSession, CheckoutSessionRequest, CustomerId, LineItem,
    Order, OrderId, OrderItem, OrderStatus, Payment, PaymentId, PaymentStatus, ProviderOutcome,
    TransactionId,
};
pub use dto::*;
pub use error::{
    AppError, DomainError, ErrorDetails, ErrorKind, GatewayError, RepoError, RetryAdvice,
    UniqueKey,
};
pub use ports::{CheckoutProvider, OrderClient, PaymentRepository};
