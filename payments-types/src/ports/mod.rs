//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod checkout;
mod order;
mod repository;

pub use checkout::CheckoutProvider;
pub use order::OrderClient;
pub use repository::PaymentRepository;
