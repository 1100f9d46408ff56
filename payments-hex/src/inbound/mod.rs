//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the application layer.

pub mod caller;
mod handlers;
mod rate_limit;
mod server;

pub use handlers::{ApiError, AppState, status_for};
pub use server::{DEFAULT_REQUEST_TIMEOUT, HttpServer};
