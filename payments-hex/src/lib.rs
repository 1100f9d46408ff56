//! # Payments Hex
//!
//! Application service layer and HTTP adapter for the payment orchestration service.
//!
//! ## Architecture
//!
//! - `service/` - Payment orchestrator (owns every payment invariant)
//! - `inbound/` - HTTP adapter (Axum server)
//! - `openapi/` - OpenAPI document served by Swagger UI
//!
//! The service is generic over `R: PaymentRepository`, `O: OrderClient` and
//! `C: CheckoutProvider`, allowing different adapters to be injected.

pub mod inbound;
pub mod openapi;
pub mod service;


pub use service::{PaymentService, ServiceConfig};
