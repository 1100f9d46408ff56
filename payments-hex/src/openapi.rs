//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use payments_types::domain::{CustomerId, OrderId, OrderStatus, PaymentId, PaymentStatus};
use payments_types::dto::{
    ApiResponse, CheckoutUrlRequest, CheckoutUrlResponse, ErrorBody, OrderSyncResponse,
    PaymentResponse, RecordPaymentRequest, RecordPaymentResponse, RefundResponse,
};
use payments_types::error::{ErrorKind, RetryAdvice};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::inbound::caller::CALLER_HEADER;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Generate a hosted checkout URL for an order
#[utoipa::path(
    post,
    path = "/api/checkout",
    tag = "checkout",
    request_body = CheckoutUrlRequest,
    params(
        ("X-Request-Timeout-Ms" = Option<u64>, Header, description = "Caller deadline in milliseconds")
    ),
    responses(
        (status = 200, description = "Checkout session opened", body = ApiResponse<CheckoutUrlResponse>),
        (status = 400, description = "Invalid ids or order items"),
        (status = 404, description = "Order not found"),
        (status = 502, description = "Order system or checkout provider failed"),
        (status = 504, description = "Deadline exceeded")
    )
)]
async fn create_checkout() {}

/// Record the outcome of a checkout
#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "payments",
    request_body = RecordPaymentRequest,
    responses(
        (status = 201, description = "Payment recorded and order notified", body = ApiResponse<RecordPaymentResponse>),
        (status = 400, description = "Empty transaction id or negative amount"),
        (status = 409, description = "Transaction or order already has a payment"),
        (status = 502, description = "Payment recorded but order notification failed; retry via order-status")
    )
)]
async fn record_payment() {}

/// Refund a successful payment
#[utoipa::path(
    post,
    path = "/api/payments/transactions/{transaction_id}/refund",
    tag = "payments",
    params(
        ("transaction_id" = String, Path, description = "Provider transaction id")
    ),
    responses(
        (status = 200, description = "Payment refunded", body = ApiResponse<RefundResponse>),
        (status = 404, description = "Unknown transaction"),
        (status = 409, description = "Payment is not successful"),
        (status = 502, description = "Refund stored but order notification failed; retry via order-status")
    )
)]
async fn refund_payment() {}

/// Re-send the order status implied by a payment
#[utoipa::path(
    post,
    path = "/api/payments/transactions/{transaction_id}/order-status",
    tag = "payments",
    params(
        ("transaction_id" = String, Path, description = "Provider transaction id")
    ),
    responses(
        (status = 200, description = "Order status pushed", body = ApiResponse<OrderSyncResponse>),
        (status = 404, description = "Unknown transaction"),
        (status = 409, description = "Payment is still pending"),
        (status = 502, description = "Order system failed")
    )
)]
async fn resync_order_status() {}

/// Get a payment by provider transaction id
#[utoipa::path(
    get,
    path = "/api/payments/transactions/{transaction_id}",
    tag = "lookups",
    security(("caller_id" = [])),
    params(
        ("transaction_id" = String, Path, description = "Provider transaction id")
    ),
    responses(
        (status = 200, description = "Payment found", body = ApiResponse<PaymentResponse>),
        (status = 403, description = "Caller is neither admin nor the paying customer"),
        (status = 404, description = "Payment not found")
    )
)]
async fn get_payment_by_transaction_id() {}

/// Get a payment by ID
#[utoipa::path(
    get,
    path = "/api/payments/{payment_id}",
    tag = "lookups",
    security(("caller_id" = [])),
    params(
        ("payment_id" = String, Path, description = "Payment ID (UUID)")
    ),
    responses(
        (status = 200, description = "Payment found", body = ApiResponse<PaymentResponse>),
        (status = 400, description = "Invalid payment ID"),
        (status = 403, description = "Caller is neither admin nor the paying customer"),
        (status = 404, description = "Payment not found")
    )
)]
async fn get_payment() {}

/// Get the payment of an order
#[utoipa::path(
    get,
    path = "/api/payments/orders/{order_id}",
    tag = "lookups",
    security(("caller_id" = [])),
    params(
        ("order_id" = String, Path, description = "Order ID (UUID)")
    ),
    responses(
        (status = 200, description = "Payment found", body = ApiResponse<PaymentResponse>),
        (status = 400, description = "Invalid order ID"),
        (status = 403, description = "Caller is neither admin nor the paying customer"),
        (status = 404, description = "Payment not found")
    )
)]
async fn get_payment_by_order_id() {}

/// OpenAPI documentation for the Payments API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Payment Orchestration Service API",
        version = "1.0.0",
        description = "Generates hosted checkout URLs, records payment outcomes, issues refunds and keeps the order system in sync.\n\n## Caller identity\n\nLookups are authorized against the `X-Caller-Id` header: the admin identity or the paying customer's id.\n\n## Errors\n\nEvery failure is an envelope `{\"success\": false, \"error\": {\"kind\", \"message\", \"details\", \"retry\"}}`. A `dependency` error after a recorded payment or refund means the local write succeeded; retry the order notification with `POST /api/payments/transactions/{transaction_id}/order-status`.",
        license(name = "MIT"),
    ),
    paths(
        health,
        create_checkout,
        record_payment,
        refund_payment,
        resync_order_status,
        get_payment_by_transaction_id,
        get_payment,
        get_payment_by_order_id,
    ),
    components(
        schemas(
            CheckoutUrlRequest,
            CheckoutUrlResponse,
            RecordPaymentRequest,
            RecordPaymentResponse,
            RefundResponse,
            OrderSyncResponse,
            PaymentResponse,
            ErrorBody,
            ErrorKind,
            RetryAdvice,
            PaymentStatus,
            OrderStatus,
            PaymentId,
            OrderId,
            CustomerId,
        )
    ),

    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "checkout", description = "Hosted checkout sessions"),
        (name = "payments", description = "Payment outcome, refund and order status sync"),
        (name = "lookups", description = "Payment reads authorized by caller identity"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for the asserted caller identity header.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "caller_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(CALLER_HEADER))),
            );
        }
    }
}
