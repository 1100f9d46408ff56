//! Data Transfer Objects (DTOs) for requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CustomerId, OrderId, OrderStatus, Payment, PaymentId, PaymentStatus};
use crate::error::{AppError, ErrorDetails, ErrorKind, RetryAdvice};

// ─────────────────────────────────────────────────────────────────────────────
// Response envelope
// ─────────────────────────────────────────────────────────────────────────────

/// Envelope wrapping every API response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: ErrorBody) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Structured failure: kind, human message, optional details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    #[schema(example = "payment already recorded for this transaction")]
    pub message: String,
    #[serde(default, skip_serializing_if = "ErrorDetails::is_empty")]
    pub details: ErrorDetails,
    pub retry: RetryAdvice,
}

impl From<&AppError> for ErrorBody {
    fn from(err: &AppError) -> Self {
        Self {
            kind: err.kind(),
            message: err.message().to_string(),
            details: err.details().clone(),
            retry: err.retry_advice(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Checkout DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to generate a hosted checkout URL for an order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutUrlRequest {
    /// Order ID (UUID)
    #[schema(example = "6f1c2a9e-3b8d-4c55-9a41-0d2f4e7b8c10")]
    pub order_id: String,
    /// Customer ID (UUID)
    #[schema(example = "1d7e4b2a-8c3f-4e91-b6a5-2f0c9d8e7a61")]
    pub customer_id: String,
}

/// Response carrying the hosted checkout page URL.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutUrlResponse {
    #[schema(example = "https://checkout.stripe.com/c/pay/cs_test_a1b2c3")]
    pub url: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Payment DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to record the outcome of a checkout.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordPaymentRequest {
    /// Order ID (UUID)
    pub order_id: String,
    /// Customer ID (UUID)
    pub customer_id: String,
    /// Provider transaction id
    #[schema(example = "cs_test_a1b2c3")]
    pub transaction_id: String,
    /// Amount in smallest currency unit (e.g., cents)
    #[schema(example = 2000)]
    pub amount: i64,
    /// Provider status; only `succeeded` counts as paid
    #[schema(example = "succeeded")]
    pub status: String,
}

/// Confirmation of a recorded payment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordPaymentResponse {
    #[schema(example = "payment recorded")]
    pub message: String,
    pub payment_id: PaymentId,
    pub status: PaymentStatus,
}

/// Empty success payload of a refund.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RefundResponse {}

/// Result of re-sending the order status for a payment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderSyncResponse {
    pub order_id: OrderId,
    pub order_status: OrderStatus,
}

/// A payment as exposed by the lookup endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    #[schema(example = "cs_test_a1b2c3")]
    pub transaction_id: String,
    /// Amount in smallest currency unit
    #[schema(example = 2000)]
    pub amount: i64,
    pub status: PaymentStatus,
    #[schema(value_type = String, example = "2024-01-01T00:00:00Z")]
    pub created_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(p: Payment) -> Self {
        Self {
            id: p.id,
            order_id: p.order_id,
            customer_id: p.customer_id,
            transaction_id: p.transaction_id.into(),
            amount: p.amount.minor_units(),
            status: p.status,
            created_at: p.created_at,
        }
    }
}
