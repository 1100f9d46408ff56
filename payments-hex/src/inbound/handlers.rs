//! HTTP request handlers.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use payments_types::{
    ApiResponse, AppError, CheckoutProvider, CheckoutUrlRequest, CheckoutUrlResponse, ErrorBody,
    OrderClient, OrderSyncResponse, PaymentRepository, PaymentResponse, RecordPaymentRequest,
    RecordPaymentResponse, RefundResponse,
};

use super::caller::{caller_from_headers, context_from_headers};
use crate::PaymentService;

/// Application state shared across handlers.
pub struct AppState<R, O, C>
where
    R: PaymentRepository,
    O: OrderClient,
    C: CheckoutProvider,
{
    pub service: PaymentService<R, O, C>,
    /// Budget applied when the caller sends no `X-Request-Timeout-Ms`
    pub request_timeout: Duration,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

/// HTTP status mirroring an error kind. Dependency timeouts are 504.
pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::Validation { .. } => StatusCode::BAD_REQUEST,
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::Conflict { .. } => StatusCode::CONFLICT,
        AppError::Authorization { .. } => StatusCode::FORBIDDEN,
        AppError::Dependency { details, .. } => {
            if details.get("cause").map(String::as_str) == Some("timeout") {
                StatusCode::GATEWAY_TIMEOUT
            } else {
                StatusCode::BAD_GATEWAY
            }
        }
        AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if let AppError::Internal { message, .. } = &self.0 {
            tracing::error!(%message, "internal error");
        }

        let body = ApiResponse::<()>::failure(ErrorBody::from(&self.0));
        (status, Json(body)).into_response()
    }
}

fn parse_id<T: FromStr>(raw: &str, field: &'static str) -> Result<T, AppError> {
    raw.trim().parse().map_err(|_| {
        AppError::validation(format!("invalid {}", field))
            .with_detail("field", field)
            .with_detail("value", raw)
    })
}

/// Unwraps a JSON body; malformed or mistyped bodies become validation errors.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value).map_err(|rejection| {
        AppError::validation(rejection.body_text()).with_detail("field", "body")
    })
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Checkout & outcome
// ─────────────────────────────────────────────────────────────────────────────

/// Generate a hosted checkout URL for an order.
#[tracing::instrument(skip(state, headers, body), fields(order_id = tracing::field::Empty))]
pub async fn create_checkout<R, O, C>(
    State(state): State<Arc<AppState<R, O, C>>>,
    headers: HeaderMap,
    body: Result<Json<CheckoutUrlRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    R: PaymentRepository,
    O: OrderClient,
    C: CheckoutProvider,
{
    let req = json_body(body)?;
    tracing::Span::current().record("order_id", req.order_id.as_str());
    let order_id = parse_id(&req.order_id, "order_id")?;
    let customer_id = parse_id(&req.customer_id, "customer_id")?;
    let ctx = context_from_headers(&headers, state.request_timeout);

    let url = state
        .service
        .generate_checkout_url(&ctx, order_id, customer_id)
        .await?;
    Ok(Json(ApiResponse::ok(CheckoutUrlResponse { url })))
}

/// Record the outcome of a checkout.
#[tracing::instrument(
    skip(state, headers, body),
    fields(order_id = tracing::field::Empty, transaction_id = tracing::field::Empty)
)]
pub async fn record_payment<R, O, C>(
    State(state): State<Arc<AppState<R, O, C>>>,
    headers: HeaderMap,
    body: Result<Json<RecordPaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    R: PaymentRepository,
    O: OrderClient,
    C: CheckoutProvider,
{
    let req = json_body(body)?;
    let span = tracing::Span::current();
    span.record("order_id", req.order_id.as_str());
    span.record("transaction_id", req.transaction_id.as_str());
    let order_id = parse_id(&req.order_id, "order_id")?;
    let customer_id = parse_id(&req.customer_id, "customer_id")?;
    let ctx = context_from_headers(&headers, state.request_timeout);

    let payment = state
        .service
        .record_payment_outcome(
            &ctx,
            order_id,
            customer_id,
            &req.transaction_id,
            req.amount,
            &req.status,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(RecordPaymentResponse {
            message: "payment recorded".to_string(),
            payment_id: payment.id,
            status: payment.status,
        })),
    ))
}

/// Refund a successful payment.
#[tracing::instrument(skip(state, headers))]
pub async fn refund_payment<R, O, C>(
    State(state): State<Arc<AppState<R, O, C>>>,
    headers: HeaderMap,
    Path(transaction_id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    R: PaymentRepository,
    O: OrderClient,
    C: CheckoutProvider,
{
    let ctx = context_from_headers(&headers, state.request_timeout);
    state.service.refund_payment(&ctx, &transaction_id).await?;
    Ok(Json(ApiResponse::ok(RefundResponse {})))
}

/// Re-send the order status implied by a payment.
#[tracing::instrument(skip(state, headers))]
pub async fn resync_order_status<R, O, C>(
    State(state): State<Arc<AppState<R, O, C>>>,
    headers: HeaderMap,
    Path(transaction_id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    R: PaymentRepository,
    O: OrderClient,
    C: CheckoutProvider,
{
    let ctx = context_from_headers(&headers, state.request_timeout);
    let (payment, order_status) = state
        .service
        .resync_order_status(&ctx, &transaction_id)
        .await?;
    Ok(Json(ApiResponse::ok(OrderSyncResponse {
        order_id: payment.order_id,
        order_status,
    })))
}

// ─────────────────────────────────────────────────────────────────────────────
// Lookups
// ─────────────────────────────────────────────────────────────────────────────

/// Get a payment by provider transaction id.
#[tracing::instrument(skip(state, headers))]
pub async fn get_payment_by_transaction_id<R, O, C>(
    State(state): State<Arc<AppState<R, O, C>>>,
    headers: HeaderMap,
    Path(transaction_id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    R: PaymentRepository,
    O: OrderClient,
    C: CheckoutProvider,
{
    let caller = caller_from_headers(&headers);
    let payment = state
        .service
        .get_payment_by_transaction_id(&transaction_id, &caller)
        .await?;
    Ok(Json(ApiResponse::ok(PaymentResponse::from(payment))))
}

/// Get a payment by ID.
#[tracing::instrument(skip(state, headers), fields(payment_id = %id))]
pub async fn get_payment<R, O, C>(
    State(state): State<Arc<AppState<R, O, C>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    R: PaymentRepository,
    O: OrderClient,
    C: CheckoutProvider,
{
    let payment_id = parse_id(&id, "payment_id")?;
    let caller = caller_from_headers(&headers);

    let payment = state.service.get_payment(payment_id, &caller).await?;
    Ok(Json(ApiResponse::ok(PaymentResponse::from(payment))))
}

/// Get the payment of an order.
#[tracing::instrument(skip(state, headers), fields(order_id = %id))]
pub async fn get_payment_by_order_id<R, O, C>(
    State(state): State<Arc<AppState<R, O, C>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    R: PaymentRepository,
    O: OrderClient,
    C: CheckoutProvider,
{
    let order_id = parse_id(&id, "order_id")?;
    let caller = caller_from_headers(&headers);

    let payment = state
        .service
        .get_payment_by_order_id(order_id, &caller)
        .await?;
    Ok(Json(ApiResponse::ok(PaymentResponse::from(payment))))
}

#[cfg(test)]
mod tests {
    use payments_types::OrderId;

    use super::*;

    #[test]
    fn test_status_per_kind() {
        assert_eq!(status_for(&AppError::validation("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&AppError::not_found("x")), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&AppError::conflict("x")), StatusCode::CONFLICT);
        assert_eq!(status_for(&AppError::authorization("x")), StatusCode::FORBIDDEN);
        assert_eq!(status_for(&AppError::dependency("x")), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_for(&AppError::dependency("x").with_detail("cause", "timeout")),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_for(&AppError::internal("x")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_parse_id_rejects_garbage() {
        let err = parse_id::<OrderId>("not-a-uuid", "order_id").unwrap_err();
        assert_eq!(status_for(&err), StatusCode::BAD_REQUEST);
        assert_eq!(err.details()["field"], "order_id");

        let id = OrderId::new();
        assert_eq!(parse_id::<OrderId>(&id.to_string(), "order_id").unwrap(), id);
    }
}
