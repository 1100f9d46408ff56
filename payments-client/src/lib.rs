//! # Payments Client SDK
//!
//! A typed Rust client for the payment orchestration API. Every response
//! envelope is unwrapped into `Result<T, ClientError>`.

use std::time::Duration;

use payments_types::{
    ApiResponse, CheckoutUrlRequest, CheckoutUrlResponse, CustomerId, ErrorDetails, ErrorKind,
    OrderId, OrderSyncResponse, PaymentId, PaymentResponse, RecordPaymentRequest,
    RecordPaymentResponse, RefundResponse, RetryAdvice,
};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

const CALLER_HEADER: &str = "X-Caller-Id";
const TIMEOUT_HEADER: &str = "X-Request-Timeout-Ms";

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A failure envelope from the service. `kind` and `retry` are absent
    /// when the body was not an envelope (e.g. rate limiting).
    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        kind: Option<ErrorKind>,
        message: String,
        details: ErrorDetails,
        retry: Option<RetryAdvice>,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid base URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// The service's error kind, if the failure came from an envelope.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Api { kind, .. } => *kind,
            _ => None,
        }
    }
}

/// Payment orchestration API client.
pub struct PaymentsClient {
    base_url: String,
    caller_id: Option<String>,
    timeout: Option<Duration>,
    http: Client,
}

impl PaymentsClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            caller_id: None,
            timeout: None,
            http: Client::new(),
        }
    }

    /// Sets the identity asserted in `X-Caller-Id`.
    pub fn with_caller_id(mut self, caller_id: impl Into<String>) -> Self {
        self.caller_id = Some(caller_id.into());
        self
    }

    /// Sets a per-request deadline, sent to the service and enforced locally.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self.request(Method::GET, &["health"])?.send().await?;
        Ok(resp.status().is_success())
    }

    /// Opens a hosted checkout session and returns its URL.
    pub async fn create_checkout(
        &self,
        order_id: OrderId,
        customer_id: CustomerId,
    ) -> Result<String, ClientError> {
        let req = CheckoutUrlRequest {
            order_id: order_id.to_string(),
            customer_id: customer_id.to_string(),
        };
        let resp: CheckoutUrlResponse = self
            .send(self.request(Method::POST, &["api", "checkout"])?.json(&req))
            .await?;
        Ok(resp.url)
    }

    /// Records the outcome reported by the checkout provider.
    pub async fn record_payment(
        &self,
        req: &RecordPaymentRequest,
    ) -> Result<RecordPaymentResponse, ClientError> {
        self.send(self.request(Method::POST, &["api", "payments"])?.json(req))
            .await
    }

    /// Refunds the successful payment of a transaction.
    pub async fn refund_payment(&self, transaction_id: &str) -> Result<(), ClientError> {
        let _: RefundResponse = self
            .send(self.request(
                Method::POST,
                &["api", "payments", "transactions", transaction_id, "refund"],
            )?)
            .await?;
        Ok(())
    }

    /// Re-sends the order status implied by a transaction's payment.
    pub async fn resync_order_status(
        &self,
        transaction_id: &str,
    ) -> Result<OrderSyncResponse, ClientError> {
        self.send(self.request(
            Method::POST,
            &["api", "payments", "transactions", transaction_id, "order-status"],
        )?)
        .await
    }

    /// Gets a payment by ID.
    pub async fn get_payment(&self, id: PaymentId) -> Result<PaymentResponse, ClientError> {
        let id = id.to_string();
        self.send(self.request(Method::GET, &["api", "payments", &id])?)
            .await
    }

    /// Gets the payment of an order.
    pub async fn get_payment_by_order_id(
        &self,
        order_id: OrderId,
    ) -> Result<PaymentResponse, ClientError> {
        let id = order_id.to_string();
        self.send(self.request(Method::GET, &["api", "payments", "orders", &id])?)
            .await
    }

    /// Gets a payment by provider transaction id.
    pub async fn get_payment_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<PaymentResponse, ClientError> {
        self.send(self.request(
            Method::GET,
            &["api", "payments", "transactions", transaction_id],
        )?)
        .await
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ClientError> {
        let mut req = self.http.request(method, self.url(segments)?);
        if let Some(caller) = &self.caller_id {
            req = req.header(CALLER_HEADER, caller);
        }
        if let Some(timeout) = self.timeout {
            req = req
                .header(TIMEOUT_HEADER, timeout.as_millis().to_string())
                .timeout(timeout);
        }
        Ok(req)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        decode(status, &body)
    }
}

/// Unwraps a response envelope.
fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ClientError> {
    if status.is_success() {
        let envelope: ApiResponse<T> = serde_json::from_str(body)?;
        if let Some(data) = envelope.data {
            return Ok(data);
        }
    }

    if let Ok(ApiResponse::<serde_json::Value> {
        error: Some(error), ..
    }) = serde_json::from_str(body)
    {
        return Err(ClientError::Api {
            status: status.as_u16(),
            kind: Some(error.kind),
            message: error.message,
            details: error.details,
            retry: Some(error.retry),
        });
    }

    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string());
    Err(ClientError::Api {
        status: status.as_u16(),
        kind: None,
        message,
        details: ErrorDetails::new(),
        retry: None,
    })
}
