//! HTTP adapter for the order system.

use std::time::Duration;

use async_trait::async_trait;
use payments_types::{CallContext, Caller, GatewayError, Order, OrderClient, OrderId, OrderStatus};
use reqwest::Client;
use serde::Serialize;

use crate::http::{bounded_timeout, send_error, status_error};

const SERVICE: &str = "order service";

/// Header carrying the identity the order system authorizes against.
pub const CALLER_HEADER: &str = "X-Caller-Id";

#[derive(Serialize)]
struct StatusUpdate {
    status: OrderStatus,
}

/// Order system client.
///
/// - `GET  {base}/api/orders/{id}` with `X-Caller-Id`
/// - `PUT  {base}/api/orders/{id}/status` with `{"status": ...}`
pub struct HttpOrderClient {
    base_url: String,
    http: Client,
    timeout: Duration,
}

impl HttpOrderClient {
    /// Default per-request timeout when the caller has no deadline.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn order_url(&self, order_id: OrderId) -> String {
        format!("{}/api/orders/{}", self.base_url, order_id)
    }

    async fn failure(order_id: OrderId, resp: reqwest::Response) -> GatewayError {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        status_error(SERVICE, || format!("order {}", order_id), status, body)
    }
}

#[async_trait]
impl OrderClient for HttpOrderClient {
    async fn fetch_order(
        &self,
        ctx: &CallContext,
        order_id: OrderId,
        as_identity: &Caller,
    ) -> Result<Order, GatewayError> {
        let resp = self
            .http
            .get(self.order_url(order_id))
            .header(CALLER_HEADER, as_identity.as_str())
            .timeout(bounded_timeout(ctx, self.timeout))
            .send()
            .await
            .map_err(|e| send_error(SERVICE, e))?;

        if !resp.status().is_success() {
            return Err(Self::failure(order_id, resp).await);
        }

        let order: Order = resp
            .json()
            .await
            .map_err(|e| GatewayError::Rejected(format!("invalid order payload: {}", e)))?;

        tracing::debug!(%order_id, items = order.items.len(), "fetched order");
        Ok(order)
    }

    async fn update_status(
        &self,
        ctx: &CallContext,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), GatewayError> {
        let resp = self
            .http
            .put(format!("{}/status", self.order_url(order_id)))
            .json(&StatusUpdate { status })
            .timeout(bounded_timeout(ctx, self.timeout))
            .send()
            .await
            .map_err(|e| send_error(SERVICE, e))?;

        if !resp.status().is_success() {
            return Err(Self::failure(order_id, resp).await);
        }

        tracing::debug!(%order_id, %status, "order status updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = HttpOrderClient::new("http://localhost:50053/");
        let id = OrderId::new();
        assert_eq!(
            client.order_url(id),
            format!("http://localhost:50053/api/orders/{}", id)
        );
    }

    #[test]
    fn test_status_update_body() {
        let body = serde_json::to_value(StatusUpdate {
            status: OrderStatus::PaymentFailed,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"status": "payment_failed"}));
    }
}
