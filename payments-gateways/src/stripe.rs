//! Stripe Checkout Sessions adapter.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use payments_types::{
    CallContext, CheckoutProvider, CheckoutSession, CheckoutSessionRequest, GatewayError,
};
use reqwest::Client;
use serde::Deserialize;

use crate::http::{bounded_timeout, send_error, status_error};

const SERVICE: &str = "stripe";

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";
pub const DEFAULT_CURRENCY: &str = "usd";

/// Provider credentials and defaults, built once at startup.
#[derive(Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub api_base: String,
    pub currency: String,
}

impl StripeConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into().to_lowercase();
        self
    }
}

impl fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("currency", &self.currency)
            .finish()
    }
}

#[derive(Deserialize)]
struct SessionBody {
    id: String,
    url: Option<String>,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

/// Encodes a session request as Stripe's bracketed form fields.
pub fn session_form(currency: &str, request: &CheckoutSessionRequest) -> Vec<(String, String)> {
    let mut form = vec![("mode".to_string(), "payment".to_string())];

    for (i, item) in request.line_items.iter().enumerate() {
        let prefix = format!("line_items[{}]", i);
        form.push((
            format!("{}[price_data][currency]", prefix),
            currency.to_string(),
        ));
        form.push((
            format!("{}[price_data][product_data][name]", prefix),
            item.name.clone(),
        ));
        form.push((
            format!("{}[price_data][unit_amount]", prefix),
            item.unit_amount.to_string(),
        ));
        form.push((format!("{}[quantity]", prefix), item.quantity.to_string()));
    }

    for (key, value) in &request.metadata {
        form.push((format!("metadata[{}]", key), value.clone()));
    }

    form.push(("success_url".to_string(), request.success_url.clone()));
    form
}

/// `CheckoutProvider` backed by `POST /v1/checkout/sessions`.
pub struct StripeCheckout {
    config: StripeConfig,
    http: Client,
    timeout: Duration,
}

impl StripeCheckout {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http: Client::new(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl CheckoutProvider for StripeCheckout {
    async fn create_session(
        &self,
        ctx: &CallContext,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let form = session_form(&self.config.currency, &request);

        let resp = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.config.api_base))
            .bearer_auth(&self.config.secret_key)
            .form(&form)
            .timeout(bounded_timeout(ctx, self.timeout))
            .send()
            .await
            .map_err(|e| send_error(SERVICE, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<StripeErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or(body);
            tracing::warn!(%status, %message, "checkout session rejected");
            return Err(status_error(
                SERVICE,
                || "checkout endpoint".to_string(),
                status,
                message,
            ));
        }

        let body: SessionBody = resp
            .json()
            .await
            .map_err(|e| GatewayError::Rejected(format!("invalid session payload: {}", e)))?;
        let url = body
            .url
            .ok_or_else(|| GatewayError::Rejected(format!("session {} has no url", body.id)))?;

        tracing::info!(session_id = %body.id, "checkout session created");
        Ok(CheckoutSession { id: body.id, url })
    }
}
