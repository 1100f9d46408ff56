//! HTTP Server configuration and startup.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use payments_types::{CheckoutProvider, OrderClient, PaymentRepository};

use super::handlers::{self, AppState};
use super::rate_limit::{RateLimiterState, rate_limit_middleware};
use crate::PaymentService;
use crate::openapi::ApiDoc;

/// Budget for a request that sends no `X-Request-Timeout-Ms`.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP Server for the Payments API.
pub struct HttpServer<R, O, C>
where
    R: PaymentRepository,
    O: OrderClient,
    C: CheckoutProvider,
{
    state: Arc<AppState<R, O, C>>,
    rate_limiter: Arc<RateLimiterState>,
}

impl<R, O, C> HttpServer<R, O, C>
where
    R: PaymentRepository,
    O: OrderClient,
    C: CheckoutProvider,
{
    /// Creates a new HTTP server with the given service.
    pub fn new(service: PaymentService<R, O, C>) -> Self {
        Self::build(service, RateLimiterState::default(), DEFAULT_REQUEST_TIMEOUT) // 100 req/min default
    }

    /// Creates a new HTTP server with custom rate limiting.
    pub fn with_rate_limit(service: PaymentService<R, O, C>, requests_per_minute: u32) -> Self {
        Self::build(
            service,
            RateLimiterState::new(requests_per_minute, Duration::from_secs(60)),
            DEFAULT_REQUEST_TIMEOUT,
        )
    }

    /// Sets the budget used when callers send no deadline header.
    ///
    /// Has no effect once `router()` has handed out the shared state.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        if let Some(state) = Arc::get_mut(&mut self.state) {
            state.request_timeout = timeout;
        }
        self
    }

    fn build(
        service: PaymentService<R, O, C>,
        rate_limiter: RateLimiterState,
        request_timeout: Duration,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                service,
                request_timeout,
            }),
            rate_limiter: Arc::new(rate_limiter),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        let api = Router::new()
            .route("/health", get(handlers::health))
            .route("/api/checkout", post(handlers::create_checkout::<R, O, C>))
            .route("/api/payments", post(handlers::record_payment::<R, O, C>))
            .route(
                "/api/payments/transactions/{transaction_id}",
                get(handlers::get_payment_by_transaction_id::<R, O, C>),
            )
            .route(
                "/api/payments/transactions/{transaction_id}/refund",
                post(handlers::refund_payment::<R, O, C>),
            )
            .route(
                "/api/payments/transactions/{transaction_id}/order-status",
                post(handlers::resync_order_status::<R, O, C>),
            )
            .route(
                "/api/payments/orders/{order_id}",
                get(handlers::get_payment_by_order_id::<R, O, C>),
            )
            .route(
                "/api/payments/{payment_id}",
                get(handlers::get_payment::<R, O, C>),
            )
            .with_state(self.state.clone());

        api.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
            .layer(metrics)
            .layer(middleware::from_fn_with_state(
                self.rate_limiter.clone(),
                rate_limit_middleware,
            ))
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
