//! Shared fixtures for the HTTP integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use http_body_util::BodyExt;
use payments_hex::{PaymentService, ServiceConfig, inbound::HttpServer};
use payments_repo::SqliteRepo;
use payments_types::{
    CallContext, Caller, CheckoutProvider, CheckoutSession, CheckoutSessionRequest, GatewayError,
    Order, OrderClient, OrderId, OrderItem, OrderStatus,
};

/// Order system double; clones share state so tests can inspect it after
/// the service takes ownership.
#[derive(Clone, Default)]
pub struct FakeOrders {
    orders: Arc<Mutex<HashMap<OrderId, Order>>>,
    updates: Arc<Mutex<Vec<(OrderId, OrderStatus)>>>,
    failing: Arc<AtomicBool>,
}

impl FakeOrders {
    pub fn with_order(self, order_id: OrderId, items: Vec<OrderItem>) -> Self {
        self.orders.lock().unwrap().insert(
            order_id,
            Order {
                id: order_id,
                customer_id: None,
                items,
            },
        );
        self
    }

    pub fn updates(&self) -> Vec<(OrderId, OrderStatus)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl OrderClient for FakeOrders {
    async fn fetch_order(
        &self,
        _ctx: &CallContext,
        order_id: OrderId,
        _as_identity: &Caller,
    ) -> Result<Order, GatewayError> {
        self.orders
            .lock()
            .unwrap()
            .get(&order_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("order {}", order_id)))
    }

    async fn update_status(
        &self,
        _ctx: &CallContext,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), GatewayError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("order service down".into()));
        }
        self.updates.lock().unwrap().push((order_id, status));
        Ok(())
    }
}

/// Checkout provider double.
#[derive(Default)]
pub struct FakeCheckout;

#[async_trait]
impl CheckoutProvider for FakeCheckout {
    async fn create_session(
        &self,
        _ctx: &CallContext,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let order_id = request.metadata.get("order_id").cloned().unwrap_or_default();
        Ok(CheckoutSession {
            id: format!("cs_{}", order_id),
            url: format!("https://checkout.test/{}", order_id),
        })
    }
}

pub type TestServer = HttpServer<SqliteRepo, FakeOrders, FakeCheckout>;

pub async fn service(orders: FakeOrders) -> PaymentService<SqliteRepo, FakeOrders, FakeCheckout> {
    let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
    PaymentService::new(
        repo,
        orders,
        FakeCheckout,
        ServiceConfig::new("http://gateway.test", "admin"),
    )
}

pub async fn server(orders: FakeOrders) -> TestServer {
    HttpServer::new(service(orders).await)
}

pub async fn server_with_rate_limit(requests_per_minute: u32) -> TestServer {
    HttpServer::with_rate_limit(service(FakeOrders::default()).await, requests_per_minute)
}

pub fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn get_as(uri: &str, caller: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(caller) = caller {
        builder = builder.header("X-Caller-Id", caller);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
