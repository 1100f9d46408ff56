//! Integration tests for rate limiting middleware.
//!
//! These tests verify the HTTP-level behavior of rate limiting,
//! including 429 responses and per-caller buckets keyed by `X-Caller-Id`.

mod common;

use axum::http::StatusCode;
use tower::ServiceExt;

use common::{body_json, get_as, server_with_rate_limit};

/// A lookup of an unknown payment: 404 when admitted, 429 when limited.
fn lookup(caller: Option<&str>) -> axum::http::Request<axum::body::Body> {
    get_as("/api/payments/transactions/T-missing", caller)
}

#[tokio::test]
async fn test_rate_limiting_returns_429_when_exceeded() {
    // Create server with only 3 requests allowed per minute
    let app = server_with_rate_limit(3).await.router();

    for i in 1..=3 {
        let response = app.clone().oneshot(lookup(Some("cust-a"))).await.unwrap();
        assert_ne!(
            response.status(),
            StatusCode::TOO_MANY_REQUESTS,
            "Request {} should not be rate limited (quota not yet exceeded)",
            i
        );
    }

    // 4th request should be rate limited
    let response = app.clone().oneshot(lookup(Some("cust-a"))).await.unwrap();
    assert_eq!(
        response.status(),
        StatusCode::TOO_MANY_REQUESTS,
        "Request should be rate limited after exceeding quota"
    );

    let json = body_json(response).await;
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .contains("Rate limit exceeded")
    );
    assert_eq!(json["retry_after_seconds"], 60);
}

#[tokio::test]
async fn test_rate_limiting_health_endpoint_bypassed() {
    let app = server_with_rate_limit(1).await.router();

    // Health endpoint bypasses rate limiting entirely
    for _ in 0..10 {
        let response = app.clone().oneshot(get_as("/health", None)).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::OK,
            "Health endpoint should not be rate limited"
        );
    }
}

#[tokio::test]
async fn test_rate_limiting_per_caller_isolation() {
    let app = server_with_rate_limit(1).await.router();

    let response = app.clone().oneshot(lookup(Some("cust-a"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.clone().oneshot(lookup(Some("cust-a"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // Caller B has its own quota
    let response = app.clone().oneshot(lookup(Some("cust-b"))).await.unwrap();
    assert_eq!(
        response.status(),
        StatusCode::NOT_FOUND,
        "Caller B should have its own quota"
    );
}

#[tokio::test]
async fn test_rate_limiting_anonymous_share_one_bucket() {
    let app = server_with_rate_limit(1).await.router();

    let response = app.clone().oneshot(lookup(None)).await.unwrap();
    assert_ne!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let response = app.clone().oneshot(lookup(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("application/json"));
}
