//! End-to-end HTTP tests: router -> orchestrator -> SQLite, with fake
//! order system and checkout provider.

mod common;

use axum::http::{Method, StatusCode};
use payments_types::{CustomerId, OrderId, OrderItem, OrderStatus};
use serde_json::json;
use tower::ServiceExt;

use common::{FakeOrders, body_json, get_as, json_request, post_empty, server};

fn record_body(order_id: OrderId, customer_id: CustomerId, tx: &str, status: &str) -> serde_json::Value {
    json!({
        "order_id": order_id.to_string(),
        "customer_id": customer_id.to_string(),
        "transaction_id": tx,
        "amount": 2000,
        "status": status,
    })
}

#[tokio::test]
async fn test_health() {
    let app = server(FakeOrders::default()).await.router();

    let response = app.oneshot(get_as("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"status": "healthy"}));
}

#[tokio::test]
async fn test_checkout_returns_url_in_envelope() {
    let order_id = OrderId::new();
    let orders = FakeOrders::default().with_order(
        order_id,
        vec![OrderItem {
            name: "Aspirin".into(),
            unit_price: 500,
            quantity: 2,
        }],
    );
    let app = server(orders).await.router();

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/checkout",
            json!({"order_id": order_id.to_string(), "customer_id": CustomerId::new().to_string()}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(
        body["data"]["url"],
        format!("https://checkout.test/{}", order_id)
    );
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_checkout_invalid_uuid_is_validation() {
    let app = server(FakeOrders::default()).await.router();

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/checkout",
            json!({"order_id": "nope", "customer_id": CustomerId::new().to_string()}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["kind"], "validation");
    assert_eq!(body["error"]["retry"], "fix_input");
    assert_eq!(body["error"]["details"]["field"], "order_id");
}

#[tokio::test]
async fn test_checkout_unknown_order_is_not_found() {
    let app = server(FakeOrders::default()).await.router();

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/checkout",
            json!({"order_id": OrderId::new().to_string(), "customer_id": CustomerId::new().to_string()}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"]["retry"], "do_not_retry");
}

#[tokio::test]
async fn test_record_then_lookup_with_caller() {
    let orders = FakeOrders::default();
    let app = server(orders.clone()).await.router();
    let order_id = OrderId::new();
    let customer_id = CustomerId::new();

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/payments",
            record_body(order_id, customer_id, "T1", "succeeded"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "successful");
    let payment_id = body["data"]["payment_id"].as_str().unwrap().to_string();
    assert_eq!(orders.updates(), vec![(order_id, OrderStatus::Paid)]);

    let owner = customer_id.to_string();
    for uri in [
        format!("/api/payments/{}", payment_id),
        format!("/api/payments/orders/{}", order_id),
        "/api/payments/transactions/T1".to_string(),
    ] {
        let response = app
            .clone()
            .oneshot(get_as(&uri, Some(&owner)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        let body = body_json(response).await;
        assert_eq!(body["data"]["id"], payment_id.as_str());
        assert_eq!(body["data"]["transaction_id"], "T1");
        assert_eq!(body["data"]["amount"], 2000);

        let response = app
            .clone()
            .oneshot(get_as(&uri, Some("someone-else")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", uri);
        let body = body_json(response).await;
        assert_eq!(body["error"]["kind"], "authorization");
        assert_eq!(body["error"]["message"], "Access denied");

        let response = app.clone().oneshot(get_as(&uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", uri);
    }

    let response = app
        .oneshot(get_as(&format!("/api/payments/{}", payment_id), Some("admin")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_duplicate_record_is_conflict() {
    let app = server(FakeOrders::default()).await.router();
    let order_id = OrderId::new();

    let first = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/payments",
            record_body(order_id, CustomerId::new(), "T1", "succeeded"),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/payments",
            record_body(OrderId::new(), CustomerId::new(), "T1", "succeeded"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"]["kind"], "conflict");
    assert_eq!(
        body["error"]["message"],
        "payment already recorded for this transaction"
    );
}

#[tokio::test]
async fn test_refund_flow_and_second_refund_conflict() {
    let orders = FakeOrders::default();
    let app = server(orders.clone()).await.router();
    let order_id = OrderId::new();

    app.clone()
        .oneshot(json_request(
            Method::POST,
            "/api/payments",
            record_body(order_id, CustomerId::new(), "T1", "succeeded"),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_empty("/api/payments/transactions/T1/refund"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"success": true, "data": {}})
    );

    let response = app
        .clone()
        .oneshot(post_empty("/api/payments/transactions/T1/refund"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["error"]["details"]["current_status"],
        "refunded"
    );

    let response = app
        .oneshot(post_empty("/api/payments/transactions/T404/refund"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_eq!(
        orders.updates(),
        vec![(order_id, OrderStatus::Paid), (order_id, OrderStatus::Refunded)]
    );
}

#[tokio::test]
async fn test_notify_failure_is_bad_gateway_then_resync() {
    let orders = FakeOrders::default();
    let app = server(orders.clone()).await.router();
    let order_id = OrderId::new();
    orders.set_failing(true);

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/payments",
            record_body(order_id, CustomerId::new(), "T1", "card_declined"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["kind"], "dependency");
    assert_eq!(body["error"]["retry"], "retry_downstream");
    assert_eq!(body["error"]["details"]["order_id"], order_id.to_string());
    assert_eq!(body["error"]["details"]["payment_status"], "failed");

    orders.set_failing(false);
    let response = app
        .oneshot(post_empty("/api/payments/transactions/T1/order-status"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["order_id"], order_id.to_string());
    assert_eq!(body["data"]["order_status"], "payment_failed");
    assert_eq!(orders.updates(), vec![(order_id, OrderStatus::PaymentFailed)]);
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = server(FakeOrders::default()).await.router();

    let response = app
        .oneshot(get_as("/api-docs/openapi.json", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;
    assert!(doc["paths"].get("/api/checkout").is_some());
}

#[tokio::test]
async fn test_record_with_fractional_amount_is_validation() {
    let app = server(FakeOrders::default()).await.router();
    let mut body = record_body(OrderId::new(), CustomerId::new(), "T1", "succeeded");
    body["amount"] = json!(20.00);

    let response = app
        .oneshot(json_request(Method::POST, "/api/payments", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["kind"], "validation");
    assert_eq!(body["error"]["retry"], "fix_input");
}

#[tokio::test]
async fn test_record_missing_amount_is_validation() {
    let orders = FakeOrders::default();
    let app = server(orders.clone()).await.router();
    let mut body = record_body(OrderId::new(), CustomerId::new(), "T1", "succeeded");
    body.as_object_mut().unwrap().remove("amount");

    let response = app
        .oneshot(json_request(Method::POST, "/api/payments", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["kind"], "validation");
    assert!(orders.updates().is_empty());
}

#[tokio::test]
async fn test_checkout_malformed_json_is_validation() {
    let app = server(FakeOrders::default()).await.router();
    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/checkout")
        .header("Content-Type", "application/json")
        .body(axum::body::Body::from("{\"order_id\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["kind"], "validation");
    assert_eq!(body["error"]["details"]["field"], "body");
}
