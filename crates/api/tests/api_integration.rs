//! Integration tests for the API server.

use std::sync::OnceLock;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use kv_store::InMemoryKeyValueStore;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

const CUSTOMER: &str = "6f1c2a7e-4b4d-4f0e-9d57-1f6a3c2b9e10";
const ITEM: &str = "0b8e5a34-2f6c-4d1a-8c3e-7a9b5d4c1e22";

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> axum::Router {
    let state = api::create_state(InMemoryKeyValueStore::new());
    api::create_app(state, get_metrics_handle())
}

/// Sends one request and returns the status and the JSON body (Null when empty).
async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn order_body(order_id: u64) -> Value {
    json!({
        "order_id": order_id,
        "customer_id": CUSTOMER,
        "line_items": [{
            "item_id": ITEM,
            "quantity": 2,
            "price_cents": 1000
        }]
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();
    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["store"], "up");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();
    send(&app, "GET", "/orders/1", None).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_order() {
    let app = setup();
    let (status, json) = send(&app, "POST", "/orders", Some(order_body(42))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["order_id"], 42);
    assert_eq!(json["customer_id"], CUSTOMER);
    assert_eq!(json["status"], "pending");
    assert_eq!(json["total_cents"], 2000);
    assert!(json["created_at"].is_string());
}

#[tokio::test]
async fn test_create_order_without_id_assigns_one() {
    let app = setup();
    let mut body = order_body(0);
    body.as_object_mut().unwrap().remove("order_id");

    let (status, created) = send(&app, "POST", "/orders", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);

    let id = created["order_id"].as_u64().unwrap();
    let (status, fetched) = send(&app, "GET", &format!("/orders/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["order_id"], id);
}

#[tokio::test]
async fn test_create_duplicate_order_conflicts() {
    let app = setup();
    send(&app, "POST", "/orders", Some(order_body(1))).await;

    let (status, json) = send(&app, "POST", "/orders", Some(order_body(1))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn test_create_order_with_invalid_customer() {
    let app = setup();
    let mut body = order_body(1);
    body["customer_id"] = json!("not-a-uuid");

    let (status, _) = send(&app, "POST", "/orders", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_missing_order() {
    let app = setup();
    let (status, json) = send(&app, "GET", "/orders/999", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_get_with_invalid_id() {
    let app = setup();
    let (status, _) = send(&app, "GET", "/orders/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ship_then_complete_order() {
    let app = setup();
    send(&app, "POST", "/orders", Some(order_body(7))).await;

    let (status, json) = send(&app, "PUT", "/orders/7", Some(json!({"status": "shipped"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "shipped");
    assert!(json["shipped_at"].is_string());

    let (status, json) = send(&app, "PUT", "/orders/7", Some(json!({"status": "completed"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "completed");

    let (_, fetched) = send(&app, "GET", "/orders/7", None).await;
    assert_eq!(fetched["status"], "completed");
}

#[tokio::test]
async fn test_invalid_status_transitions() {
    let app = setup();
    send(&app, "POST", "/orders", Some(order_body(7))).await;

    let (status, _) = send(&app, "PUT", "/orders/7", Some(json!({"status": "completed"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, "PUT", "/orders/7", Some(json!({"status": "lost"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "PUT", "/orders/8", Some(json!({"status": "shipped"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_order() {
    let app = setup();
    send(&app, "POST", "/orders", Some(order_body(3))).await;

    let (status, _) = send(&app, "DELETE", "/orders/3", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", "/orders/3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/orders/3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_orders_in_pages() {
    let app = setup();
    for id in 1..=3 {
        send(&app, "POST", "/orders", Some(order_body(id))).await;
    }

    let (status, first) = send(&app, "GET", "/orders?size=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["items"].as_array().unwrap().len(), 2);
    let next = first["next"].as_u64().unwrap();
    assert_ne!(next, 0);

    let (status, second) = send(&app, "GET", &format!("/orders?size=2&cursor={next}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["items"].as_array().unwrap().len(), 1);
    assert_eq!(second["next"], 0);
}

#[tokio::test]
async fn test_list_empty() {
    let app = setup();
    let (status, json) = send(&app, "GET", "/orders", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["items"], json!([]));
    assert_eq!(json["next"], 0);
}

#[tokio::test]
async fn test_list_rejects_bad_page_size() {
    let app = setup();
    let (status, _) = send(&app, "GET", "/orders?size=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/orders?size=1000", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
