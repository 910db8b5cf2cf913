use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use server::routes::AppState;
use server::startup::build_app;
use service::kv::MemoryKv;

fn app() -> Router {
    build_app(AppState::new(Arc::new(MemoryKv::new())))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/data")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let (status, body) = send(&app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn unwritten_key_reads_as_empty_list() {
    let (status, body) = send(&app(), get("/api/data?key=goldenglass_products")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "data": [] }));
}

#[tokio::test]
async fn write_then_read_back() {
    let app = app();
    let payload = json!({ "key": "goldenglass_settings", "data": { "storeName": "Golden Glass" } });
    let (status, body) = send(&app, post(&payload.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, body) = send(&app, get("/api/data?key=goldenglass_settings")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "data": { "storeName": "Golden Glass" } }));

    // last write wins
    send(&app, post(r#"{"key":"goldenglass_settings","data":[1]}"#)).await;
    let (_, body) = send(&app, get("/api/data?key=goldenglass_settings")).await;
    assert_eq!(body, json!({ "data": [1] }));
}

#[tokio::test]
async fn missing_key_is_a_client_error() {
    let app = app();
    for uri in ["/api/data", "/api/data?key=", "/api/data?key=%20"] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, json!({ "error": "Key is required" }));
    }

    let (status, body) = send(&app, post(r#"{"data":[1]}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Key is required");
}

#[tokio::test]
async fn missing_data_or_bad_json_is_a_client_error() {
    let app = app();
    let (status, body) = send(&app, post(r#"{"key":"k"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Data is required" }));

    let (status, body) = send(&app, post("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    // nothing was stored by the rejected requests
    let (_, body) = send(&app, get("/api/data?key=k")).await;
    assert_eq!(body, json!({ "data": [] }));
}

#[tokio::test]
async fn metrics_and_docs_are_served() {
    let app = app();
    send(&app, get("/api/data?key=goldenglass_banners")).await;

    let resp = app.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let text = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&text).contains("goldenglass_kv_reads_total"));

    let (status, doc) = send(&app, get("/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/data"].is_object());
}
