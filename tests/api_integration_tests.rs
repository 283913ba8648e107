//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use asset_cache::{api::create_router, AppState, AssetCache, CacheConfig};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    let cache = AssetCache::new(CacheConfig::default()).unwrap();
    create_router(AppState::new(cache))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// == SET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let app = create_test_app();

    let response = app
        .oneshot(json_request(
            "PUT",
            "/set",
            r#"{"key":"unit:vader","value":{"gear":13,"relic":7}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains("unit:vader"));
}

#[tokio::test]
async fn test_set_endpoint_with_ttl() {
    let app = create_test_app();

    let response = app
        .oneshot(json_request(
            "PUT",
            "/set",
            r#"{"key":"ttl_key","value":"ttl_value","ttl_ms":60000}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_set_endpoint_empty_key() {
    let app = create_test_app();

    let response = app
        .oneshot(json_request("PUT", "/set", r#"{"key":"","value":1}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_endpoint_success() {
    let app = create_test_app();

    let set_response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/set",
            r#"{"key":"get_key","value":{"name":"Rey"}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(set_response.status(), StatusCode::OK);

    let get_response = app
        .oneshot(empty_request("GET", "/get/get_key"))
        .await
        .unwrap();

    assert_eq!(get_response.status(), StatusCode::OK);
    let json = body_to_json(get_response.into_body()).await;
    assert_eq!(json["key"], "get_key");
    assert_eq!(json["value"]["name"], "Rey");
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = create_test_app();

    let response = app
        .oneshot(empty_request("GET", "/get/nonexistent_key"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_after_ttl_expiry() {
    let app = create_test_app();

    app.clone()
        .oneshot(json_request(
            "PUT",
            "/set",
            r#"{"key":"short","value":1,"ttl_ms":50}"#,
        ))
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(120)).await;

    let response = app.oneshot(empty_request("GET", "/get/short")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == HAS / DELETE Endpoint Tests ==

#[tokio::test]
async fn test_has_and_delete_endpoints() {
    let app = create_test_app();

    app.clone()
        .oneshot(json_request("PUT", "/set", r#"{"key":"k","value":true}"#))
        .await
        .unwrap();

    let response = app.clone().oneshot(empty_request("GET", "/has/k")).await.unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["present"], true);

    let response = app.clone().oneshot(empty_request("DELETE", "/del/k")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(empty_request("GET", "/has/k")).await.unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["present"], false);

    let response = app.oneshot(empty_request("DELETE", "/del/k")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == KEYS Endpoint Tests ==

#[tokio::test]
async fn test_keys_endpoint_with_pattern() {
    let app = create_test_app();

    app.clone()
        .oneshot(json_request(
            "PUT",
            "/batch/set",
            r#"{"entries":{"unit:vader":1,"unit:rey":2,"ship:falcon":3}}"#,
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/keys?pattern=%5Eunit%3A"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["keys"], serde_json::json!(["unit:rey", "unit:vader"]));

    let response = app.oneshot(empty_request("GET", "/keys")).await.unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["keys"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_keys_endpoint_bad_pattern() {
    let app = create_test_app();

    let response = app
        .oneshot(empty_request("GET", "/keys?pattern=%28unclosed"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// == BATCH Endpoint Tests ==

#[tokio::test]
async fn test_batch_get_omits_missing_keys() {
    let app = create_test_app();

    app.clone()
        .oneshot(json_request(
            "PUT",
            "/batch/set",
            r#"{"entries":{"a":1,"b":2},"ttl_ms":60000}"#,
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            "/batch/get",
            r#"{"keys":["a","b","missing"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let values = json["values"].as_object().unwrap();
    assert_eq!(values.len(), 2);
    assert_eq!(values["a"], 1);
    assert_eq!(values["b"], 2);
}

// == STATS / CLEAR Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint_tracks_hits_and_misses() {
    let app = create_test_app();

    app.clone()
        .oneshot(json_request("PUT", "/set", r#"{"key":"k","value":"v"}"#))
        .await
        .unwrap();
    app.clone().oneshot(empty_request("GET", "/get/k")).await.unwrap();
    app.clone().oneshot(empty_request("GET", "/get/missing")).await.unwrap();

    let response = app.oneshot(empty_request("GET", "/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["size"], 1);
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["total_accesses"], 2);
    assert_eq!(json["hit_rate"], 50.0);
    assert_eq!(json["miss_rate"], 50.0);
    assert_eq!(json["entries"][0]["key"], "k");
    assert_eq!(json["entries"][0]["access_count"], 1);
}

#[tokio::test]
async fn test_clear_endpoint_resets_stats() {
    let app = create_test_app();

    app.clone()
        .oneshot(json_request("PUT", "/set", r#"{"key":"k","value":"v"}"#))
        .await
        .unwrap();
    app.clone().oneshot(empty_request("GET", "/get/k")).await.unwrap();

    let response = app.clone().oneshot(empty_request("DELETE", "/clear")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(empty_request("GET", "/stats")).await.unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["size"], 0);
    assert_eq!(json["hits"], 0);
    assert_eq!(json["total_accesses"], 0);
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}
