//! Route tests for the HTTP demo endpoint

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use toolhub_http::{HttpConfig, HttpConfigBuilder, McpResponse, router};
use tower::ServiceExt;

fn app() -> Router {
    router(&HttpConfig::default())
}

async fn post_mcp(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_endpoint() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, json!({"status": "healthy"}));
}

#[tokio::test]
async fn test_calculate_sum() {
    let body = json!({
        "query": "calculateSum",
        "conversation_id": "c1",
        "request_id": "r1",
        "parameters": {"numbers": [1, 2, 3]}
    });

    let (status, json) = post_mcp(app(), body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    assert_eq!(json["response"], "The sum of the numbers is 6");
    assert!(json.get("error").is_none());
}

#[tokio::test]
async fn test_unrecognized_query_is_echoed() {
    let (status, json) = post_mcp(app(), json!({"query": "unknownThing"}).to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    assert!(json["response"].as_str().unwrap().contains("unknownThing"));
}

#[tokio::test]
async fn test_get_weather_default_location() {
    let (_, json) = post_mcp(app(), json!({"query": "getWeather"}).to_string()).await;
    assert_eq!(
        json["response"],
        "The weather in unknown is currently sunny and 72°F"
    );
}

#[tokio::test]
async fn test_get_current_time() {
    let (status, json) = post_mcp(app(), json!({"query": "getCurrentTime"}).to_string()).await;

    assert_eq!(status, StatusCode::OK);
    let text = json["response"].as_str().unwrap();
    let time = text.strip_prefix("The current time is ").unwrap();
    assert!(chrono::NaiveTime::parse_from_str(time, "%H:%M:%S").is_ok());
}

#[tokio::test]
async fn test_malformed_body_returns_error_envelope() {
    for body in ["{not json", r#"{"request_id": "r1"}"#, ""] {
        let (status, json) = post_mcp(app(), body).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["status"], "error");
        assert_eq!(json["response"], McpResponse::APOLOGY);
        assert!(json["error"].as_str().unwrap().starts_with("Malformed request"));
    }
}

#[tokio::test]
async fn test_body_limit() {
    let config = HttpConfigBuilder::new().max_body_size(16).build().unwrap();
    let body = json!({"query": "calculateSum", "parameters": {"numbers": [1, 2, 3]}}).to_string();

    let request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json")
        .header("content-length", body.len())
        .body(Body::from(body))
        .unwrap();

    let response = router(&config).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_cors_headers() {
    let request = Request::builder()
        .uri("/health")
        .header("origin", "https://example.com")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["access-control-allow-origin"], "*");

    let config = HttpConfigBuilder::new().enable_cors(false).build().unwrap();
    let request = Request::builder()
        .uri("/health")
        .header("origin", "https://example.com")
        .body(Body::empty())
        .unwrap();
    let response = router(&config).oneshot(request).await.unwrap();
    assert!(response.headers().get("access-control-allow-origin").is_none());
}
