use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use server_http::config::Config;
use server_http::{AppState, build_router};
use std::time::Duration;
use tower::util::ServiceExt;

// Upstream base URLs point at a closed port; routes that need the upstream
// must fail with a 500 instead of hanging.
fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        allowed_origins: vec!["*".to_string()],
        spot_base_url: "http://127.0.0.1:9".to_string(),
        futures_base_url: "http://127.0.0.1:9".to_string(),
        request_timeout: Duration::from_secs(1),
        cache_ttl: Duration::from_secs(60),
        cache_cooldown: Duration::from_millis(500),
        sweep_interval: Duration::from_secs(600),
    }
}

async fn request(uri: &str) -> (StatusCode, Value) {
    let config = test_config();
    let state = AppState::new(&config).unwrap();
    let router = build_router(state, &config);

    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health_check() {
    let (status, body) = request("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "OK");
}

#[tokio::test]
async fn test_ping_answers_without_an_upstream() {
    let (status, body) = request("/api/crypto/ping").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "success");
    assert!(body["serverTime"].is_i64());
}

#[tokio::test]
async fn test_futures_time_answers_without_an_upstream() {
    let (status, body) = request("/api/crypto/futures/time").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["serverTime"].is_i64());
}

#[tokio::test]
async fn test_missing_symbol_is_a_bad_request() {
    let (status, body) = request("/api/crypto/ticker/price").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "symbol query parameter is required");
}

#[tokio::test]
async fn test_klines_require_symbol_and_interval() {
    let (status, body) = request("/api/crypto/klines?symbol=BTCUSDT").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "symbol and interval query parameters are required");
}

#[tokio::test]
async fn test_invalid_limit_is_a_bad_request() {
    let (status, body) = request("/api/crypto/depth?symbol=BTCUSDT&limit=abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid limit parameter");
}

#[tokio::test]
async fn test_upstream_failure_surfaces_as_internal_error() {
    let (status, body) = request("/api/crypto/ticker/price?symbol=BTCUSDT").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}
