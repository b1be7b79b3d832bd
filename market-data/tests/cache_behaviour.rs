use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router};
use cache_engine::{CacheAside, TtlStore};
use market_data::SpotService;
use rest_client::RestClient;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

// Stub upstream that counts how many requests actually reach it.
async fn serve_upstream(hits: Arc<AtomicUsize>) -> String {
    let router = Router::new().route(
        "/api/v3/ticker/price",
        get({
            move |Query(params): Query<HashMap<String, String>>| {
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json(json!({
                        "symbol": params.get("symbol"),
                        "price": "100.00",
                    }))
                }
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn service(base_url: String) -> SpotService {
    let client = Arc::new(RestClient::new(base_url, Duration::from_secs(5)).unwrap());
    let cache = CacheAside::new(
        TtlStore::new(Duration::from_secs(600)),
        Duration::from_secs(60),
        Duration::from_millis(500),
    );
    SpotService::new(client, cache)
}

#[tokio::test]
async fn test_repeated_reads_hit_upstream_once() {
    let hits = Arc::new(AtomicUsize::new(0));
    let service = service(serve_upstream(Arc::clone(&hits)).await);

    let first = service.ticker_price("BTCUSDT").await.unwrap();
    let second = service.ticker_price("BTCUSDT").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first["price"], "100.00");

    // The second call was a hit; its scheduled refresh is suppressed by the
    // cooldown marker left behind by the cold fetch.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_distinct_symbols_are_cached_separately() {
    let hits = Arc::new(AtomicUsize::new(0));
    let service = service(serve_upstream(Arc::clone(&hits)).await);

    let btc = service.ticker_price("BTCUSDT").await.unwrap();
    let eth = service.ticker_price("ETHUSDT").await.unwrap();

    assert_eq!(btc["symbol"], "BTCUSDT");
    assert_eq!(eth["symbol"], "ETHUSDT");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_cold_fetch_failure_surfaces_to_the_caller() {
    // Nothing is listening on this port, so the cold path must fail and
    // cache nothing.
    let service = service("http://127.0.0.1:9".to_string());

    assert!(service.ticker_price("BTCUSDT").await.is_err());
    assert!(service.ticker_price("BTCUSDT").await.is_err());
}
