use crate::config::Config;
use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::http::HeaderValue;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::trace::TraceLayer;

/// Build and configure the application router
pub fn build_router(state: AppState, config: &Config) -> Router {
    let api = Router::new()
        // Spot endpoints
        .route("/ping", get(handlers::spot::ping))
        .route("/time", get(handlers::spot::server_time))
        .route("/exchangeInfo", get(handlers::spot::exchange_info))
        .route("/ticker/price", get(handlers::spot::ticker_price))
        .route("/ticker/allPrices", get(handlers::spot::all_ticker_prices))
        .route("/bookTicker", get(handlers::spot::book_ticker))
        .route("/bookTicker/all", get(handlers::spot::all_book_tickers))
        .route("/depth", get(handlers::spot::depth))
        .route("/trades", get(handlers::spot::recent_trades))
        .route("/klines", get(handlers::spot::klines))
        .route("/historicalTrades", get(handlers::spot::historical_trades))
        .route("/aggregateTrades", get(handlers::spot::aggregate_trades))
        .route("/avgPrice", get(handlers::spot::avg_price))
        .route("/ticker/24hr", get(handlers::spot::ticker_24hr))
        // Futures endpoints
        .route("/futures/ping", get(handlers::futures::ping))
        .route("/futures/time", get(handlers::futures::time))
        .route("/futures/exchangeInfo", get(handlers::futures::exchange_info))
        .route("/futures/depth", get(handlers::futures::depth))
        .route("/futures/aggTrades", get(handlers::futures::agg_trades))
        .route("/futures/ticker/price", get(handlers::futures::ticker_price))
        .route(
            "/futures/ticker/allPrices",
            get(handlers::futures::all_ticker_prices),
        )
        .route("/futures/bookTicker", get(handlers::futures::book_ticker))
        .route("/futures/klines", get(handlers::futures::klines))
        .route("/futures/markPrice", get(handlers::futures::mark_price))
        .route(
            "/futures/allForceOrders",
            get(handlers::futures::all_force_orders),
        )
        .route("/futures/24hrTicker", get(handlers::futures::ticker_24hr))
        .route(
            "/futures/all24hrTickers",
            get(handlers::futures::all_ticker_24hr),
        )
        .route("/futures/fundingRate", get(handlers::futures::funding_rate))
        .route("/futures/recentTrades", get(handlers::futures::recent_trades));

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .nest("/api/crypto", api)
        // Middleware
        .layer(NormalizePathLayer::trim_trailing_slash())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allowed_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
