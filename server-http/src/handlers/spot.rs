use crate::models::{ApiError, MarketQuery};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Query, State};
use serde_json::Value;

/// GET /api/crypto/ping
pub async fn ping(State(state): State<AppState>) -> Json<Value> {
    Json(state.spot.ping())
}

/// GET /api/crypto/time
pub async fn server_time(State(state): State<AppState>) -> Json<Value> {
    Json(state.spot.server_time())
}

/// GET /api/crypto/exchangeInfo
pub async fn exchange_info(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.spot.exchange_info().await?))
}

/// GET /api/crypto/ticker/price
pub async fn ticker_price(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<Value>, ApiError> {
    let symbol = query.symbol()?;
    Ok(Json(state.spot.ticker_price(symbol).await?))
}

/// GET /api/crypto/ticker/allPrices
pub async fn all_ticker_prices(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.spot.all_ticker_prices().await?))
}

/// GET /api/crypto/bookTicker
pub async fn book_ticker(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<Value>, ApiError> {
    let symbol = query.symbol()?;
    Ok(Json(state.spot.book_ticker(symbol).await?))
}

/// GET /api/crypto/depth
pub async fn depth(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<Value>, ApiError> {
    let symbol = query.symbol()?;
    let limit = query.limit_or(10)?;
    Ok(Json(state.spot.depth(symbol, limit).await?))
}

/// GET /api/crypto/trades
pub async fn recent_trades(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<Value>, ApiError> {
    let symbol = query.symbol()?;
    let limit = query.limit_or(10)?;
    Ok(Json(state.spot.recent_trades(symbol, limit).await?))
}

/// GET /api/crypto/klines
pub async fn klines(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<Value>, ApiError> {
    let (symbol, interval) = query.symbol_and_interval()?;
    let limit = query.limit_or(10)?;
    Ok(Json(state.spot.klines(symbol, interval, limit).await?))
}

/// GET /api/crypto/historicalTrades
pub async fn historical_trades(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<Value>, ApiError> {
    let symbol = query.symbol()?;
    let limit = query.limit_or(500)?;
    let from_id = query.from_id()?;
    Ok(Json(state.spot.historical_trades(symbol, limit, from_id).await?))
}

/// GET /api/crypto/aggregateTrades
pub async fn aggregate_trades(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<Value>, ApiError> {
    let symbol = query.symbol()?;
    let from_id = query.from_id()?;
    let start_time = query.start_time()?;
    let end_time = query.end_time()?;
    let limit = query.limit_or(500)?;
    Ok(Json(
        state
            .spot
            .aggregate_trades(symbol, from_id, start_time, end_time, limit)
            .await?,
    ))
}

/// GET /api/crypto/avgPrice
pub async fn avg_price(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<Value>, ApiError> {
    let symbol = query.symbol()?;
    Ok(Json(state.spot.avg_price(symbol).await?))
}

/// GET /api/crypto/ticker/24hr
pub async fn ticker_24hr(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<Value>, ApiError> {
    let symbol = query.symbol()?;
    Ok(Json(state.spot.ticker_24hr(symbol).await?))
}

/// GET /api/crypto/bookTicker/all
pub async fn all_book_tickers(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.spot.all_book_tickers().await?))
}
