use crate::models::{ApiError, MarketQuery};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Query, State};
use serde_json::Value;

/// GET /api/crypto/futures/ping
pub async fn ping(State(state): State<AppState>) -> Json<Value> {
    Json(state.futures.ping())
}

/// GET /api/crypto/futures/time
pub async fn time(State(state): State<AppState>) -> Json<Value> {
    Json(state.futures.time())
}

/// GET /api/crypto/futures/exchangeInfo
pub async fn exchange_info(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.futures.exchange_info().await?))
}

/// GET /api/crypto/futures/depth
pub async fn depth(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<Value>, ApiError> {
    let symbol = query.symbol()?;
    let limit = query.limit_or(10)?;
    Ok(Json(state.futures.depth(symbol, limit).await?))
}

/// GET /api/crypto/futures/aggTrades
pub async fn agg_trades(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<Value>, ApiError> {
    let symbol = query.symbol()?;
    let limit = query.limit_or(500)?;
    Ok(Json(state.futures.agg_trades(symbol, limit).await?))
}

/// GET /api/crypto/futures/ticker/price
pub async fn ticker_price(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<Value>, ApiError> {
    let symbol = query.symbol()?;
    Ok(Json(state.futures.ticker_price(symbol).await?))
}

/// GET /api/crypto/futures/ticker/allPrices
pub async fn all_ticker_prices(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.futures.all_ticker_prices().await?))
}

/// GET /api/crypto/futures/bookTicker
pub async fn book_ticker(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<Value>, ApiError> {
    let symbol = query.symbol()?;
    Ok(Json(state.futures.book_ticker(symbol).await?))
}

/// GET /api/crypto/futures/klines
pub async fn klines(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<Value>, ApiError> {
    let (symbol, interval) = query.symbol_and_interval()?;
    let limit = query.limit_or(500)?;
    Ok(Json(state.futures.klines(symbol, interval, limit).await?))
}

/// GET /api/crypto/futures/markPrice
pub async fn mark_price(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<Value>, ApiError> {
    let symbol = query.symbol()?;
    Ok(Json(state.futures.mark_price(symbol).await?))
}

/// GET /api/crypto/futures/allForceOrders
pub async fn all_force_orders(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<Value>, ApiError> {
    let symbol = query.symbol()?;
    let auto_close_type = query.auto_close_type();
    let start_time = query.start_time()?;
    let end_time = query.end_time()?;
    let limit = query.limit_or(500)?;
    Ok(Json(
        state
            .futures
            .all_force_orders(symbol, auto_close_type, start_time, end_time, limit)
            .await?,
    ))
}

/// GET /api/crypto/futures/24hrTicker
pub async fn ticker_24hr(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<Value>, ApiError> {
    let symbol = query.symbol()?;
    Ok(Json(state.futures.ticker_24hr(symbol).await?))
}

/// GET /api/crypto/futures/all24hrTickers
pub async fn all_ticker_24hr(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.futures.all_ticker_24hr().await?))
}

/// GET /api/crypto/futures/fundingRate
pub async fn funding_rate(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<Value>, ApiError> {
    let symbol = query.symbol()?;
    let start_time = query.start_time()?;
    let end_time = query.end_time()?;
    let limit = query.limit_or(100)?;
    Ok(Json(
        state
            .futures
            .funding_rate(symbol, start_time, end_time, limit)
            .await?,
    ))
}

/// GET /api/crypto/futures/recentTrades
pub async fn recent_trades(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<Value>, ApiError> {
    let symbol = query.symbol()?;
    let limit = query.limit_or(500)?;
    let from_id = query.from_id()?;
    Ok(Json(state.futures.recent_trades(symbol, limit, from_id).await?))
}
