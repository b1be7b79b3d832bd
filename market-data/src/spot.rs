use cache_engine::CacheAside;
use chrono::Utc;
use rest_client::{FetchError, RestClient};
use serde_json::{Value, json};
use std::sync::Arc;

/// Spot market data, served from cache in front of the exchange REST API.
///
/// Every operation maps to one upstream resource; the cache key namespace
/// carries the `spot_` prefix so spot and futures entries never collide in
/// the shared store.
pub struct SpotService {
    client: Arc<RestClient>,
    cache: CacheAside,
}

impl SpotService {
    pub fn new(client: Arc<RestClient>, cache: CacheAside) -> Self {
        Self { client, cache }
    }

    async fn cached(
        &self,
        namespace: &'static str,
        key_suffix: String,
        path: &'static str,
        params: Vec<(&'static str, String)>,
    ) -> Result<Value, FetchError> {
        let client = Arc::clone(&self.client);
        self.cache
            .get_with_cache(namespace, &key_suffix, move || {
                let client = Arc::clone(&client);
                let params = params.clone();
                async move { client.get_json(path, &params).await }
            })
            .await
    }

    /// Connectivity probe, answered locally.
    pub fn ping(&self) -> Value {
        json!({
            "serverTime": Utc::now().timestamp_millis(),
            "message": "success",
        })
    }

    pub fn server_time(&self) -> Value {
        json!({ "serverTime": Utc::now().timestamp_millis() })
    }

    /// Current exchange trading rules and symbol information.
    pub async fn exchange_info(&self) -> Result<Value, FetchError> {
        self.cached(
            "spot_exchangeinfo",
            "global".to_string(),
            "/api/v3/exchangeInfo",
            Vec::new(),
        )
        .await
    }

    /// Latest price for one symbol.
    pub async fn ticker_price(&self, symbol: &str) -> Result<Value, FetchError> {
        self.cached(
            "spot_tickerprice",
            symbol.to_string(),
            "/api/v3/ticker/price",
            vec![("symbol", symbol.to_string())],
        )
        .await
    }

    /// Latest price for every symbol.
    pub async fn all_ticker_prices(&self) -> Result<Value, FetchError> {
        self.cached(
            "spot_alltickerprices",
            "global".to_string(),
            "/api/v3/ticker/price",
            Vec::new(),
        )
        .await
    }

    /// Best bid/ask on the order book for one symbol.
    pub async fn book_ticker(&self, symbol: &str) -> Result<Value, FetchError> {
        self.cached(
            "spot_bookticker",
            symbol.to_string(),
            "/api/v3/ticker/bookTicker",
            vec![("symbol", symbol.to_string())],
        )
        .await
    }

    /// Order book for a symbol, truncated to `limit` levels.
    pub async fn depth(&self, symbol: &str, limit: u32) -> Result<Value, FetchError> {
        self.cached(
            "spot_depth",
            format!("{symbol}-{limit}"),
            "/api/v3/depth",
            vec![("symbol", symbol.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    pub async fn recent_trades(&self, symbol: &str, limit: u32) -> Result<Value, FetchError> {
        self.cached(
            "spot_recenttrades",
            format!("{symbol}-{limit}"),
            "/api/v3/trades",
            vec![("symbol", symbol.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    /// Candlestick data for a symbol.
    pub async fn klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Value, FetchError> {
        self.cached(
            "spot_klines",
            format!("{symbol}-{interval}-{limit}"),
            "/api/v3/klines",
            vec![
                ("symbol", symbol.to_string()),
                ("interval", interval.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    pub async fn historical_trades(
        &self,
        symbol: &str,
        limit: u32,
        from_id: Option<i64>,
    ) -> Result<Value, FetchError> {
        let mut params = vec![("symbol", symbol.to_string()), ("limit", limit.to_string())];
        if let Some(from_id) = from_id {
            params.push(("fromId", from_id.to_string()));
        }
        self.cached(
            "spot_historicaltrades",
            historical_trades_suffix(symbol, limit, from_id),
            "/api/v3/historicalTrades",
            params,
        )
        .await
    }

    /// Compressed, aggregate trades, optionally bounded by id or time range.
    pub async fn aggregate_trades(
        &self,
        symbol: &str,
        from_id: Option<i64>,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: u32,
    ) -> Result<Value, FetchError> {
        let mut params = vec![("symbol", symbol.to_string())];
        if let Some(from_id) = from_id {
            params.push(("fromId", from_id.to_string()));
        }
        if let Some(start_time) = start_time {
            params.push(("startTime", start_time.to_string()));
        }
        if let Some(end_time) = end_time {
            params.push(("endTime", end_time.to_string()));
        }
        params.push(("limit", limit.to_string()));
        self.cached(
            "spot_aggregatetrades",
            aggregate_trades_suffix(symbol, from_id, start_time, end_time, limit),
            "/api/v3/aggTrades",
            params,
        )
        .await
    }

    /// Current average price for a symbol.
    pub async fn avg_price(&self, symbol: &str) -> Result<Value, FetchError> {
        self.cached(
            "spot_avgprice",
            symbol.to_string(),
            "/api/v3/avgPrice",
            vec![("symbol", symbol.to_string())],
        )
        .await
    }

    /// 24hr rolling-window price change statistics for a symbol.
    pub async fn ticker_24hr(&self, symbol: &str) -> Result<Value, FetchError> {
        self.cached(
            "spot_ticker24hr",
            symbol.to_string(),
            "/api/v3/ticker/24hr",
            vec![("symbol", symbol.to_string())],
        )
        .await
    }

    pub async fn all_book_tickers(&self) -> Result<Value, FetchError> {
        self.cached(
            "spot_allbooktickers",
            "global".to_string(),
            "/api/v3/ticker/bookTicker",
            Vec::new(),
        )
        .await
    }
}

// Key suffixes fold every present optional in a fixed order, so two
// logically-identical parameter sets always land on the same cache entry.

fn historical_trades_suffix(symbol: &str, limit: u32, from_id: Option<i64>) -> String {
    let mut suffix = format!("{symbol}-{limit}");
    if let Some(from_id) = from_id {
        suffix.push_str(&format!("-{from_id}"));
    }
    suffix
}

fn aggregate_trades_suffix(
    symbol: &str,
    from_id: Option<i64>,
    start_time: Option<i64>,
    end_time: Option<i64>,
    limit: u32,
) -> String {
    let mut suffix = format!("{symbol}-{limit}");
    if let Some(from_id) = from_id {
        suffix.push_str(&format!("-f{from_id}"));
    }
    if let Some(start_time) = start_time {
        suffix.push_str(&format!("-s{start_time}"));
    }
    if let Some(end_time) = end_time {
        suffix.push_str(&format!("-e{end_time}"));
    }
    suffix
}
