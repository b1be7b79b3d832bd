use cache_engine::CacheAside;
use chrono::Utc;
use rest_client::{FetchError, RestClient};
use serde_json::{Value, json};
use std::sync::Arc;

/// USD-M futures market data, cached the same way as [`SpotService`] but
/// against the futures REST API and under the `futures_` key namespace.
///
/// [`SpotService`]: crate::spot::SpotService
pub struct FuturesService {
    client: Arc<RestClient>,
    cache: CacheAside,
}

impl FuturesService {
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

    pub fn time(&self) -> Value {
        json!({ "serverTime": Utc::now().timestamp_millis() })
    }

    pub async fn exchange_info(&self) -> Result<Value, FetchError> {
        self.cached(
            "futures_exchangeinfo",
            "global".to_string(),
            "/fapi/v1/exchangeInfo",
            Vec::new(),
        )
        .await
    }

    pub async fn depth(&self, symbol: &str, limit: u32) -> Result<Value, FetchError> {
        self.cached(
            "futures_depth",
            format!("{symbol}-{limit}"),
            "/fapi/v1/depth",
            vec![("symbol", symbol.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    pub async fn agg_trades(&self, symbol: &str, limit: u32) -> Result<Value, FetchError> {
        self.cached(
            "futures_aggtrades",
            format!("{symbol}-{limit}"),
            "/fapi/v1/aggTrades",
            vec![("symbol", symbol.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    pub async fn ticker_price(&self, symbol: &str) -> Result<Value, FetchError> {
        self.cached(
            "futures_tickerprice",
            symbol.to_string(),
            "/fapi/v1/ticker/price",
            vec![("symbol", symbol.to_string())],
        )
        .await
    }

    pub async fn all_ticker_prices(&self) -> Result<Value, FetchError> {
        self.cached(
            "futures_alltickerprices",
            "global".to_string(),
            "/fapi/v1/ticker/price",
            Vec::new(),
        )
        .await
    }

    pub async fn book_ticker(&self, symbol: &str) -> Result<Value, FetchError> {
        self.cached(
            "futures_bookticker",
            symbol.to_string(),
            "/fapi/v1/ticker/bookTicker",
            vec![("symbol", symbol.to_string())],
        )
        .await
    }

    pub async fn klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Value, FetchError> {
        self.cached(
            "futures_klines",
            format!("{symbol}-{interval}-{limit}"),
            "/fapi/v1/klines",
            vec![
                ("symbol", symbol.to_string()),
                ("interval", interval.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    /// Mark price and funding data (premium index) for a symbol.
    pub async fn mark_price(&self, symbol: &str) -> Result<Value, FetchError> {
        self.cached(
            "futures_markprice",
            symbol.to_string(),
            "/fapi/v1/premiumIndex",
            vec![("symbol", symbol.to_string())],
        )
        .await
    }

    /// Liquidation orders, optionally filtered by close type and time range.
    pub async fn all_force_orders(
        &self,
        symbol: &str,
        auto_close_type: Option<&str>,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: u32,
    ) -> Result<Value, FetchError> {
        let mut params = vec![("symbol", symbol.to_string())];
        if let Some(auto_close_type) = auto_close_type {
            params.push(("autoCloseType", auto_close_type.to_string()));
        }
        if let Some(start_time) = start_time {
            params.push(("startTime", start_time.to_string()));
        }
        if let Some(end_time) = end_time {
            params.push(("endTime", end_time.to_string()));
        }
        params.push(("limit", limit.to_string()));
        self.cached(
            "futures_allforceorders",
            force_orders_suffix(symbol, auto_close_type, start_time, end_time, limit),
            "/fapi/v1/allForceOrders",
            params,
        )
        .await
    }

    pub async fn ticker_24hr(&self, symbol: &str) -> Result<Value, FetchError> {
        self.cached(
            "futures_ticker24hr",
            symbol.to_string(),
            "/fapi/v1/ticker/24hr",
            vec![("symbol", symbol.to_string())],
        )
        .await
    }

    pub async fn all_ticker_24hr(&self) -> Result<Value, FetchError> {
        self.cached(
            "futures_allticker24hr",
            "global".to_string(),
            "/fapi/v1/ticker/24hr",
            Vec::new(),
        )
        .await
    }

    pub async fn funding_rate(
        &self,
        symbol: &str,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: u32,
    ) -> Result<Value, FetchError> {
        let mut params = vec![("symbol", symbol.to_string())];
        if let Some(start_time) = start_time {
            params.push(("startTime", start_time.to_string()));
        }
        if let Some(end_time) = end_time {
            params.push(("endTime", end_time.to_string()));
        }
        params.push(("limit", limit.to_string()));
        self.cached(
            "futures_fundingrate",
            funding_rate_suffix(symbol, start_time, end_time, limit),
            "/fapi/v1/fundingRate",
            params,
        )
        .await
    }

    pub async fn recent_trades(
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
            "futures_recenttrades",
            recent_trades_suffix(symbol, limit, from_id),
            "/fapi/v1/trades",
            params,
        )
        .await
    }
}

fn force_orders_suffix(
    symbol: &str,
    auto_close_type: Option<&str>,
    start_time: Option<i64>,
    end_time: Option<i64>,
    limit: u32,
) -> String {
    let mut suffix = format!("{symbol}-{limit}");
    if let Some(auto_close_type) = auto_close_type {
        suffix.push('-');
        suffix.push_str(auto_close_type);
    }
    if let Some(start_time) = start_time {
        suffix.push_str(&format!("-s{start_time}"));
    }
    if let Some(end_time) = end_time {
        suffix.push_str(&format!("-e{end_time}"));
    }
    suffix
}

fn funding_rate_suffix(
    symbol: &str,
    start_time: Option<i64>,
    end_time: Option<i64>,
    limit: u32,
) -> String {
    let mut suffix = format!("{symbol}-{limit}");
    if let Some(start_time) = start_time {
        suffix.push_str(&format!("-s{start_time}"));
    }
    if let Some(end_time) = end_time {
        suffix.push_str(&format!("-e{end_time}"));
    }
    suffix
}

fn recent_trades_suffix(symbol: &str, limit: u32, from_id: Option<i64>) -> String {
    let mut suffix = format!("{symbol}-{limit}");
    if let Some(from_id) = from_id {
        suffix.push_str(&format!("-{from_id}"));
    }
    suffix
}
