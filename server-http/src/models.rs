use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rest_client::FetchError;
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Client-visible failure of a market-data request.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(&'static str),
    Upstream(FetchError),
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        Self::Upstream(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.to_string()),
            ApiError::Upstream(err) => {
                error!(error = %err, "upstream request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Query-string bag shared by every market-data route. Handlers pull out
/// what they need; an empty string counts as absent.
#[derive(Debug, Default, Deserialize)]
pub struct MarketQuery {
    pub symbol: Option<String>,
    pub interval: Option<String>,
    pub limit: Option<String>,
    #[serde(rename = "fromId")]
    pub from_id: Option<String>,
    #[serde(rename = "startTime")]
    pub start_time: Option<String>,
    #[serde(rename = "endTime")]
    pub end_time: Option<String>,
    #[serde(rename = "autoCloseType")]
    pub auto_close_type: Option<String>,
}

impl MarketQuery {
    pub fn symbol(&self) -> Result<&str, ApiError> {
        self.symbol
            .as_deref()
            .filter(|symbol| !symbol.is_empty())
            .ok_or(ApiError::BadRequest("symbol query parameter is required"))
    }

    pub fn symbol_and_interval(&self) -> Result<(&str, &str), ApiError> {
        let interval = self.interval.as_deref().filter(|interval| !interval.is_empty());
        match (self.symbol.as_deref().filter(|s| !s.is_empty()), interval) {
            (Some(symbol), Some(interval)) => Ok((symbol, interval)),
            _ => Err(ApiError::BadRequest(
                "symbol and interval query parameters are required",
            )),
        }
    }

    pub fn limit_or(&self, default: u32) -> Result<u32, ApiError> {
        match self.limit.as_deref() {
            None | Some("") => Ok(default),
            Some(raw) => raw
                .parse()
                .map_err(|_| ApiError::BadRequest("invalid limit parameter")),
        }
    }

    pub fn from_id(&self) -> Result<Option<i64>, ApiError> {
        parse_optional_i64(self.from_id.as_deref(), "invalid fromId parameter")
    }

    pub fn start_time(&self) -> Result<Option<i64>, ApiError> {
        parse_optional_i64(self.start_time.as_deref(), "invalid startTime parameter")
    }

    pub fn end_time(&self) -> Result<Option<i64>, ApiError> {
        parse_optional_i64(self.end_time.as_deref(), "invalid endTime parameter")
    }

    pub fn auto_close_type(&self) -> Option<&str> {
        self.auto_close_type
            .as_deref()
            .filter(|close_type| !close_type.is_empty())
    }
}

fn parse_optional_i64(
    raw: Option<&str>,
    message: &'static str,
) -> Result<Option<i64>, ApiError> {
    match raw {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| ApiError::BadRequest(message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_is_required_and_non_empty() {
        let query = MarketQuery::default();
        assert!(matches!(
            query.symbol(),
            Err(ApiError::BadRequest("symbol query parameter is required"))
        ));

        let query = MarketQuery {
            symbol: Some(String::new()),
            ..Default::default()
        };
        assert!(query.symbol().is_err());

        let query = MarketQuery {
            symbol: Some("BTCUSDT".to_string()),
            ..Default::default()
        };
        assert_eq!(query.symbol().unwrap(), "BTCUSDT");
    }

    #[test]
    fn test_limit_falls_back_to_the_route_default() {
        let query = MarketQuery::default();
        assert_eq!(query.limit_or(10).unwrap(), 10);

        let query = MarketQuery {
            limit: Some("250".to_string()),
            ..Default::default()
        };
        assert_eq!(query.limit_or(10).unwrap(), 250);
    }

    #[test]
    fn test_unparsable_limit_is_a_bad_request() {
        let query = MarketQuery {
            limit: Some("ten".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            query.limit_or(10),
            Err(ApiError::BadRequest("invalid limit parameter"))
        ));
    }

    #[test]
    fn test_optional_ids_parse_or_reject() {
        let query = MarketQuery {
            from_id: Some("12345".to_string()),
            ..Default::default()
        };
        assert_eq!(query.from_id().unwrap(), Some(12345));

        let query = MarketQuery {
            from_id: Some("abc".to_string()),
            ..Default::default()
        };
        assert!(query.from_id().is_err());

        let query = MarketQuery::default();
        assert_eq!(query.from_id().unwrap(), None);
    }

    #[test]
    fn test_klines_require_both_symbol_and_interval() {
        let query = MarketQuery {
            symbol: Some("BTCUSDT".to_string()),
            ..Default::default()
        };
        assert!(query.symbol_and_interval().is_err());

        let query = MarketQuery {
            symbol: Some("BTCUSDT".to_string()),
            interval: Some("1m".to_string()),
            ..Default::default()
        };
        assert_eq!(query.symbol_and_interval().unwrap(), ("BTCUSDT", "1m"));
    }
}
