use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Failure of a single upstream request, with enough context for logging.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("error parsing url {url}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("error fetching data from {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("received non-OK status {status} from {url}")]
    Status { url: String, status: StatusCode },
    #[error("error decoding response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Thin JSON-over-HTTP client bound to one upstream base URL.
///
/// Every request is a GET decoded into a generic [`Value`] tree; non-2xx
/// responses and undecodable bodies are both errors. The timeout given at
/// construction bounds each request, so a hung upstream cannot pin a
/// background refresh forever.
pub struct RestClient {
    http: Client,
    base_url: String,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `base_url + path` with the given query pairs, decoded as JSON.
    pub async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value, FetchError> {
        let url = self.request_url(path, params)?;

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.json().await.map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }

    fn request_url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, FetchError> {
        let raw = format!("{}{}", self.base_url, path);
        let parsed = if params.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, params.iter().map(|(name, value)| (*name, value.as_str())))
        };
        parsed.map_err(|source| FetchError::Url { url: raw, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base_url: String) -> RestClient {
        RestClient::new(base_url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_get_json_decodes_the_response() {
        let router = Router::new().route(
            "/api/v3/ping",
            get(|| async { Json(json!({"serverTime": 1700000000000i64})) }),
        );
        let client = client(serve(router).await);

        let value = client.get_json("/api/v3/ping", &[]).await.unwrap();

        assert_eq!(value, json!({"serverTime": 1700000000000i64}));
    }

    #[tokio::test]
    async fn test_query_parameters_are_forwarded() {
        let router = Router::new().route(
            "/api/v3/depth",
            get(|Query(params): Query<HashMap<String, String>>| async move { Json(params) }),
        );
        let client = client(serve(router).await);

        let params = [("symbol", "BTCUSDT".to_string()), ("limit", "10".to_string())];
        let value = client.get_json("/api/v3/depth", &params).await.unwrap();

        assert_eq!(value, json!({"symbol": "BTCUSDT", "limit": "10"}));
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let router = Router::new().route(
            "/api/v3/depth",
            get(|| async { StatusCode::TOO_MANY_REQUESTS }),
        );
        let client = client(serve(router).await);

        let err = client.get_json("/api/v3/depth", &[]).await.unwrap_err();

        match err {
            FetchError::Status { status, url } => {
                assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
                assert!(url.ends_with("/api/v3/depth"));
            }
            other => panic!("expected status error, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_undecodable_body_is_an_error() {
        let router = Router::new().route("/api/v3/time", get(|| async { "not json" }));
        let client = client(serve(router).await);

        let err = client.get_json("/api/v3/time", &[]).await.unwrap_err();

        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_unparsable_base_url_is_an_error() {
        let client = client("not a base url".to_string());

        let err = client.get_json("/api/v3/ping", &[]).await.unwrap_err();

        assert!(matches!(err, FetchError::Url { .. }));
    }
}
