use std::time::Duration;
use tracing::warn;

/// Runtime configuration, read once at startup from the environment.
pub struct Config {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub spot_base_url: String,
    pub futures_base_url: String,
    /// Upper bound on every upstream request, cold fetches and background
    /// refreshes alike.
    pub request_timeout: Duration,
    /// Freshness window for a successful cache entry.
    pub cache_ttl: Duration,
    /// Minimum spacing between refresh attempts for one key.
    pub cache_cooldown: Duration,
    /// How often the store sweeps expired entries nobody read.
    pub sweep_interval: Duration,
}

impl Config {
    const DEFAULT_SPOT_BASE_URL: &str = "https://api.binance.com";
    const DEFAULT_FUTURES_BASE_URL: &str = "https://fapi.binance.com";

    pub fn from_env() -> Self {
        Self {
            host: std::env::var("CRYPTO_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_u64("CRYPTO_HTTP_PORT", 8080) as u16,
            allowed_origins: std::env::var("CRYPTO_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|origin| origin.trim().to_string())
                .collect(),
            spot_base_url: std::env::var("CRYPTO_SPOT_BASE_URL")
                .unwrap_or_else(|_| Self::DEFAULT_SPOT_BASE_URL.to_string()),
            futures_base_url: std::env::var("CRYPTO_FUTURES_BASE_URL")
                .unwrap_or_else(|_| Self::DEFAULT_FUTURES_BASE_URL.to_string()),
            request_timeout: Duration::from_secs(env_u64("CRYPTO_REQUEST_TIMEOUT_SECS", 10)),
            cache_ttl: Duration::from_secs(env_u64("CRYPTO_CACHE_TTL_SECS", 60)),
            cache_cooldown: Duration::from_millis(env_u64("CRYPTO_CACHE_COOLDOWN_MS", 500)),
            sweep_interval: Duration::from_secs(env_u64("CRYPTO_SWEEP_INTERVAL_SECS", 600)),
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    match std::env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} is not a valid integer, falling back to {}", name, default);
            default
        }),
        Err(_) => default,
    }
}
