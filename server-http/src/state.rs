use crate::config::Config;
use cache_engine::{CacheAside, TtlStore};
use market_data::{FuturesService, SpotService};
use rest_client::RestClient;
use std::sync::Arc;

/// Server state shared across handlers.
///
/// Both services share one TTL store; their `spot_`/`futures_` key
/// namespaces keep the entries apart.
#[derive(Clone)]
pub struct AppState {
    pub spot: Arc<SpotService>,
    pub futures: Arc<FuturesService>,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let store = TtlStore::new(config.sweep_interval);
        let cache = CacheAside::new(store, config.cache_ttl, config.cache_cooldown);

        let spot_client = Arc::new(RestClient::new(
            config.spot_base_url.clone(),
            config.request_timeout,
        )?);
        let futures_client = Arc::new(RestClient::new(
            config.futures_base_url.clone(),
            config.request_timeout,
        )?);

        Ok(Self {
            spot: Arc::new(SpotService::new(spot_client, cache.clone())),
            futures: Arc::new(FuturesService::new(futures_client, cache)),
        })
    }
}
