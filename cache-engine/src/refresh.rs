use crate::store::TtlStore;
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::fmt::Display;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const RESERVATION_SHARDS: usize = 16;

/// Stale-while-revalidate front for a [`TtlStore`] of JSON payloads.
///
/// A cache hit is returned immediately; a background refresh is scheduled
/// unless one already ran within the cooldown window. A cache miss fetches
/// synchronously and primes the cache for everyone else.
///
/// Handles are cheap to clone and share the same store and reservation
/// locks.
#[derive(Clone)]
pub struct CacheAside {
    inner: Arc<Inner>,
}

struct Inner {
    store: TtlStore<Value>,
    ttl: Duration,
    cooldown: Duration,
    // Sharded by key hash so refresh reservations for distinct keys do not
    // serialize each other.
    reservations: [Mutex<()>; RESERVATION_SHARDS],
}

impl CacheAside {
    pub fn new(store: TtlStore<Value>, ttl: Duration, cooldown: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                ttl,
                cooldown,
                reservations: std::array::from_fn(|_| Mutex::new(())),
            }),
        }
    }

    /// The underlying store. Entries live under `"{namespace}:{suffix}"`;
    /// cooldown markers under `"{namespace}:{suffix}:delay"`.
    pub fn store(&self) -> &TtlStore<Value> {
        &self.inner.store
    }

    /// Serve `namespace:key_suffix` from cache, falling back to `fetch`.
    ///
    /// On a hit the cached value is returned at once and a refresh attempt
    /// is spawned detached; the caller never waits on it and never sees its
    /// errors. On a miss `fetch` runs synchronously and its error, if any,
    /// is returned verbatim with nothing cached. `fetch` must be
    /// re-invocable: it is called once per refresh attempt.
    pub async fn get_with_cache<F, Fut, E>(
        &self,
        namespace: &str,
        key_suffix: &str,
        fetch: F,
    ) -> Result<Value, E>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let key = format!("{namespace}:{key_suffix}");
        let delay_key = format!("{key}:delay");

        if let Some(cached) = self.inner.store.get(&key) {
            let engine = self.clone();
            tokio::spawn(async move { engine.try_refresh(key, delay_key, fetch).await });
            return Ok(cached);
        }

        // Cold miss: this caller pays the fetch latency and primes the
        // cache. The cooldown marker keeps the first wave of hits from
        // immediately refreshing data that is seconds old.
        let value = fetch().await?;
        self.inner.store.set(key, value.clone(), self.inner.ttl);
        self.inner
            .store
            .set(delay_key, Value::Bool(true), self.inner.cooldown);
        Ok(value)
    }

    /// Refresh `key` unless another refresh is in flight or cooling down.
    ///
    /// The marker check-and-set is atomic under the key's reservation lock;
    /// the fetch itself runs outside the lock, so refreshes of distinct
    /// keys proceed in parallel.
    async fn try_refresh<F, Fut, E>(&self, key: String, delay_key: String, fetch: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        {
            let _guard = self.reservation(&key).lock().unwrap();
            if self.inner.store.contains(&delay_key) {
                return;
            }
            self.inner
                .store
                .set(delay_key.clone(), Value::Bool(true), self.inner.cooldown);
        }

        match fetch().await {
            Ok(value) => self.inner.store.set(key, value, self.inner.ttl),
            Err(err) => {
                warn!(key = %key, error = %err, "cache refresh failed, serving stale until expiry");
                // Dropping the marker lets the next hit retry ahead of the
                // full cooldown. The stale entry stays in place.
                self.inner.store.remove(&delay_key);
            }
        }
    }

    fn reservation(&self, key: &str) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        &self.inner.reservations[hasher.finish() as usize % RESERVATION_SHARDS]
    }
}
