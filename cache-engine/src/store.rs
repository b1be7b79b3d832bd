use dashmap::DashMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tracing::debug;

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Concurrent key/value store with per-entry expiration.
///
/// An entry is present iff `now < expires_at`. Expiry is enforced lazily on
/// read; a periodic sweep additionally drops expired entries that nobody
/// reads, so memory stays bounded by the live working set.
///
/// Handles are cheap to clone and share one underlying map. Must be created
/// inside a Tokio runtime (the sweep runs as a background task, and stops
/// once the last handle is dropped).
pub struct TtlStore<V> {
    entries: Arc<DashMap<String, CacheEntry<V>>>,
}

impl<V> Clone for TtlStore<V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<V> TtlStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(sweep_interval: Duration) -> Self {
        let entries = Arc::new(DashMap::new());
        spawn_sweeper(Arc::downgrade(&entries), sweep_interval);
        Self { entries }
    }

    /// Store `value` under `key`, expiring `ttl` from now. Unconditionally
    /// overwrites any previous entry.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Look up `key`, treating an expired entry as absent. An expired entry
    /// is removed as a side effect of the read.
    pub fn get(&self, key: &str) -> Option<V> {
        {
            let entry = self.entries.get(key)?;
            if Instant::now() < entry.expires_at {
                return Some(entry.value.clone());
            }
        }
        self.remove_expired(key);
        None
    }

    /// When the entry for `key` is live, returns its expiration instant.
    /// Same presence semantics as [`TtlStore::get`].
    pub fn expire_time(&self, key: &str) -> Option<Instant> {
        {
            let entry = self.entries.get(key)?;
            if Instant::now() < entry.expires_at {
                return Some(entry.expires_at);
            }
        }
        self.remove_expired(key);
        None
    }

    /// Remove `key` unconditionally. No-op when absent.
    pub fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    // Re-checks expiry under the shard lock so a concurrent fresh `set`
    // cannot be clobbered by a reader that saw the old, expired entry.
    fn remove_expired(&self, key: &str) {
        let now = Instant::now();
        self.entries
            .remove_if(key, |_, entry| now >= entry.expires_at);
    }
}

fn spawn_sweeper<V>(entries: Weak<DashMap<String, CacheEntry<V>>>, interval: Duration)
where
    V: Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately; skip it.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(entries) = entries.upgrade() else {
                break;
            };
            let now = Instant::now();
            let mut removed = 0usize;
            entries.retain(|_, entry| {
                let live = now < entry.expires_at;
                if !live {
                    removed += 1;
                }
                live
            });
            debug!(
                removed,
                remaining = entries.len(),
                "swept expired cache entries"
            );
        }
    });
}
