//! Cache-aside layer over a [`CacheService`] backend.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::infrastructure::cache::CacheService;

/// Namespace for resolution entries in a shared cache backend.
pub const KEY_PREFIX: &str = "key:";

/// Value stored per short key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedLink {
    pub original_url: String,
}

/// Typed, fail-open view of the cache used by the services.
///
/// The cache is never a source of truth, so nothing here returns an error:
/// backend failures and timeouts on `get` become misses, and writes are
/// best-effort. An entry that does not decode is treated as a miss and
/// deleted.
#[derive(Clone)]
pub struct LinkCache {
    backend: Arc<dyn CacheService>,
    op_timeout: Duration,
}

impl LinkCache {
    pub fn new(backend: Arc<dyn CacheService>, op_timeout: Duration) -> Self {
        Self {
            backend,
            op_timeout,
        }
    }

    pub fn cache_key(short_key: &str) -> String {
        format!("{}{}", KEY_PREFIX, short_key)
    }

    /// Looks up the destination URL for `short_key`.
    pub async fn get(&self, short_key: &str) -> Option<String> {
        let key = Self::cache_key(short_key);

        let raw = match timeout(self.op_timeout, self.backend.get(&key)).await {
            Ok(Ok(Some(raw))) => raw,
            Ok(Ok(None)) => {
                debug!("Cache MISS: {}", short_key);
                return None;
            }
            Ok(Err(e)) => {
                warn!("Cache GET failed for {}, treating as miss: {}", short_key, e);
                return None;
            }
            Err(_) => {
                warn!(
                    "Cache GET timed out for {} after {:?}, treating as miss",
                    short_key, self.op_timeout
                );
                return None;
            }
        };

        match serde_json::from_str::<CachedLink>(&raw) {
            Ok(link) => {
                debug!("Cache HIT: {} -> {}", short_key, link.original_url);
                Some(link.original_url)
            }
            Err(e) => {
                warn!("Undecodable cache entry for {}, evicting: {}", short_key, e);
                self.invalidate(short_key).await;
                None
            }
        }
    }

    /// Stores the mapping for `ttl_seconds`. Failures are logged only.
    pub async fn set(&self, short_key: &str, original_url: &str, ttl_seconds: u64) {
        let key = Self::cache_key(short_key);
        let value = match serde_json::to_string(&CachedLink {
            original_url: original_url.to_string(),
        }) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to encode cache entry for {}: {}", short_key, e);
                return;
            }
        };

        match timeout(self.op_timeout, self.backend.set(&key, &value, ttl_seconds)).await {
            Ok(Ok(())) => debug!("Cached {} for {}s", short_key, ttl_seconds),
            Ok(Err(e)) => warn!("Cache SET failed for {}: {}", short_key, e),
            Err(_) => warn!(
                "Cache SET timed out for {} after {:?}",
                short_key, self.op_timeout
            ),
        }
    }

    /// Removes the mapping. Failures are logged only.
    pub async fn invalidate(&self, short_key: &str) {
        let key = Self::cache_key(short_key);

        match timeout(self.op_timeout, self.backend.delete(&key)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Cache DEL failed for {}: {}", short_key, e),
            Err(_) => warn!(
                "Cache DEL timed out for {} after {:?}",
                short_key, self.op_timeout
            ),
        }
    }

    pub async fn health_check(&self) -> bool {
        timeout(self.op_timeout, self.backend.health_check())
            .await
            .unwrap_or(false)
    }
}
