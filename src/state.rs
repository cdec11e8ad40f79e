//! Shared application state injected into all handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::application::LinkCache;
use crate::application::services::{CreationService, ResolutionService};
use crate::config::Config;
use crate::domain::access_tracker::AccessTracker;
use crate::domain::expiry::ExpiryPolicy;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::CacheService;

#[derive(Clone)]
pub struct AppState {
    pub resolution_service: Arc<ResolutionService>,
    pub creation_service: Arc<CreationService>,
    pub repository: Arc<dyn LinkRepository>,
    pub cache: LinkCache,
    /// Prefix joined with a short key to form the public short URL.
    pub base_url: String,
    pub db_timeout: Duration,
}

impl AppState {
    /// Wires the services around a repository, cache backend and tracker.
    ///
    /// The tracker is shared with the flusher, so it is passed in rather than
    /// created here.
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        cache_backend: Arc<dyn CacheService>,
        tracker: Arc<AccessTracker>,
        config: &Config,
    ) -> Self {
        let cache = LinkCache::new(cache_backend, config.cache_timeout());
        let policy = ExpiryPolicy::new(config.cache_ttl_seconds);

        let resolution_service = Arc::new(ResolutionService::new(
            repository.clone(),
            cache.clone(),
            tracker,
            policy,
            config.db_timeout(),
        ));
        let creation_service = Arc::new(CreationService::new(
            repository.clone(),
            cache.clone(),
            policy,
            config.key_generation_attempts,
            config.db_timeout(),
        ));

        Self {
            resolution_service,
            creation_service,
            repository,
            cache,
            base_url: config.base_url.clone(),
            db_timeout: config.db_timeout(),
        }
    }

    /// Builds the public short URL for `short_key`.
    pub fn short_url(&self, short_key: &str) -> String {
        if self.base_url.ends_with('/') {
            format!("{}{}", self.base_url, short_key)
        } else {
            format!("{}/{}", self.base_url, short_key)
        }
    }
}
