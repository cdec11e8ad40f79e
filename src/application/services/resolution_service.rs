//! Short key resolution through the cache-aside path.

use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error};

use crate::application::link_cache::LinkCache;
use crate::domain::access_tracker::AccessTracker;
use crate::domain::expiry::ExpiryPolicy;
use crate::domain::repositories::LinkRepository;
use crate::domain::short_key::ShortKey;
use crate::error::AppError;

/// Resolves short keys to destination URLs.
///
/// # Request Flow
///
/// 1. Check cache (`key:<short_key>`); on hit, record access and return
/// 2. On miss, fetch from the store (bounded by the persistence timeout)
/// 3. Apply [`ExpiryPolicy`]; expired links are never cached
/// 4. Populate the cache with the bounded TTL, record access, return
///
/// Each call performs one cache read, at most one store read and at most one
/// cache write.
pub struct ResolutionService {
    repository: Arc<dyn LinkRepository>,
    cache: LinkCache,
    tracker: Arc<AccessTracker>,
    policy: ExpiryPolicy,
    db_timeout: Duration,
}

impl ResolutionService {
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        cache: LinkCache,
        tracker: Arc<AccessTracker>,
        policy: ExpiryPolicy,
        db_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            cache,
            tracker,
            policy,
            db_timeout,
        }
    }

    /// Resolves `short_key` to its destination URL.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the key is not shaped like a short key
    /// - [`AppError::NotFound`] if no link has this key
    /// - [`AppError::Expired`] if the link is past its custom expiry
    /// - [`AppError::Internal`] if the store fails or times out
    pub async fn resolve(&self, short_key: &str) -> Result<String, AppError> {
        if !ShortKey::is_well_formed(short_key) {
            return Err(AppError::bad_request(
                "Invalid short URL",
                json!({ "short_key": short_key }),
            ));
        }

        if let Some(url) = self.cache.get(short_key).await {
            self.tracker.record(short_key, Utc::now());
            return Ok(url);
        }

        let record = match timeout(self.db_timeout, self.repository.get(short_key)).await {
            Ok(result) => result.map_err(|e| {
                error!("Failed to fetch {}: {}", short_key, e);
                AppError::internal("Internal server error", json!({}))
            })?,
            Err(_) => {
                error!(
                    "Fetching {} timed out after {:?}",
                    short_key, self.db_timeout
                );
                return Err(AppError::internal("Internal server error", json!({})));
            }
        };

        let record = record.ok_or_else(|| {
            debug!("Short key not found: {}", short_key);
            AppError::not_found("URL not found", json!({ "short_key": short_key }))
        })?;

        let now = Utc::now();
        let ttl = self
            .policy
            .effective_ttl(record.custom_expiry, now)
            .map_err(|_| {
                debug!("Short key expired: {}", short_key);
                AppError::expired(
                    "Link has expired",
                    json!({ "short_key": short_key, "expired_at": record.custom_expiry }),
                )
            })?;

        self.cache.set(short_key, &record.original_url, ttl).await;
        self.tracker.record(short_key, now);

        Ok(record.original_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::LinkRecord;
    use crate::domain::repositories::MockLinkRepository;
    use crate::infrastructure::cache::{CacheService, MemoryCache};
    use chrono::{DateTime, Duration as ChronoDuration};

    const KEY: &str = "a1B2-c3D4";

    fn record(expiry: Option<DateTime<Utc>>) -> LinkRecord {
        LinkRecord::new(
            KEY.to_string(),
            "https://example.com/target".to_string(),
            expiry,
            Utc::now(),
            None,
        )
    }

    struct Fixture {
        service: ResolutionService,
        backend: Arc<MemoryCache>,
        tracker: Arc<AccessTracker>,
    }

    fn fixture(repo: MockLinkRepository) -> Fixture {
        let backend = Arc::new(MemoryCache::new());
        let tracker = Arc::new(AccessTracker::new());
        let service = ResolutionService::new(
            Arc::new(repo),
            LinkCache::new(backend.clone(), Duration::from_millis(250)),
            tracker.clone(),
            ExpiryPolicy::new(3600),
            Duration::from_secs(2),
        );

        Fixture {
            service,
            backend,
            tracker,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_miss_populates_cache_with_default_ttl() {
        let mut repo = MockLinkRepository::new();
        repo.expect_get()
            .withf(|key| key == KEY)
            .times(1)
            .returning(|_| Ok(Some(record(None))));

        let f = fixture(repo);
        let url = f.service.resolve(KEY).await.unwrap();

        assert_eq!(url, "https://example.com/target");
        assert_eq!(
            f.backend.ttl("key:a1B2-c3D4"),
            Some(Duration::from_secs(3600))
        );
        assert!(f.tracker.drain_all().contains_key(KEY));
    }

    #[tokio::test]
    async fn test_second_resolve_hits_cache_without_persistence() {
        let mut repo = MockLinkRepository::new();
        repo.expect_get()
            .times(1)
            .returning(|_| Ok(Some(record(None))));

        let f = fixture(repo);
        f.service.resolve(KEY).await.unwrap();
        f.tracker.drain_all();

        let url = f.service.resolve(KEY).await.unwrap();

        assert_eq!(url, "https://example.com/target");
        assert!(f.tracker.drain_all().contains_key(KEY));
    }

    #[tokio::test]
    async fn test_cache_hit_never_touches_persistence() {
        let mut repo = MockLinkRepository::new();
        repo.expect_get().times(0);

        let f = fixture(repo);
        LinkCache::new(f.backend.clone(), Duration::from_millis(250))
            .set(KEY, "https://cached.example.com/", 60)
            .await;

        let url = f.service.resolve(KEY).await.unwrap();
        assert_eq!(url, "https://cached.example.com/");
        assert_eq!(f.tracker.len(), 1);
    }

    #[tokio::test]
    async fn test_not_found_skips_cache_write_and_tracking() {
        let mut repo = MockLinkRepository::new();
        repo.expect_get().times(1).returning(|_| Ok(None));

        let f = fixture(repo);
        let result = f.service.resolve(KEY).await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
        assert!(f.backend.is_empty());
        assert!(f.tracker.is_empty());
    }

    #[tokio::test]
    async fn test_expired_link_is_not_cached() {
        let mut repo = MockLinkRepository::new();
        repo.expect_get()
            .times(1)
            .returning(|_| Ok(Some(record(Some(Utc::now() - ChronoDuration::seconds(1))))));

        let f = fixture(repo);
        let result = f.service.resolve(KEY).await;

        assert!(matches!(result, Err(AppError::Expired { .. })));
        assert_eq!(f.backend.get("key:a1B2-c3D4").await.unwrap(), None);
        assert!(f.tracker.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_is_bounded_by_link_expiry() {
        let mut repo = MockLinkRepository::new();
        repo.expect_get()
            .times(1)
            .returning(|_| Ok(Some(record(Some(Utc::now() + ChronoDuration::seconds(30))))));

        let f = fixture(repo);
        f.service.resolve(KEY).await.unwrap();

        let ttl = f.backend.ttl("key:a1B2-c3D4").unwrap();
        assert!(ttl <= Duration::from_secs(30));
        assert!(ttl >= Duration::from_secs(28));
    }

    #[tokio::test]
    async fn test_persistence_error_is_internal() {
        let mut repo = MockLinkRepository::new();
        repo.expect_get()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let f = fixture(repo);
        let result = f.service.resolve(KEY).await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
        assert!(f.tracker.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_key_is_rejected_before_any_lookup() {
        let mut repo = MockLinkRepository::new();
        repo.expect_get().times(0);

        let f = fixture(repo);
        let result = f.service.resolve("../etc/passwd").await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }
}
