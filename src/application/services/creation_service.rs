//! Short link creation with bounded collision retry.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::application::link_cache::LinkCache;
use crate::domain::entities::{LinkRecord, NewLink};
use crate::domain::expiry::ExpiryPolicy;
use crate::domain::repositories::LinkRepository;
use crate::domain::short_key::KeyGenerator;
use crate::error::AppError;
use crate::utils::url_validator::validate_destination_url;

/// Default number of keys tried before giving up on collisions.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Mints short keys and persists new links.
///
/// Keys are not checked for existence up front. The insert itself is the
/// uniqueness check: a [`AppError::Conflict`] from the store triggers a fresh
/// key (new salt and timestamp), up to `max_attempts` times.
pub struct CreationService {
    repository: Arc<dyn LinkRepository>,
    cache: LinkCache,
    generator: KeyGenerator,
    policy: ExpiryPolicy,
    max_attempts: usize,
    db_timeout: Duration,
}

impl CreationService {
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        cache: LinkCache,
        policy: ExpiryPolicy,
        max_attempts: usize,
        db_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            cache,
            generator: KeyGenerator::new(),
            policy,
            max_attempts: max_attempts.max(1),
            db_timeout,
        }
    }

    /// Creates a short link for `original_url`.
    ///
    /// On success the mapping is also written to the cache so the first
    /// resolution does not need the store.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the URL is not an absolute HTTP(S) URL or
    ///   `custom_expiry` is not in the future
    /// - [`AppError::GenerationExhausted`] if every attempted key collided
    /// - [`AppError::Internal`] if the store fails or times out
    pub async fn create(
        &self,
        original_url: &str,
        custom_expiry: Option<DateTime<Utc>>,
    ) -> Result<LinkRecord, AppError> {
        let original_url = validate_destination_url(original_url).map_err(|e| {
            AppError::bad_request("Invalid destination URL", json!({ "reason": e.to_string() }))
        })?;

        if !self.policy.is_active(custom_expiry, Utc::now()) {
            return Err(AppError::bad_request(
                "Expiry must be at least one second in the future",
                json!({ "cust_expiry": custom_expiry }),
            ));
        }

        for attempt in 1..=self.max_attempts {
            let short_key = self.generator.generate(&original_url);
            let new_link = NewLink {
                short_key: short_key.into_string(),
                original_url: original_url.clone(),
                custom_expiry,
            };
            let candidate = new_link.short_key.clone();

            match timeout(self.db_timeout, self.repository.insert(new_link)).await {
                Ok(Ok(record)) => {
                    info!("Created short link {} -> {}", record.short_key, record.original_url);
                    self.warm_cache(&record).await;
                    return Ok(record);
                }
                Ok(Err(AppError::Conflict { .. })) => {
                    warn!(
                        "Short key collision on {} (attempt {}/{})",
                        candidate, attempt, self.max_attempts
                    );
                }
                Ok(Err(e)) => {
                    error!("Failed to insert link {}: {}", candidate, e);
                    return Err(AppError::internal("Internal server error", json!({})));
                }
                Err(_) => {
                    error!(
                        "Inserting link {} timed out after {:?}",
                        candidate, self.db_timeout
                    );
                    return Err(AppError::internal("Internal server error", json!({})));
                }
            }
        }

        error!(
            "Short key generation exhausted after {} collisions",
            self.max_attempts
        );
        Err(AppError::generation_exhausted(
            "Failed to generate a unique short key",
            json!({ "attempts": self.max_attempts }),
        ))
    }

    async fn warm_cache(&self, record: &LinkRecord) {
        if let Ok(ttl) = self.policy.effective_ttl(record.custom_expiry, Utc::now()) {
            self.cache
                .set(&record.short_key, &record.original_url, ttl)
                .await;
        }
    }
}
