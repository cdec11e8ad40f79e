//! Cache TTL derivation from per-link expiry.

use chrono::{DateTime, Utc};

/// Default cache lifetime for links without a custom expiry.
pub const DEFAULT_TTL_SECONDS: u64 = 3600;

/// Returned when a link exists but is past its validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("link has expired")]
pub struct LinkExpired;

/// Classifies links as active or expired and bounds their cache TTL.
///
/// The TTL handed to the cache never exceeds the link's remaining validity, so
/// a cached mapping cannot outlive the link itself.
#[derive(Debug, Clone, Copy)]
pub struct ExpiryPolicy {
    default_ttl_seconds: u64,
}

impl ExpiryPolicy {
    pub fn new(default_ttl_seconds: u64) -> Self {
        Self {
            default_ttl_seconds,
        }
    }

    pub fn default_ttl_seconds(&self) -> u64 {
        self.default_ttl_seconds
    }

    /// Computes the cache TTL for a link.
    ///
    /// # Errors
    ///
    /// Returns [`LinkExpired`] when `custom_expiry <= now`, and also when the
    /// remaining window floors to zero whole seconds.
    pub fn effective_ttl(
        &self,
        custom_expiry: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<u64, LinkExpired> {
        let Some(expiry) = custom_expiry else {
            return Ok(self.default_ttl_seconds);
        };

        if expiry <= now {
            return Err(LinkExpired);
        }

        // Positive durations truncate toward zero, which is the floor here.
        let remaining = (expiry - now).num_seconds();
        if remaining <= 0 {
            return Err(LinkExpired);
        }

        Ok(self.default_ttl_seconds.min(remaining as u64))
    }

    pub fn is_active(&self, custom_expiry: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        self.effective_ttl(custom_expiry, now).is_ok()
    }
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_SECONDS)
    }
}
