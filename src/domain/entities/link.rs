//! Link entity representing a short key to destination URL mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted short link.
///
/// Owned by the persistence store. The core reads whole records and only ever
/// writes back the `last_used` timestamp through
/// [`crate::domain::repositories::LinkRepository::update_last_used`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub short_key: String,
    pub original_url: String,
    pub custom_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub last_used: Option<DateTime<Utc>>,
}

impl LinkRecord {
    /// Creates a new LinkRecord instance.
    pub fn new(
        short_key: String,
        original_url: String,
        custom_expiry: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        last_used: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            short_key,
            original_url,
            custom_expiry,
            created_at,
            last_used,
        }
    }
}

/// Input data for inserting a new link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub short_key: String,
    pub original_url: String,
    pub custom_expiry: Option<DateTime<Utc>>,
}
