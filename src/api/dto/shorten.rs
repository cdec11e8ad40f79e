//! DTOs for link shortening endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::LinkRecord;

/// Request to shorten a single URL.
#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    /// The destination URL (absolute HTTP/HTTPS).
    pub url: String,

    /// Optional expiry timestamp (RFC 3339). After this time, the link returns 410 Gone.
    #[serde(default)]
    pub cust_expiry: Option<DateTime<Utc>>,
}

/// Envelope returned on successful creation.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub data: ShortenedLink,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ShortenedLink {
    pub short_key: String,
    pub short_url: String,
    pub original_url: String,
    pub custom_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ShortenedLink {
    pub fn from_record(record: LinkRecord, short_url: String) -> Self {
        Self {
            short_key: record.short_key,
            short_url,
            original_url: record.original_url,
            custom_expiry: record.custom_expiry,
            created_at: record.created_at,
        }
    }
}
