//! In-memory implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;

use crate::domain::entities::{LinkRecord, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Process-local link store with the same uniqueness contract as PostgreSQL.
///
/// Backs integration tests and database-free local runs.
#[derive(Debug, Default)]
pub struct InMemoryLinkRepository {
    links: DashMap<String, LinkRecord>,
}

impl InMemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record as-is, replacing any existing one.
    pub fn seed(&self, record: LinkRecord) {
        self.links.insert(record.short_key.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn get(&self, short_key: &str) -> Result<Option<LinkRecord>, AppError> {
        Ok(self.links.get(short_key).map(|r| r.clone()))
    }

    async fn insert(&self, new_link: NewLink) -> Result<LinkRecord, AppError> {
        match self.links.entry(new_link.short_key.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "links_short_key_key" }),
            )),
            Entry::Vacant(slot) => {
                let record = LinkRecord::new(
                    new_link.short_key,
                    new_link.original_url,
                    new_link.custom_expiry,
                    Utc::now(),
                    None,
                );
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn update_last_used(
        &self,
        short_key: &str,
        used_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if let Some(mut record) = self.links.get_mut(short_key) {
            record.last_used = Some(used_at);
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
