//! Repository trait for short link data access.

use crate::domain::entities::{LinkRecord, NewLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Persistence collaborator for short links.
///
/// The store is authoritative and owns the unique constraint on `short_key`.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryLinkRepository`] - Process-local store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Fetches a link by its short key.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(LinkRecord))` if found
    /// - `Ok(None)` if not found
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn get(&self, short_key: &str) -> Result<Option<LinkRecord>, AppError>;

    /// Inserts a new link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short key is already taken.
    /// Returns [`AppError::Internal`] on database errors.
    async fn insert(&self, new_link: NewLink) -> Result<LinkRecord, AppError>;

    /// Sets `last_used` for a link. Unknown keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn update_last_used(
        &self,
        short_key: &str,
        used_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Checks if the store is reachable.
    async fn health_check(&self) -> bool;
}
