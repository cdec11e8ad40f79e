//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{LinkRecord, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

#[derive(Debug, FromRow)]
struct LinkRow {
    short_key: String,
    original_url: String,
    custom_expiry: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    last_used: Option<DateTime<Utc>>,
}

impl From<LinkRow> for LinkRecord {
    fn from(row: LinkRow) -> Self {
        LinkRecord::new(
            row.short_key,
            row.original_url,
            row.custom_expiry,
            row.created_at,
            row.last_used,
        )
    }
}

/// PostgreSQL repository for link storage and retrieval.
///
/// Uniqueness of `short_key` is enforced by the `links_short_key_key`
/// constraint; a violation surfaces as [`AppError::Conflict`].
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn get(&self, short_key: &str) -> Result<Option<LinkRecord>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT short_key, original_url, custom_expiry, created_at, last_used
            FROM links
            WHERE short_key = $1
            "#,
        )
        .bind(short_key)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(LinkRecord::from))
    }

    async fn insert(&self, new_link: NewLink) -> Result<LinkRecord, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO links (short_key, original_url, custom_expiry)
            VALUES ($1, $2, $3)
            RETURNING short_key, original_url, custom_expiry, created_at, last_used
            "#,
        )
        .bind(&new_link.short_key)
        .bind(&new_link.original_url)
        .bind(new_link.custom_expiry)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn update_last_used(
        &self,
        short_key: &str,
        used_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE links SET last_used = $2 WHERE short_key = $1")
            .bind(short_key)
            .bind(used_at)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
