//! PostgreSQL repository tests. Require `DATABASE_URL`; run with `--ignored`.

use chrono::{Duration as ChronoDuration, SubsecRound, Utc};
use shortlink::domain::entities::NewLink;
use shortlink::domain::repositories::LinkRepository;
use shortlink::error::AppError;
use shortlink::infrastructure::persistence::PgLinkRepository;
use sqlx::PgPool;
use std::sync::Arc;

fn new_link(short_key: &str) -> NewLink {
    NewLink {
        short_key: short_key.to_string(),
        original_url: "https://example.com/".to_string(),
        custom_expiry: None,
    }
}

#[sqlx::test]
#[ignore]
async fn test_insert_and_get(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));
    let expiry = (Utc::now() + ChronoDuration::days(1)).trunc_subsecs(6);

    let created = repo
        .insert(NewLink {
            custom_expiry: Some(expiry),
            ..new_link("abcd-1234")
        })
        .await
        .unwrap();
    assert_eq!(created.short_key, "abcd-1234");
    assert_eq!(created.custom_expiry, Some(expiry));
    assert!(created.last_used.is_none());

    let fetched = repo.get("abcd-1234").await.unwrap().unwrap();
    assert_eq!(fetched, created);
}

#[sqlx::test]
#[ignore]
async fn test_get_not_found(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    assert!(repo.get("zzzz-9999").await.unwrap().is_none());
}

#[sqlx::test]
#[ignore]
async fn test_duplicate_key_is_conflict(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));
    repo.insert(new_link("abcd-1234")).await.unwrap();

    let result = repo.insert(new_link("abcd-1234")).await;

    assert!(matches!(result, Err(AppError::Conflict { .. })));
}

#[sqlx::test]
#[ignore]
async fn test_update_last_used(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));
    repo.insert(new_link("abcd-1234")).await.unwrap();
    let used_at = Utc::now().trunc_subsecs(6);

    repo.update_last_used("abcd-1234", used_at).await.unwrap();
    repo.update_last_used("zzzz-9999", used_at).await.unwrap();

    let fetched = repo.get("abcd-1234").await.unwrap().unwrap();
    assert_eq!(fetched.last_used, Some(used_at));
}

#[sqlx::test]
#[ignore]
async fn test_health_check(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    assert!(repo.health_check().await);
}
