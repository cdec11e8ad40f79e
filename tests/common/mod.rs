#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use shortlink::config::Config;
use shortlink::domain::access_tracker::AccessTracker;
use shortlink::domain::entities::{LinkRecord, NewLink};
use shortlink::domain::repositories::LinkRepository;
use shortlink::error::AppError;
use shortlink::infrastructure::cache::{CacheError, CacheResult, CacheService, MemoryCache};
use shortlink::infrastructure::persistence::InMemoryLinkRepository;
use shortlink::state::AppState;

pub const BASE_URL: &str = "http://sho.rt/api/url/";

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/test".to_string(),
        redis_url: None,
        listen_addr: "127.0.0.1:0".to_string(),
        base_url: BASE_URL.to_string(),
        log_level: "debug".to_string(),
        log_format: "text".to_string(),
        cache_ttl_seconds: 3600,
        flush_interval_seconds: 60,
        cache_timeout_ms: 250,
        db_timeout_ms: 2000,
        key_generation_attempts: 5,
        db_max_connections: 1,
        db_connect_timeout: 1,
        db_idle_timeout: 1,
        db_max_lifetime: 1,
        cors_allowed_origins: vec!["*".to_string()],
    }
}

/// How a [`FaultyCache`] currently behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    Healthy,
    Failing,
    Stalled,
}

/// Memory cache whose behaviour can be switched at runtime.
pub struct FaultyCache {
    inner: MemoryCache,
    mode: Mutex<CacheMode>,
}

impl FaultyCache {
    pub fn new() -> Self {
        Self {
            inner: MemoryCache::new(),
            mode: Mutex::new(CacheMode::Healthy),
        }
    }

    pub fn set_mode(&self, mode: CacheMode) {
        *self.mode.lock() = mode;
    }

    pub fn inner(&self) -> &MemoryCache {
        &self.inner
    }

    async fn gate(&self) -> CacheResult<()> {
        let mode = *self.mode.lock();
        match mode {
            CacheMode::Healthy => Ok(()),
            CacheMode::Failing => Err(CacheError::ConnectionError(
                "connection refused".to_string(),
            )),
            CacheMode::Stalled => std::future::pending().await,
        }
    }
}

#[async_trait]
impl CacheService for FaultyCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.gate().await?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> CacheResult<()> {
        self.gate().await?;
        self.inner.set(key, value, ttl_seconds).await
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.gate().await?;
        self.inner.delete(key).await
    }

    async fn health_check(&self) -> bool {
        if self.gate().await.is_err() {
            return false;
        }
        self.inner.health_check().await
    }
}

/// In-memory repository that counts calls and can fail or stall selected operations.
pub struct CountingRepository {
    inner: InMemoryLinkRepository,
    pub gets: AtomicUsize,
    pub inserts: AtomicUsize,
    pub fail_reads: AtomicBool,
    /// Every call hangs until its caller gives up.
    pub stalled: AtomicBool,
    failing_updates: Mutex<HashSet<String>>,
    stalled_updates: Mutex<HashSet<String>>,
}

impl CountingRepository {
    pub fn new() -> Self {
        Self {
            inner: InMemoryLinkRepository::new(),
            gets: AtomicUsize::new(0),
            inserts: AtomicUsize::new(0),
            fail_reads: AtomicBool::new(false),
            stalled: AtomicBool::new(false),
            failing_updates: Mutex::new(HashSet::new()),
            stalled_updates: Mutex::new(HashSet::new()),
        }
    }

    pub fn seed(&self, record: LinkRecord) {
        self.inner.seed(record);
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn fail_update_for(&self, short_key: &str) {
        self.failing_updates.lock().insert(short_key.to_string());
    }

    pub fn stall_update_for(&self, short_key: &str) {
        self.stalled_updates.lock().insert(short_key.to_string());
    }

    async fn stall_if_set(&self) {
        if self.stalled.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
    }

    pub async fn stored(&self, short_key: &str) -> Option<LinkRecord> {
        self.inner.get(short_key).await.unwrap()
    }
}

#[async_trait]
impl LinkRepository for CountingRepository {
    async fn get(&self, short_key: &str) -> Result<Option<LinkRecord>, AppError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.stall_if_set().await;
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::internal("Database error", serde_json::json!({})));
        }
        self.inner.get(short_key).await
    }

    async fn insert(&self, new_link: NewLink) -> Result<LinkRecord, AppError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.stall_if_set().await;
        self.inner.insert(new_link).await
    }

    async fn update_last_used(
        &self,
        short_key: &str,
        used_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.stall_if_set().await;
        let stalled = self.stalled_updates.lock().contains(short_key);
        if stalled {
            std::future::pending::<()>().await;
        }
        if self.failing_updates.lock().contains(short_key) {
            return Err(AppError::internal("Database error", serde_json::json!({})));
        }
        self.inner.update_last_used(short_key, used_at).await
    }

    async fn health_check(&self) -> bool {
        !self.fail_reads.load(Ordering::SeqCst)
    }
}

pub struct TestApp {
    pub state: AppState,
    pub repo: Arc<CountingRepository>,
    pub cache: Arc<FaultyCache>,
    pub tracker: Arc<AccessTracker>,
}

pub fn create_test_app() -> TestApp {
    let repo = Arc::new(CountingRepository::new());
    let cache = Arc::new(FaultyCache::new());
    let tracker = Arc::new(AccessTracker::new());

    let state = AppState::new(repo.clone(), cache.clone(), tracker.clone(), &test_config());

    TestApp {
        state,
        repo,
        cache,
        tracker,
    }
}

pub fn link(short_key: &str, url: &str, custom_expiry: Option<DateTime<Utc>>) -> LinkRecord {
    LinkRecord::new(
        short_key.to_string(),
        url.to_string(),
        custom_expiry,
        Utc::now(),
        None,
    )
}

/// Application routes without the outer middleware stack.
pub fn test_router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route(
            "/health",
            axum::routing::get(shortlink::api::handlers::health_handler),
        )
        .nest("/api", shortlink::api::routes::link_routes())
        .with_state(state)
}
