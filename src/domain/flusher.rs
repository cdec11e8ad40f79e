//! Periodic write-back of buffered "last used" timestamps.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::{MissedTickBehavior, timeout};
use tracing::{debug, info, warn};

use crate::domain::access_tracker::AccessTracker;
use crate::domain::repositories::LinkRepository;

/// Outcome of a single flush cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub attempted: usize,
    pub written: usize,
    pub failed: usize,
}

/// Drains the [`AccessTracker`] on a fixed interval and writes each entry to
/// the store.
///
/// Cycles never overlap: the scheduled loop runs them sequentially and skips
/// ticks missed during a slow cycle, and a manual [`flush`](Self::flush) that
/// arrives while another cycle runs is skipped.
///
/// Failures stay inside the flusher. A key whose update fails or times out is
/// logged and the rest of the batch continues.
pub struct Flusher {
    tracker: Arc<AccessTracker>,
    repository: Arc<dyn LinkRepository>,
    interval: Duration,
    write_timeout: Duration,
    in_progress: AtomicBool,
}

/// Clears the in-progress flag when a cycle ends, even by panic.
struct InProgressGuard<'a>(&'a AtomicBool);

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Flusher {
    pub fn new(
        tracker: Arc<AccessTracker>,
        repository: Arc<dyn LinkRepository>,
        interval: Duration,
        write_timeout: Duration,
    ) -> Self {
        Self {
            tracker,
            repository,
            interval,
            write_timeout,
            in_progress: AtomicBool::new(false),
        }
    }

    /// Runs one flush cycle.
    ///
    /// Returns `None` if another cycle is already in progress.
    pub async fn flush(&self) -> Option<FlushReport> {
        if self.in_progress.swap(true, Ordering::AcqRel) {
            debug!("Flush already in progress, skipping");
            return None;
        }
        let _guard = InProgressGuard(&self.in_progress);

        let batch = self.tracker.drain_all();
        if batch.is_empty() {
            debug!("No last-used updates to flush");
            return Some(FlushReport::default());
        }

        let mut report = FlushReport {
            attempted: batch.len(),
            ..FlushReport::default()
        };

        for (short_key, used_at) in batch {
            if self.write_one(&short_key, used_at).await {
                report.written += 1;
            } else {
                report.failed += 1;
            }
        }

        if report.failed > 0 {
            warn!(
                "Flushed last-used timestamps: {} written, {} failed",
                report.written, report.failed
            );
        } else {
            info!("Flushed {} last-used timestamps", report.written);
        }

        Some(report)
    }

    async fn write_one(&self, short_key: &str, used_at: DateTime<Utc>) -> bool {
        match timeout(
            self.write_timeout,
            self.repository.update_last_used(short_key, used_at),
        )
        .await
        {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!("Failed to update last_used for {}: {}", short_key, e);
                false
            }
            Err(_) => {
                warn!(
                    "Timed out updating last_used for {} after {:?}",
                    short_key, self.write_timeout
                );
                false
            }
        }
    }

    /// Flushes every `interval` until `shutdown` resolves, then flushes once
    /// more so buffered timestamps survive a graceful stop.
    pub async fn run<F>(self: Arc<Self>, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.flush().await;
                }
                _ = &mut shutdown => {
                    info!("Flusher stopping, running final flush");
                    self.flush().await;
                    break;
                }
            }
        }
    }
}
