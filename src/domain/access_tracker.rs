//! In-memory buffer of "last used" timestamps awaiting write-back.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::mem;

/// Buffers the most recent access time per short key between flushes.
///
/// Shared by every request handler (producers) and the
/// [`crate::domain::flusher::Flusher`] (single consumer). Accesses to the same
/// key within one flush window coalesce to the latest timestamp.
///
/// Both [`record`](Self::record) and [`drain_all`](Self::drain_all) take the
/// same lock, and the drain swaps the whole map in one critical section, so a
/// record racing a drain lands either in that drain or in the next one.
#[derive(Debug, Default)]
pub struct AccessTracker {
    buffer: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl AccessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an access. Never blocks on I/O.
    ///
    /// An earlier timestamp never replaces a later one already buffered.
    pub fn record(&self, short_key: &str, used_at: DateTime<Utc>) {
        let mut buffer = self.buffer.lock();
        match buffer.get_mut(short_key) {
            Some(existing) => {
                if used_at > *existing {
                    *existing = used_at;
                }
            }
            None => {
                buffer.insert(short_key.to_string(), used_at);
            }
        }
    }

    /// Removes and returns everything buffered so far, leaving the buffer empty.
    pub fn drain_all(&self) -> HashMap<String, DateTime<Utc>> {
        mem::take(&mut *self.buffer.lock())
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }
}
