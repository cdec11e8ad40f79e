//! Domain layer containing business entities and logic.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`short_key`] - Short key generation and format checks
//! - [`expiry`] - Cache TTL derivation from per-link expiry
//! - [`access_tracker`] - In-memory buffer of last-used timestamps
//! - [`flusher`] - Periodic batched write-back of that buffer
//!
//! # Last-Used Tracking Flow
//!
//! 1. A successful resolution calls [`access_tracker::AccessTracker::record`]
//! 2. Accesses to the same key coalesce to the latest timestamp
//! 3. [`flusher::Flusher`] drains the buffer on a fixed interval
//! 4. Each entry is persisted via [`repositories::LinkRepository::update_last_used`]

pub mod access_tracker;
pub mod entities;
pub mod expiry;
pub mod flusher;
pub mod repositories;
pub mod short_key;
