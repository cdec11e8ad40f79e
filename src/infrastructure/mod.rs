//! Infrastructure layer for external integrations.
//!
//! Concrete implementations of the collaborators the core depends on.
//!
//! # Modules
//!
//! - [`cache`] - Cache backends (Redis, in-memory, no-op)
//! - [`persistence`] - Link repositories (PostgreSQL, in-memory)

pub mod cache;
pub mod persistence;
