//! Application layer services implementing business logic.
//!
//! Services orchestrate the domain components and the collaborators behind
//! the repository and cache traits, and provide the API consumed by HTTP
//! handlers and the admin CLI.
//!
//! - [`link_cache::LinkCache`] - Fail-open cache-aside wrapper
//! - [`services::ResolutionService`] - Short key to destination URL
//! - [`services::CreationService`] - Short key minting and persistence

pub mod link_cache;
pub mod services;

pub use link_cache::LinkCache;
