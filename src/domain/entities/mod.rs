//! Core domain entities.
//!
//! - [`LinkRecord`] - A persisted short link
//! - [`NewLink`] - Insert payload for a freshly minted short key

pub mod link;

pub use link::{LinkRecord, NewLink};
