//! Utility functions shared across layers.
//!
//! - [`url_validator`] - Destination URL validation and canonicalization

pub mod url_validator;
