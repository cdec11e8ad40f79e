//! Destination URL validation for link creation.

use url::Url;

/// Longest destination URL accepted, in bytes after normalization.
pub const MAX_URL_LENGTH: usize = 2048;

/// Reasons a destination URL is rejected.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum UrlValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS URLs can be shortened")]
    UnsupportedScheme,

    #[error("URL must include a host")]
    MissingHost,

    #[error("URL exceeds {MAX_URL_LENGTH} characters")]
    TooLong,
}

/// Checks that `input` is an absolute `http`/`https` URL and returns its
/// canonical form.
///
/// Parsing lowercases the host and drops default ports; the fragment is
/// removed because it never reaches the destination server anyway.
///
/// # Errors
///
/// Returns a [`UrlValidationError`] describing the first failed check.
pub fn validate_destination_url(input: &str) -> Result<String, UrlValidationError> {
    let mut url = Url::parse(input.trim())
        .map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlValidationError::UnsupportedScheme);
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    url.set_fragment(None);

    let normalized = String::from(url);
    if normalized.len() > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong);
    }

    Ok(normalized)
}
