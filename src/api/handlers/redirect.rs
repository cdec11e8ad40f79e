//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short key to its original URL.
///
/// # Endpoint
///
/// `GET /api/url/{short_key}`
///
/// Resolution goes through [`crate::application::services::ResolutionService`]:
/// cache first, then the store on a miss. Every successful resolution is
/// recorded for the last-used write-back.
///
/// # Errors
///
/// - 400 Bad Request if the key is malformed
/// - 404 Not Found if the key does not exist
/// - 410 Gone if the link has expired
/// - 500 Internal Server Error if the store fails
pub async fn redirect_handler(
    Path(short_key): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let original_url = state.resolution_service.resolve(&short_key).await?;

    Ok((StatusCode::FOUND, [(header::LOCATION, original_url)]))
}
