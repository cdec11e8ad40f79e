//! Handler for link shortening endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse, ShortenedLink};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short URL.
///
/// # Endpoint
///
/// `POST /api/url/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/some/long/path",
///   "cust_expiry": "2030-01-01T00:00:00Z"
/// }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "data": {
///     "short_key": "a1B2-c3D4",
///     "short_url": "http://localhost:8000/api/url/a1B2-c3D4",
///     "original_url": "https://example.com/some/long/path",
///     "custom_expiry": "2030-01-01T00:00:00Z",
///     "created_at": "2026-01-01T12:00:00Z"
///   },
///   "message": "Short URL created successfully"
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request for a malformed body, invalid URL or non-future expiry
/// - 503 Service Unavailable if no free key was found
/// - 500 Internal Server Error if the store fails
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    let Json(payload) = payload?;

    let record = state
        .creation_service
        .create(&payload.url, payload.cust_expiry)
        .await?;

    let short_url = state.short_url(&record.short_key);

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse {
            data: ShortenedLink::from_record(record, short_url),
            message: "Short URL created successfully",
        }),
    ))
}
