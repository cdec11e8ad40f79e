//! API route configuration.

use crate::api::handlers::{redirect_handler, shorten_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Public link routes, mounted under `/api`.
///
/// # Endpoints
///
/// - `POST /url/shorten`       - Create a short link
/// - `GET  /url/{short_key}`   - Redirect to the destination URL
pub fn link_routes() -> Router<AppState> {
    Router::new()
        .route("/url/shorten", post(shorten_handler))
        .route("/url/{short_key}", get(redirect_handler))
}
