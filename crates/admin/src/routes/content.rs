//! Public landing page content.

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::error::AppError;
use crate::state::AppState;

/// Build the public content router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/content", get(landing))
}

/// Sections, products and feature cards for the landing page.
///
/// GET /api/content
///
/// # Errors
///
/// Returns 502 if the backend cannot be read and nothing is cached.
pub async fn landing(State(state): State<AppState>) -> Result<Response, AppError> {
    let content = state.content().landing().await?;
    Ok(Json(content.as_ref()).into_response())
}
