//! Landing page section routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use tracing::instrument;

use landing_cms_core::{PageSection, SectionKey, SectionUpdate};

use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Build the section router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sections", get(list))
        .route("/api/sections/{key}", get(show).put(update))
}

fn parse_key(raw: &str) -> Result<SectionKey, AppError> {
    SectionKey::parse(raw).map_err(AppError::from)
}

/// All sections, ordered by key.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<PageSection>>, AppError> {
    let mut editor = state.section_editor();
    let sections = editor.load().await?;
    Ok(Json(sections.values().cloned().collect()))
}

/// One section.
///
/// # Errors
///
/// Returns 400 for a malformed key, 404 for an unknown one.
pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<PageSection>, AppError> {
    let key = parse_key(&key)?;
    let mut editor = state.section_editor();
    editor.load().await?;
    editor
        .section(&key)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("section {key}")))
}

/// Replace one section's content.
///
/// # Errors
///
/// Returns 400 for a malformed key or blank title, 404 for an unknown key,
/// 409 if another section write is in progress, or a store error.
#[instrument(skip_all, fields(section = %key, admin = %admin.username))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(update): Json<SectionUpdate>,
) -> Result<Json<PageSection>, AppError> {
    let key = parse_key(&key)?;
    let _guard = state.sections_gate().enter()?;

    let mut editor = state.section_editor();
    let saved = editor.update(&key, update).await?;
    state.content().invalidate().await;

    Ok(Json(saved))
}
