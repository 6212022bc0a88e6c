//! Handlers shared by the ordered collections.
//!
//! Each request builds a fresh [`OrderedCollectionEditor`](crate::editor::OrderedCollectionEditor),
//! so every response reflects the store as re-read after the write.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use landing_cms_core::EditForm;

use crate::editor::ReorderOutcome;
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::state::{AppState, ManagedCollection};

/// Drag-and-drop result from the client.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest<Id> {
    /// Index the item was dragged from.
    pub from: usize,
    /// Index the item was dropped at.
    pub to: usize,
    /// Id the client saw at `from`; rejected with 409 if the list changed.
    pub id: Option<Id>,
}

/// List all items in position order.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
#[instrument(skip_all, fields(collection = E::PLURAL))]
pub async fn list<E>(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<E>>, AppError>
where
    E: ManagedCollection + Serialize,
{
    let mut editor = state.collection_editor::<E>();
    editor.load().await?;
    Ok(Json(editor.items().to_vec()))
}

/// Create an item at the end of the list.
///
/// # Errors
///
/// Returns 400 for an invalid form, 409 if another write is in progress, or a
/// store error.
#[instrument(skip_all, fields(collection = E::PLURAL, admin = %admin.username))]
pub async fn create<E>(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(form): Json<E::Form>,
) -> Result<(StatusCode, Json<E>), AppError>
where
    E: ManagedCollection + Serialize,
    E::Form: DeserializeOwned,
{
    let new = form.to_new()?;
    let _guard = E::gate(&state).enter()?;

    let mut editor = state.collection_editor::<E>();
    let created = editor.create(new).await?;
    state.content().invalidate().await;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Apply a partial update.
///
/// # Errors
///
/// Returns 400 for invalid fields, 404 for an unknown id, 409 if another write
/// is in progress, or a store error.
#[instrument(skip_all, fields(collection = E::PLURAL, admin = %admin.username))]
pub async fn update<E>(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<E::Id>,
    Json(patch): Json<E::Patch>,
) -> Result<Json<E>, AppError>
where
    E: ManagedCollection + Serialize,
    E::Id: DeserializeOwned,
    E::Patch: DeserializeOwned,
{
    let _guard = E::gate(&state).enter()?;

    let mut editor = state.collection_editor::<E>();
    let updated = editor.update(id, patch).await?;
    state.content().invalidate().await;

    Ok(Json(updated))
}

/// Delete an item. Other positions are left as they are.
///
/// # Errors
///
/// Returns 404 for an unknown id, 409 if another write is in progress, or a
/// store error.
#[instrument(skip_all, fields(collection = E::PLURAL, admin = %admin.username))]
pub async fn delete<E>(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<E::Id>,
) -> Result<StatusCode, AppError>
where
    E: ManagedCollection,
    E::Id: DeserializeOwned,
{
    let _guard = E::gate(&state).enter()?;

    let mut editor = state.collection_editor::<E>();
    editor.delete(id).await?;
    state.content().invalidate().await;

    Ok(StatusCode::NO_CONTENT)
}

/// Move one item and return the list as stored afterwards.
///
/// # Errors
///
/// Returns 400 for out-of-range indices, 409 for a stale `id` or a concurrent
/// write, or 502 if the new order could not be saved.
#[instrument(skip_all, fields(collection = E::PLURAL, admin = %admin.username, from = request.from, to = request.to))]
pub async fn reorder<E>(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(request): Json<ReorderRequest<E::Id>>,
) -> Result<Json<Vec<E>>, AppError>
where
    E: ManagedCollection + Serialize,
    E::Id: DeserializeOwned,
{
    let _guard = E::gate(&state).enter()?;

    let mut editor = state.collection_editor::<E>();
    editor.load().await?;
    let outcome = editor
        .reorder_checked(request.from, request.to, request.id)
        .await?;
    if outcome == ReorderOutcome::Moved {
        state.content().invalidate().await;
    }

    Ok(Json(editor.items().to_vec()))
}
