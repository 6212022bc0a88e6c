//! Authentication route handlers for admin.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use landing_cms_core::AdminAuth;

use crate::error::AppError;
use crate::services::AdminAuthService;
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
}

/// Login form.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Check credentials and start an admin session.
///
/// POST /api/auth/login
///
/// # Errors
///
/// Returns 400 for blank input, 401 for wrong credentials, or 502 if the
/// credential check could not be performed.
#[instrument(skip_all, fields(username = %body.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AdminAuth>, AppError> {
    let password = SecretString::from(body.password);
    let admin = state.auth().login(&session, &body.username, &password).await?;
    Ok(Json(admin.auth()))
}

/// End the admin session.
///
/// POST /api/auth/logout
///
/// # Errors
///
/// Returns 500 if the session store fails.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Json<AdminAuth>, AppError> {
    AdminAuthService::logout(&session).await?;
    Ok(Json(AdminAuth::anonymous()))
}

/// Current authentication state.
///
/// GET /api/auth/me
///
/// # Errors
///
/// Returns 500 if the session store fails.
pub async fn me(session: Session) -> Result<Json<AdminAuth>, AppError> {
    Ok(Json(AdminAuthService::status(&session).await?))
}
