//! Unified error handling for admin.
//!
//! Route handlers return `Result<T, AppError>`. Errors are rendered as JSON
//! `{"error": "..."}`; server-side failures are captured to Sentry and their
//! details are not exposed to the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use landing_cms_core::{OrderingError, ValidationError};

use crate::editor::EditorError;
use crate::services::auth::AuthError;
use crate::store::StoreError;

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Content store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Editor operation failed.
    #[error("{0}")]
    Editor(#[from] EditorError),

    /// Authentication operation failed.
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// Input failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Another write to the same collection is in progress.
    #[error("{0} are being saved; try again")]
    Busy(&'static str),
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

const fn store_status(error: &StoreError) -> StatusCode {
    match error {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Conflict(_) => StatusCode::CONFLICT,
        StoreError::Http(_)
        | StoreError::Api { .. }
        | StoreError::RateLimited(_)
        | StoreError::Unauthorized
        | StoreError::Parse(_)
        | StoreError::Unavailable(_) => StatusCode::BAD_GATEWAY,
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Store(err) => store_status(err),
            Self::Editor(err) => match err {
                EditorError::Validation(_)
                | EditorError::Ordering(OrderingError::IndexOutOfBounds { .. })
                | EditorError::NotEditing => StatusCode::BAD_REQUEST,
                EditorError::UnknownId { .. } => StatusCode::NOT_FOUND,
                EditorError::StaleOrder { .. }
                | EditorError::Ordering(OrderingError::PositionOverflow(_)) => StatusCode::CONFLICT,
                EditorError::Reorder(err) | EditorError::Store(err) => store_status(err),
            },
            Self::Auth(err) => match err {
                AuthError::MissingCredentials => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
                AuthError::Store(err) => store_status(err),
            },
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Busy(_) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match status {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            StatusCode::BAD_GATEWAY => match &self {
                Self::Editor(EditorError::Reorder(_)) => {
                    "Failed to save the new order; the list was reloaded".to_string()
                }
                _ => "Content backend error".to_string(),
            },
            _ => self.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use landing_cms_core::Position;

    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("feature 123".to_string());
        assert_eq!(err.to_string(), "Not found: feature 123");

        let err = AppError::Busy("features");
        assert_eq!(err.to_string(), "features are being saved; try again");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: impl Into<AppError>) -> StatusCode {
            err.into().into_response().status()
        }

        assert_eq!(
            get_status(ValidationError::Required { field: "title" }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AuthError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(StoreError::NotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(EditorError::StaleOrder {
                kind: "feature",
                index: 0,
                expected: "x".to_string()
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(get_status(AppError::Busy("products")), StatusCode::CONFLICT);
        assert_eq!(
            get_status(EditorError::Reorder(StoreError::Unavailable(
                "reset".to_string()
            ))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(EditorError::Ordering(OrderingError::IndexOutOfBounds {
                index: 4,
                len: 2
            })),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(EditorError::Ordering(OrderingError::PositionOverflow(
                Position::new(i32::MAX)
            ))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AuthError::MissingCredentials),
            StatusCode::BAD_REQUEST
        );
    }
}
