//! Admin authentication state reported to the front end.

use serde::{Deserialize, Serialize};

/// Whether the caller holds an admin session, and for whom.
///
/// This is a view of the server-side session, never a credential: the front
/// end may display it but the server re-checks the session on every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAuth {
    pub is_authenticated: bool,
    pub username: Option<String>,
}

impl AdminAuth {
    /// No session.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            is_authenticated: false,
            username: None,
        }
    }

    /// Logged in as `username`.
    #[must_use]
    pub fn authenticated(username: impl Into<String>) -> Self {
        Self {
            is_authenticated: true,
            username: Some(username.into()),
        }
    }
}
