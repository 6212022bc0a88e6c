//! Session-related types for admin authentication.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use landing_cms_core::AdminAuth;

/// Session-stored admin identity.
///
/// Written once at login. The session store handles the idle timeout;
/// `expires_at` caps the total lifetime regardless of activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    /// Username the admin logged in with.
    pub username: String,
    /// When the credentials were checked.
    pub authenticated_at: DateTime<Utc>,
    /// Absolute end of the session.
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    /// Start a session for `username` that ends `max_lifetime` after `now`.
    #[must_use]
    pub fn start(username: impl Into<String>, now: DateTime<Utc>, max_lifetime: Duration) -> Self {
        let lifetime = TimeDelta::from_std(max_lifetime).unwrap_or(TimeDelta::MAX);
        Self {
            username: username.into(),
            authenticated_at: now,
            expires_at: now.checked_add_signed(lifetime).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Public view of this session.
    #[must_use]
    pub fn auth(&self) -> AdminAuth {
        AdminAuth::authenticated(self.username.clone())
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the logged-in admin.
    pub const ADMIN: &str = "admin";
}
