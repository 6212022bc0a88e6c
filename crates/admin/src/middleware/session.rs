//! Session middleware configuration for admin.
//!
//! Sessions live in process memory (tower-sessions `MemoryStore`) with
//! SameSite=Strict cookies and an inactivity expiry. The absolute lifetime is
//! enforced separately from the `expires_at` stored in the session.

use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration as CookieDuration;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::AdminConfig;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "lcms_admin_session";

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &AdminConfig) -> SessionManagerLayer<MemoryStore> {
    let idle = CookieDuration::try_from(config.session.idle_timeout)
        .unwrap_or(CookieDuration::hours(1));

    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(idle))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
