//! Admin authentication service.
//!
//! Username and password are checked by the backend (or the in-memory store);
//! on success the server issues its own session. Nothing the client sends is
//! trusted as proof of login except the session cookie.

mod error;

pub use error::AuthError;

use async_trait::async_trait;
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use tower_sessions::Session;

use landing_cms_core::AdminAuth;

use crate::config::SessionConfig;
use crate::models::{AdminSession, session_keys};
use crate::store::StoreError;

/// Checks admin credentials.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Whether `username` / `password` match an admin account.
    async fn verify(&self, username: &str, password: &SecretString) -> Result<bool, StoreError>;
}

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    authenticator: &'a dyn Authenticator,
    config: SessionConfig,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(authenticator: &'a dyn Authenticator, config: SessionConfig) -> Self {
        Self {
            authenticator,
            config,
        }
    }

    /// Check credentials and start a session.
    ///
    /// The session id is rotated before the admin is stored in it.
    ///
    /// # Errors
    ///
    /// Returns `MissingCredentials` for blank input, `InvalidCredentials` if
    /// the check fails, or a store/session error.
    pub async fn login(
        &self,
        session: &Session,
        username: &str,
        password: &SecretString,
    ) -> Result<AdminSession, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.expose_secret().is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        if !self.authenticator.verify(username, password).await? {
            tracing::warn!(username, "Admin login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        session.cycle_id().await?;
        let admin = AdminSession::start(username, Utc::now(), self.config.max_lifetime);
        session.insert(session_keys::ADMIN, &admin).await?;

        tracing::info!(username, expires_at = %admin.expires_at, "Admin logged in");
        Ok(admin)
    }

    /// End the session and delete it from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn logout(session: &Session) -> Result<(), AuthError> {
        session.flush().await?;
        Ok(())
    }

    /// The admin for this session, if logged in and not past its absolute
    /// expiry. Expired sessions are flushed.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn current(session: &Session) -> Result<Option<AdminSession>, AuthError> {
        let Some(admin) = session.get::<AdminSession>(session_keys::ADMIN).await? else {
            return Ok(None);
        };

        if admin.is_expired(Utc::now()) {
            tracing::info!(username = %admin.username, "Admin session expired");
            session.flush().await?;
            return Ok(None);
        }

        Ok(Some(admin))
    }

    /// Public authentication state for this session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn status(session: &Session) -> Result<AdminAuth, AuthError> {
        Ok(Self::current(session)
            .await?
            .map_or_else(AdminAuth::anonymous, |admin| admin.auth()))
    }
}
