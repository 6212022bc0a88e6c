//! Admin authentication error types.

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur during admin authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username or password left blank.
    #[error("username and password are required")]
    MissingCredentials,

    /// Credentials did not match an admin account.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Session could not be read or written.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Credential check could not be performed.
    #[error("credential check failed: {0}")]
    Store(#[from] StoreError),
}
