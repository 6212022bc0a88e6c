//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Username/password login backed by server-side sessions
//! - `content` - Cached public landing page payload

pub mod auth;
pub mod content;

pub use auth::{AdminAuthService, AuthError, Authenticator};
pub use content::ContentService;
