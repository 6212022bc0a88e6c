//! HTTP middleware for admin.
//!
//! # Layers (outermost first)
//!
//! 1. Sentry (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Session layer (in-memory store, SameSite=Strict)
//!
//! Authentication is enforced per handler through the [`RequireAdminAuth`]
//! extractor.

pub mod auth;
pub mod session;

pub use auth::{AdminAuthRejection, RequireAdminAuth};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
