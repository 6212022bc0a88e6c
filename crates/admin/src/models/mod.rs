//! Session-stored models for the admin server.

pub mod session;

pub use session::{AdminSession, keys as session_keys};
