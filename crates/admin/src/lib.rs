//! Landing CMS admin library.
//!
//! The admin server edits the content of a single marketing landing page:
//! fixed sections (hero, about, ...), a product showcase and feature cards.
//! Products and feature cards are ordered collections that admins reorder by
//! drag and drop. The crate is a library so the routes, editors and stores
//! can be tested and driven from the CLI.
//!
//! # Modules
//!
//! - [`store`] - Content store traits with REST and in-memory backends
//! - [`editor`] - Ordered collection and section editors
//! - [`services`] - Authentication and the cached public content
//! - [`routes`] - JSON API
//! - [`middleware`] - Sessions and the admin auth extractor

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod editor;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use config::AdminConfig;
pub use error::AppError;
pub use routes::app;
pub use state::AppState;
