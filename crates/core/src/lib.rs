//! Landing CMS Core - Shared types library.
//!
//! This crate provides the domain model used across all Landing CMS components:
//! - `admin` - Content management API and server
//! - `cli` - Command-line tools for seeding and reordering content
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure functions - no I/O, no
//! HTTP clients. Persistence lives behind the store traits in the admin crate.
//!
//! # Modules
//!
//! - [`types`] - Sections, products, feature cards, icons, positions and ids
//! - [`ordering`] - Position arithmetic for drag-to-reorder collections
//! - [`forms`] - Edit form state for the admin editors
//! - [`validation`] - Input validation errors and helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod forms;
pub mod ordering;
pub mod types;
pub mod validation;

pub use forms::{FeatureForm, ProductForm, SectionForm};
pub use ordering::{EditForm, OrderedEntity, OrderingError};
pub use types::*;
pub use validation::ValidationError;
