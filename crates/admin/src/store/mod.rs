//! Content storage behind the admin editors.
//!
//! # Tables
//!
//! - `page_content` - one row per fixed landing page section, keyed by `section_id`
//! - `products` - product showcase, ordered by `position`
//! - `features` - feature cards, ordered by `position`
//!
//! # Implementations
//!
//! - [`RestClient`] - the hosted backend's REST API (production)
//! - [`MemoryStore`] - in-process tables (local development and tests)
//!
//! Schema and RPC functions for the hosted backend live in
//! `crates/admin/migrations/`.

pub mod memory;
pub mod rest;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use landing_cms_core::{
    Feature, OrderedEntity, PageSection, Position, Product, SectionKey, SectionUpdate,
};

use crate::config::BackendConfig;
use crate::services::auth::Authenticator;

pub use memory::MemoryStore;
pub use rest::RestClient;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Requested row was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Constraint violation or stale write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Backend rejected our API key.
    #[error("Unauthorized: backend rejected the API key")]
    Unauthorized,

    /// Failed to parse a backend response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Backend could not be reached or refused the write.
    #[error("Unavailable: {0}")]
    Unavailable(String),
}

/// Access to the fixed landing page sections.
#[async_trait]
pub trait SectionStore: Send + Sync {
    /// All sections, ordered by key.
    async fn list_sections(&self) -> Result<Vec<PageSection>, StoreError>;

    /// Replace one section's content. Fails with `NotFound` for unknown keys.
    async fn update_section(
        &self,
        key: &SectionKey,
        update: &SectionUpdate,
    ) -> Result<PageSection, StoreError>;

    /// Create or replace one section's content (seeding).
    async fn upsert_section(
        &self,
        key: &SectionKey,
        update: &SectionUpdate,
    ) -> Result<PageSection, StoreError>;
}

/// Access to one position-ordered table.
#[async_trait]
pub trait CollectionStore<E: OrderedEntity>: Send + Sync {
    /// All rows ordered by `position` ascending.
    async fn list(&self) -> Result<Vec<E>, StoreError>;

    /// Highest stored position, `None` for an empty table.
    async fn max_position(&self) -> Result<Option<Position>, StoreError>;

    /// Insert a row at `position`.
    async fn insert(&self, new: &E::New, position: Position) -> Result<E, StoreError>;

    /// Apply a partial update. Fails with `NotFound` for unknown ids.
    async fn update(&self, id: E::Id, patch: &E::Patch) -> Result<E, StoreError>;

    /// Delete a row. Fails with `NotFound` for unknown ids.
    async fn delete(&self, id: E::Id) -> Result<(), StoreError>;

    /// Atomically set `position = index + 1` for every id in order.
    ///
    /// The ids must be exactly the ids in the table; otherwise nothing is
    /// written and `Conflict` is returned.
    async fn write_positions(&self, ordered_ids: &[E::Id]) -> Result<(), StoreError>;
}

/// The set of stores and the authenticator a server instance talks to.
#[derive(Clone)]
pub struct Backend {
    pub sections: Arc<dyn SectionStore>,
    pub products: Arc<dyn CollectionStore<Product>>,
    pub features: Arc<dyn CollectionStore<Feature>>,
    pub authenticator: Arc<dyn Authenticator>,
}

impl Backend {
    /// Everything served by the hosted REST backend.
    #[must_use]
    pub fn rest(client: RestClient) -> Self {
        let client = Arc::new(client);
        Self {
            sections: client.clone(),
            products: client.clone(),
            features: client.clone(),
            authenticator: client,
        }
    }

    /// Everything served by one in-memory store.
    #[must_use]
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            sections: store.clone(),
            products: store.clone(),
            features: store.clone(),
            authenticator: store,
        }
    }

    /// Build the backend selected by configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the REST client cannot be built.
    pub fn from_config(config: &BackendConfig) -> Result<Self, StoreError> {
        match config {
            BackendConfig::Rest(rest) => Ok(Self::rest(RestClient::new(rest)?)),
            BackendConfig::Memory(memory) => {
                tracing::warn!("Using in-memory content store; edits are lost on restart");
                let store = MemoryStore::with_admin(&memory.username, memory.password.clone());
                Ok(Self::memory(Arc::new(store)))
            }
        }
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend").finish_non_exhaustive()
    }
}
