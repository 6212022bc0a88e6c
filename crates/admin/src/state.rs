//! Application state shared across handlers.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use landing_cms_core::{Feature, OrderedEntity, Product};

use crate::config::AdminConfig;
use crate::editor::{OrderedCollectionEditor, SectionEditor};
use crate::error::AppError;
use crate::services::ContentService;
use crate::services::auth::{AdminAuthService, Authenticator};
use crate::store::{Backend, CollectionStore, StoreError};

/// Write gate for one table.
///
/// The gate admits one write at a time; a second concurrent write is
/// rejected rather than queued.
pub struct WriteGate {
    name: &'static str,
    lock: Mutex<()>,
}

impl WriteGate {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            lock: Mutex::new(()),
        }
    }

    /// Take the gate for the duration of one write.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Busy` if another write holds the gate.
    pub fn enter(&self) -> Result<MutexGuard<'_, ()>, AppError> {
        self.lock.try_lock().map_err(|_| AppError::Busy(self.name))
    }
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    backend: Backend,
    content: ContentService,
    sections_gate: WriteGate,
    products_gate: WriteGate,
    features_gate: WriteGate,
}

impl AppState {
    /// Create application state around an existing backend.
    #[must_use]
    pub fn new(config: AdminConfig, backend: Backend) -> Self {
        let content = ContentService::new(backend.clone(), config.content_cache_ttl);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                content,
                sections_gate: WriteGate::new("sections"),
                products_gate: WriteGate::new("products"),
                features_gate: WriteGate::new("features"),
            }),
        }
    }

    /// Create application state with the backend selected by configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be built.
    pub fn from_config(config: AdminConfig) -> Result<Self, StoreError> {
        let backend = Backend::from_config(&config.backend)?;
        Ok(Self::new(config, backend))
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn backend(&self) -> &Backend {
        &self.inner.backend
    }

    /// Cached public content.
    #[must_use]
    pub fn content(&self) -> &ContentService {
        &self.inner.content
    }

    #[must_use]
    pub fn authenticator(&self) -> &dyn Authenticator {
        self.inner.backend.authenticator.as_ref()
    }

    /// Auth service bound to this state's authenticator and session policy.
    #[must_use]
    pub fn auth(&self) -> AdminAuthService<'_> {
        AdminAuthService::new(self.authenticator(), self.inner.config.session)
    }

    /// Fresh section editor.
    #[must_use]
    pub fn section_editor(&self) -> SectionEditor {
        SectionEditor::new(self.inner.backend.sections.clone())
    }

    #[must_use]
    pub fn sections_gate(&self) -> &WriteGate {
        &self.inner.sections_gate
    }

    /// Fresh editor for one collection.
    #[must_use]
    pub fn collection_editor<E: ManagedCollection>(&self) -> OrderedCollectionEditor<E> {
        OrderedCollectionEditor::new(E::store(self))
    }
}

/// Collections served by the admin API.
pub trait ManagedCollection: OrderedEntity {
    /// Plural name used in routes, logs and busy errors.
    const PLURAL: &'static str;

    fn store(state: &AppState) -> Arc<dyn CollectionStore<Self>>;

    fn gate(state: &AppState) -> &WriteGate;
}

impl ManagedCollection for Product {
    const PLURAL: &'static str = "products";

    fn store(state: &AppState) -> Arc<dyn CollectionStore<Self>> {
        state.inner.backend.products.clone()
    }

    fn gate(state: &AppState) -> &WriteGate {
        &state.inner.products_gate
    }
}

impl ManagedCollection for Feature {
    const PLURAL: &'static str = "features";

    fn store(state: &AppState) -> Arc<dyn CollectionStore<Self>> {
        state.inner.backend.features.clone()
    }

    fn gate(state: &AppState) -> &WriteGate {
        &state.inner.features_gate
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
