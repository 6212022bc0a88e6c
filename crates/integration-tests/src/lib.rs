//! Integration tests for the landing page CMS.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p landing-cms-integration-tests
//! ```
//!
//! All tests run in-process on top of [`MemoryStore`]; no backend or server
//! needs to be running.
//!
//! # Test Categories
//!
//! - `reorder_workflow` - collection editor behaviour across store failures
//! - `admin_api` - the HTTP API driven through the router

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use landing_cms_admin::store::{Backend, CollectionStore, MemoryStore, StoreError};
use landing_cms_admin::{AdminConfig, AppState, app};
use landing_cms_core::{
    Feature, FeatureIcon, NewFeature, NewProduct, OrderedEntity, Position, Product, SectionKey,
    SectionUpdate,
};

/// Login accepted by [`test_state`].
pub const ADMIN_USERNAME: &str = "editor";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

/// Wraps any collection store, counting calls and optionally failing writes.
pub struct CountingStore<E: OrderedEntity> {
    inner: Arc<dyn CollectionStore<E>>,
    fail_position_writes: AtomicBool,
    lists: AtomicUsize,
    inserts: AtomicUsize,
    position_writes: AtomicUsize,
}

impl<E: OrderedEntity> CountingStore<E> {
    pub fn new(inner: Arc<dyn CollectionStore<E>>) -> Self {
        Self {
            inner,
            fail_position_writes: AtomicBool::new(false),
            lists: AtomicUsize::new(0),
            inserts: AtomicUsize::new(0),
            position_writes: AtomicUsize::new(0),
        }
    }

    /// Make every following `write_positions` call fail without writing.
    pub fn fail_position_writes(&self, fail: bool) {
        self.fail_position_writes.store(fail, Ordering::SeqCst);
    }

    pub fn lists(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    /// Attempted position writes, failed ones included.
    pub fn position_writes(&self) -> usize {
        self.position_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<E: OrderedEntity> CollectionStore<E> for CountingStore<E> {
    async fn list(&self) -> Result<Vec<E>, StoreError> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list().await
    }

    async fn max_position(&self) -> Result<Option<Position>, StoreError> {
        self.inner.max_position().await
    }

    async fn insert(&self, new: &E::New, position: Position) -> Result<E, StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(new, position).await
    }

    async fn update(&self, id: E::Id, patch: &E::Patch) -> Result<E, StoreError> {
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: E::Id) -> Result<(), StoreError> {
        self.inner.delete(id).await
    }

    async fn write_positions(&self, ordered_ids: &[E::Id]) -> Result<(), StoreError> {
        self.position_writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_position_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write failure".to_string()));
        }
        self.inner.write_positions(ordered_ids).await
    }
}

pub fn new_feature(title: &str, icon: FeatureIcon) -> NewFeature {
    NewFeature {
        title: title.to_string(),
        description: format!("{title} description"),
        icon,
    }
}

pub fn new_product(title: &str) -> NewProduct {
    NewProduct {
        title: title.to_string(),
        description: String::new(),
        image_url: None,
        features: vec!["Email support".to_string()],
    }
}

/// Memory store with the test admin account and nothing else.
pub fn empty_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_admin(
        ADMIN_USERNAME,
        SecretString::from(ADMIN_PASSWORD),
    ))
}

/// Insert features at explicit positions, bypassing the editor.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn insert_features(store: &MemoryStore, rows: &[(&str, i32)]) -> Vec<Feature> {
    let mut inserted = Vec::with_capacity(rows.len());
    for (title, position) in rows {
        let feature = CollectionStore::<Feature>::insert(
            store,
            &new_feature(title, FeatureIcon::Users),
            Position::new(*position),
        )
        .await
        .expect("insert feature");
        inserted.push(feature);
    }
    inserted
}

/// Insert products at positions 1..=N.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn insert_products(store: &MemoryStore, titles: &[&str]) -> Vec<Product> {
    let mut inserted = Vec::with_capacity(titles.len());
    for (index, title) in titles.iter().enumerate() {
        let product =
            CollectionStore::<Product>::insert(store, &new_product(title), Position::from_index(index))
                .await
                .expect("insert product");
        inserted.push(product);
    }
    inserted
}

/// Create the four landing sections with placeholder copy.
///
/// # Panics
///
/// Panics if the upsert fails.
pub async fn insert_sections(store: &MemoryStore) {
    use landing_cms_admin::store::SectionStore;

    for key in [
        SectionKey::hero(),
        SectionKey::about(),
        SectionKey::products(),
        SectionKey::features(),
    ] {
        let update = SectionUpdate {
            title: format!("{} title", key.label()),
            description: Some(format!("{} description", key.label())),
            image_url: None,
        };
        store
            .upsert_section(&key, &update)
            .await
            .expect("upsert section");
    }
}

/// Application state over `store` with the default memory configuration.
pub fn test_state(store: Arc<MemoryStore>) -> AppState {
    let config = AdminConfig::for_memory_backend(ADMIN_USERNAME, ADMIN_PASSWORD);
    AppState::new(config, Backend::memory(store))
}

/// Application state whose feature store is wrapped in a [`CountingStore`].
pub fn counting_state(store: Arc<MemoryStore>) -> (AppState, Arc<CountingStore<Feature>>) {
    let counter = Arc::new(CountingStore::<Feature>::new(store.clone()));
    let backend = Backend {
        features: counter.clone(),
        ..Backend::memory(store)
    };
    let config = AdminConfig::for_memory_backend(ADMIN_USERNAME, ADMIN_PASSWORD);
    (AppState::new(config, backend), counter)
}

/// The full router plus the session cookie of the last login.
pub struct TestContext {
    router: Router,
    cookie: Option<String>,
}

impl TestContext {
    pub fn new(state: AppState) -> Self {
        Self {
            router: app(state),
            cookie: None,
        }
    }

    /// Send one request, keeping any session cookie the response sets.
    ///
    /// Returns the status and the body parsed as JSON (`Null` when empty,
    /// a JSON string when the body is not JSON).
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn send(&mut self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .expect("ascii cookie")
                .split(';')
                .next()
                .unwrap_or_default()
                .to_string();
            self.cookie = Some(pair);
        }

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    pub async fn get(&mut self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    /// Log in with the test admin account.
    ///
    /// # Panics
    ///
    /// Panics if the login is rejected.
    pub async fn login(&mut self) {
        let (status, body) = self
            .post(
                "/api/auth/login",
                json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
    }

    /// Forget the session cookie without logging out.
    pub fn clear_cookie(&mut self) {
        self.cookie = None;
    }
}
