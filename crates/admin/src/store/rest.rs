//! REST client for the hosted content backend.
//!
//! The backend exposes each table through a PostgREST-style API:
//!
//! - Base URL: `{BACKEND_URL}/rest/v1/`
//! - Authentication: `apikey: <key>` plus `Authorization: Bearer <key>`
//! - Filters in the query string (`id=eq.<uuid>`, `order=position.asc`)
//! - Single-row responses via `Accept: application/vnd.pgrst.object+json`
//! - Stored functions at `rpc/<name>`

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use landing_cms_core::{
    Feature, OrderedEntity, PageContentId, PageSection, Position, Product, SectionKey,
    SectionUpdate,
};

use super::{CollectionStore, SectionStore, StoreError};
use crate::config::RestBackendConfig;
use crate::services::auth::Authenticator;

/// Path of the REST API below the project URL.
const REST_PATH: &str = "rest/v1/";

/// Media type asking for a single JSON object instead of an array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Error code returned when a single-object request matched no rows.
const NO_ROWS_CODE: &str = "PGRST116";

/// Postgres unique violation.
const UNIQUE_VIOLATION_CODE: &str = "23505";

/// Section table name.
const SECTIONS_TABLE: &str = "page_content";

/// Tables that map onto a [`CollectionStore`].
pub trait RestEntity: OrderedEntity + DeserializeOwned {
    /// Table name.
    const TABLE: &'static str;
    /// Stored function that rewrites all positions in one statement.
    const REORDER_FUNCTION: &'static str;
}

impl RestEntity for Product {
    const TABLE: &'static str = "products";
    const REORDER_FUNCTION: &'static str = "reorder_products";
}

impl RestEntity for Feature {
    const TABLE: &'static str = "features";
    const REORDER_FUNCTION: &'static str = "reorder_features";
}

/// Error body returned by the backend.
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

/// Hosted backend client.
#[derive(Clone)]
pub struct RestClient {
    inner: Arc<RestClientInner>,
}

struct RestClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl RestClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &RestBackendConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();

        let key = config.api_key.expose_secret();
        headers.insert(
            "apikey",
            HeaderValue::from_str(key)
                .map_err(|e| StoreError::Parse(format!("Invalid API key format: {e}")))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| StoreError::Parse(format!("Invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(RestClientInner {
                client,
                base_url: rest_base_url(&config.url)?,
            }),
        })
    }

    /// Build a URL for `path` below the REST root with query pairs appended.
    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, StoreError> {
        let mut url = self
            .inner
            .base_url
            .join(path)
            .map_err(|e| StoreError::Parse(format!("Invalid request path {path}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Send a request and parse the JSON body.
    async fn fetch<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, StoreError> {
        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// Send a request and discard the body.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<(), StoreError> {
        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(self.parse_error(response).await)
    }

    /// Call a stored function.
    pub(crate) async fn rpc<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        function: &str,
        body: &B,
    ) -> Result<T, StoreError> {
        let url = self.url(&format!("rpc/{function}"), &[])?;
        self.fetch(self.inner.client.post(url).json(body)).await
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, StoreError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| StoreError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(self.parse_error(response).await)
    }

    /// Parse error response from the backend.
    async fn parse_error(&self, response: reqwest::Response) -> StoreError {
        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return StoreError::RateLimited(retry_after);
        }

        if status == 401 || status == 403 {
            return StoreError::Unauthorized;
        }

        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        classify_error(status, &text)
    }
}

/// Map a non-success status and body onto a [`StoreError`].
fn classify_error(status: u16, text: &str) -> StoreError {
    let body: ApiErrorBody = serde_json::from_str(text).unwrap_or_default();
    let message = match (&body.message, &body.details) {
        (Some(message), Some(details)) => format!("{message}: {details}"),
        (Some(message), None) => message.clone(),
        _ => text.to_string(),
    };

    match body.code.as_deref() {
        Some(NO_ROWS_CODE) => return StoreError::NotFound(message),
        Some(UNIQUE_VIOLATION_CODE) => return StoreError::Conflict(message),
        _ => {}
    }

    match status {
        404 => StoreError::NotFound(message),
        409 => StoreError::Conflict(message),
        _ => StoreError::Api { status, message },
    }
}

/// Normalize the configured project URL to the REST root.
fn rest_base_url(project_url: &Url) -> Result<Url, StoreError> {
    let mut base = project_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(REST_PATH)
        .map_err(|e| StoreError::Parse(format!("Invalid backend URL: {e}")))
}

fn eq_filter(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Sections
// =============================================================================

/// `page_content` row as stored; keys are validated after the fetch so one
/// bad row cannot fail the whole list.
#[derive(Deserialize)]
struct SectionRecord {
    id: PageContentId,
    section_id: String,
    title: String,
    description: Option<String>,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SectionRecord {
    fn into_section(self) -> Option<PageSection> {
        match SectionKey::parse(&self.section_id) {
            Ok(section_id) => Some(PageSection {
                id: self.id,
                section_id,
                title: self.title,
                description: self.description,
                image_url: self.image_url,
                created_at: self.created_at,
                updated_at: self.updated_at,
            }),
            Err(error) => {
                tracing::warn!(id = %self.id, %error, "Skipping section with invalid key");
                None
            }
        }
    }
}

/// Row body for section upserts.
#[derive(Serialize)]
struct SectionRow<'a> {
    section_id: &'a SectionKey,
    #[serde(flatten)]
    content: &'a SectionUpdate,
}

#[async_trait]
impl SectionStore for RestClient {
    async fn list_sections(&self) -> Result<Vec<PageSection>, StoreError> {
        let url = self.url(
            SECTIONS_TABLE,
            &[("select", "*"), ("order", "section_id.asc")],
        )?;
        let records: Vec<SectionRecord> = self.fetch(self.inner.client.get(url)).await?;
        Ok(records
            .into_iter()
            .filter_map(SectionRecord::into_section)
            .collect())
    }

    async fn update_section(
        &self,
        key: &SectionKey,
        update: &SectionUpdate,
    ) -> Result<PageSection, StoreError> {
        let filter = eq_filter(key);
        let url = self.url(
            SECTIONS_TABLE,
            &[("section_id", filter.as_str()), ("select", "*")],
        )?;
        let request = self
            .inner
            .client
            .patch(url)
            .header("Prefer", "return=representation")
            .header(ACCEPT, SINGLE_OBJECT)
            .json(update);
        self.fetch(request).await
    }

    async fn upsert_section(
        &self,
        key: &SectionKey,
        update: &SectionUpdate,
    ) -> Result<PageSection, StoreError> {
        let url = self.url(
            SECTIONS_TABLE,
            &[("on_conflict", "section_id"), ("select", "*")],
        )?;
        let request = self
            .inner
            .client
            .post(url)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .header(ACCEPT, SINGLE_OBJECT)
            .json(&SectionRow {
                section_id: key,
                content: update,
            });
        self.fetch(request).await
    }
}

// =============================================================================
// Ordered collections
// =============================================================================

/// Row body for inserts: the entity fields plus the assigned position.
#[derive(Serialize)]
struct InsertRow<'a, N> {
    #[serde(flatten)]
    fields: &'a N,
    position: Position,
}

#[derive(Deserialize)]
struct PositionRow {
    position: Option<Position>,
}

#[derive(Serialize)]
struct ReorderArgs<'a, Id> {
    ordered_ids: &'a [Id],
}

#[async_trait]
impl<E> CollectionStore<E> for RestClient
where
    E: RestEntity,
    E::New: Serialize,
    E::Patch: Serialize,
    E::Id: Serialize,
{
    async fn list(&self) -> Result<Vec<E>, StoreError> {
        let url = self.url(E::TABLE, &[("select", "*"), ("order", "position.asc")])?;
        self.fetch(self.inner.client.get(url)).await
    }

    async fn max_position(&self) -> Result<Option<Position>, StoreError> {
        let url = self.url(
            E::TABLE,
            &[
                ("select", "position"),
                ("order", "position.desc"),
                ("limit", "1"),
            ],
        )?;
        let rows: Vec<PositionRow> = self.fetch(self.inner.client.get(url)).await?;
        Ok(rows.into_iter().next().and_then(|row| row.position))
    }

    async fn insert(&self, new: &E::New, position: Position) -> Result<E, StoreError> {
        let url = self.url(E::TABLE, &[("select", "*")])?;
        let request = self
            .inner
            .client
            .post(url)
            .header("Prefer", "return=representation")
            .header(ACCEPT, SINGLE_OBJECT)
            .json(&InsertRow {
                fields: new,
                position,
            });
        self.fetch(request).await
    }

    async fn update(&self, id: E::Id, patch: &E::Patch) -> Result<E, StoreError> {
        let filter = eq_filter(id);
        let url = self.url(E::TABLE, &[("id", filter.as_str()), ("select", "*")])?;
        let request = self
            .inner
            .client
            .patch(url)
            .header("Prefer", "return=representation")
            .header(ACCEPT, SINGLE_OBJECT)
            .json(patch);
        self.fetch(request).await
    }

    async fn delete(&self, id: E::Id) -> Result<(), StoreError> {
        let filter = eq_filter(id);
        let url = self.url(E::TABLE, &[("id", filter.as_str()), ("select", "id")])?;
        let request = self
            .inner
            .client
            .delete(url)
            .header("Prefer", "return=representation");
        let deleted: Vec<serde_json::Value> = self.fetch(request).await?;
        if deleted.is_empty() {
            return Err(StoreError::NotFound(format!("{} {id}", E::KIND)));
        }
        Ok(())
    }

    async fn write_positions(&self, ordered_ids: &[E::Id]) -> Result<(), StoreError> {
        let url = self.url(&format!("rpc/{}", E::REORDER_FUNCTION), &[])?;
        let request = self
            .inner
            .client
            .post(url)
            .json(&ReorderArgs { ordered_ids });
        self.execute(request).await
    }
}

// =============================================================================
// Admin credentials
// =============================================================================

#[derive(Serialize)]
struct AuthenticateArgs<'a> {
    username_input: &'a str,
    password_input: &'a str,
}

#[async_trait]
impl Authenticator for RestClient {
    async fn verify(&self, username: &str, password: &SecretString) -> Result<bool, StoreError> {
        self.rpc(
            "authenticate_admin",
            &AuthenticateArgs {
                username_input: username,
                password_input: password.expose_secret(),
            },
        )
        .await
    }
}
