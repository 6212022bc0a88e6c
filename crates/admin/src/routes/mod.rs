//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                  - Liveness
//! GET    /health/ready            - Readiness (content store reachable)
//!
//! # Public
//! GET    /api/content             - Landing page payload (cached)
//!
//! # Auth
//! POST   /api/auth/login          - Username/password login
//! POST   /api/auth/logout         - Logout
//! GET    /api/auth/me             - Current auth state
//!
//! # Sections (admin)
//! GET    /api/sections            - All sections
//! GET    /api/sections/{key}      - One section
//! PUT    /api/sections/{key}      - Replace section content
//!
//! # Features (admin)
//! GET    /api/features            - Ordered list
//! POST   /api/features            - Create at end
//! PATCH  /api/features/{id}       - Partial update
//! DELETE /api/features/{id}       - Delete
//! POST   /api/features/reorder    - Drag from/to
//! GET    /api/features/icons      - Icon picker options
//!
//! # Products (admin)
//! GET    /api/products            - Ordered list
//! POST   /api/products            - Create at end
//! PATCH  /api/products/{id}       - Partial update
//! DELETE /api/products/{id}       - Delete
//! POST   /api/products/reorder    - Drag from/to
//! ```

pub mod auth;
pub mod collection;
pub mod content;
pub mod features;
pub mod health;
pub mod products;
pub mod sections;

use std::time::Duration;

use axum::Router;
use axum::http::{Request, Response};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::create_session_layer;
use crate::state::AppState;

/// All routes, without middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(content::router())
        .merge(auth::router())
        .merge(sections::router())
        .merge(features::router())
        .merge(products::router())
}

/// The complete application: routes, sessions, tracing and Sentry.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    routes()
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
