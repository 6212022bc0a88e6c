//! Product showcase routes.

use axum::{
    Router,
    routing::{get, patch, post},
};

use landing_cms_core::Product;

use super::collection;
use crate::state::AppState;

/// Build the product router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/products",
            get(collection::list::<Product>).post(collection::create::<Product>),
        )
        .route(
            "/api/products/{id}",
            patch(collection::update::<Product>).delete(collection::delete::<Product>),
        )
        .route("/api/products/reorder", post(collection::reorder::<Product>))
}
