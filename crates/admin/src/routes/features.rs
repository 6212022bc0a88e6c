//! Feature card routes.

use axum::{
    Json, Router,
    routing::{get, patch, post},
};

use landing_cms_core::{Feature, FeatureIcon, IconOption};

use super::collection;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Build the feature card router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/features",
            get(collection::list::<Feature>).post(collection::create::<Feature>),
        )
        .route(
            "/api/features/{id}",
            patch(collection::update::<Feature>).delete(collection::delete::<Feature>),
        )
        .route("/api/features/reorder", post(collection::reorder::<Feature>))
        .route("/api/features/icons", get(icons))
}

/// Icons an editor may pick from, in menu order.
pub async fn icons(RequireAdminAuth(_admin): RequireAdminAuth) -> Json<Vec<IconOption>> {
    Json(FeatureIcon::ALL.into_iter().map(IconOption::from).collect())
}
