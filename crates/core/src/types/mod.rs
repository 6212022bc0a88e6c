//! Core types for Landing CMS.
//!
//! This module provides the domain model mirrored from the hosted backend's
//! `page_content`, `products` and `features` tables.

pub mod auth;
pub mod feature;
pub mod icon;
pub mod id;
pub mod landing;
pub mod position;
pub mod product;
pub mod section;

pub use auth::AdminAuth;
pub use feature::{Feature, FeaturePatch, NewFeature};
pub use icon::{FeatureIcon, IconOption};
pub use id::*;
pub use landing::LandingContent;
pub use position::Position;
pub use product::{NewProduct, Product, ProductPatch};
pub use section::{PageSection, SectionKey, SectionUpdate};

use serde::{Deserialize, Deserializer};

/// Deserialize a present field (including `null`) as `Some(..)`.
///
/// Combined with `#[serde(default)]` this separates an absent field (`None`)
/// from an explicit `null` (`Some(None)`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
