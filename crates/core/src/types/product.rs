//! Products shown in the landing page showcase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::id::ProductId;
use super::position::Position;
use crate::forms::ProductForm;
use crate::ordering::OrderedEntity;
use crate::validation::{self, ValidationError};

/// A showcased product (`products` row).
///
/// `features` is a text array column, not a relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub features: Vec<String>,
    pub position: Position,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field values for a new product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Partial update of a product.
///
/// `image_url` distinguishes "leave alone" (`None`) from "clear"
/// (`Some(None)`, sent as JSON `null`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "super::double_option"
    )]
    pub image_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Trim feature bullet points and drop blank ones.
#[must_use]
pub fn clean_features(features: &[String]) -> Vec<String> {
    features
        .iter()
        .filter_map(|f| validation::optional_text(f))
        .collect()
}

impl OrderedEntity for Product {
    type Id = ProductId;
    type New = NewProduct;
    type Patch = ProductPatch;
    type Form = ProductForm;

    const KIND: &'static str = "product";

    fn id(&self) -> ProductId {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    fn from_new(id: ProductId, new: NewProduct, position: Position, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title,
            description: new.description,
            image_url: new.image_url,
            features: new.features,
            position,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &ProductPatch, now: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(description) = &patch.description {
            self.description.clone_from(description);
        }
        if let Some(image_url) = &patch.image_url {
            self.image_url.clone_from(image_url);
        }
        if let Some(features) = &patch.features {
            self.features.clone_from(features);
        }
        self.updated_at = now;
    }

    fn validate_patch(patch: ProductPatch) -> Result<ProductPatch, ValidationError> {
        Ok(ProductPatch {
            title: patch.title.as_deref().map(validation::title).transpose()?,
            description: patch.description.map(|d| d.trim().to_owned()),
            image_url: patch
                .image_url
                .map(|url| url.as_deref().and_then(validation::optional_text)),
            features: patch.features.as_deref().map(clean_features),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_null_features_load_as_empty() {
        let json = r#"{
            "id": "0b8f7c4e-2f55-4d1b-9a51-7c3f0b2e9d11",
            "title": "Starter",
            "description": "Entry plan",
            "image_url": null,
            "features": null,
            "position": 1,
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert!(product.features.is_empty());
    }

    #[test]
    fn test_patch_distinguishes_clear_from_absent() {
        let absent: ProductPatch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.image_url, None);

        let cleared: ProductPatch = serde_json::from_str(r#"{"image_url":null}"#).unwrap();
        assert_eq!(cleared.image_url, Some(None));
        assert_eq!(
            serde_json::to_string(&cleared).unwrap(),
            r#"{"image_url":null}"#
        );
    }

    #[test]
    fn test_validate_patch_cleans_features_and_blank_url() {
        let patch = ProductPatch {
            image_url: Some(Some("  ".to_owned())),
            features: Some(vec![" Fast ".to_owned(), String::new()]),
            ..ProductPatch::default()
        };
        let patch = Product::validate_patch(patch).unwrap();
        assert_eq!(patch.image_url, Some(None));
        assert_eq!(patch.features, Some(vec!["Fast".to_owned()]));
    }
}
