//! Edit form state for the admin editors.
//!
//! A form starts out empty (its `Default`), is populated when an entity is
//! selected, and is reset when the editor is cancelled or a write succeeds.

use serde::{Deserialize, Serialize};

use crate::ordering::EditForm;
use crate::types::icon::{self, FeatureIcon};
use crate::types::product::clean_features;
use crate::types::{
    Feature, FeaturePatch, NewFeature, NewProduct, PageSection, Product, ProductPatch,
    SectionUpdate,
};
use crate::validation::{self, ValidationError};

/// Form backing the feature card editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "icon::deserialize_strict")]
    pub icon: FeatureIcon,
}

impl EditForm<Feature> for FeatureForm {
    fn from_entity(feature: &Feature) -> Self {
        Self {
            title: feature.title.clone(),
            description: feature.description.clone(),
            icon: feature.icon,
        }
    }

    fn to_new(&self) -> Result<NewFeature, ValidationError> {
        Ok(NewFeature {
            title: validation::title(&self.title)?,
            description: self.description.trim().to_owned(),
            icon: self.icon,
        })
    }

    fn to_patch(&self) -> Result<FeaturePatch, ValidationError> {
        let new = self.to_new()?;
        Ok(FeaturePatch {
            title: Some(new.title),
            description: Some(new.description),
            icon: Some(new.icon),
        })
    }
}

/// Form backing the product editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub features: Vec<String>,
}

impl ProductForm {
    /// Append a feature bullet point. Blank input is ignored.
    ///
    /// Returns whether a bullet was added.
    pub fn add_feature(&mut self, text: &str) -> bool {
        match validation::optional_text(text) {
            Some(feature) => {
                self.features.push(feature);
                true
            }
            None => false,
        }
    }

    /// Remove the bullet at `index`. Out-of-range indices are ignored.
    pub fn remove_feature(&mut self, index: usize) -> Option<String> {
        (index < self.features.len()).then(|| self.features.remove(index))
    }
}

impl EditForm<Product> for ProductForm {
    fn from_entity(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone(),
            image_url: product.image_url.clone().unwrap_or_default(),
            features: product.features.clone(),
        }
    }

    fn to_new(&self) -> Result<NewProduct, ValidationError> {
        Ok(NewProduct {
            title: validation::title(&self.title)?,
            description: self.description.trim().to_owned(),
            image_url: validation::optional_text(&self.image_url),
            features: clean_features(&self.features),
        })
    }

    fn to_patch(&self) -> Result<ProductPatch, ValidationError> {
        let new = self.to_new()?;
        Ok(ProductPatch {
            title: Some(new.title),
            description: Some(new.description),
            image_url: Some(new.image_url),
            features: Some(new.features),
        })
    }
}

/// Form backing the section editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
}

impl SectionForm {
    /// Populate the form from a section row.
    #[must_use]
    pub fn from_section(section: &PageSection) -> Self {
        Self {
            title: section.title.clone(),
            description: section.description.clone().unwrap_or_default(),
            image_url: section.image_url.clone().unwrap_or_default(),
        }
    }

    /// Convert to a section update.
    ///
    /// # Errors
    ///
    /// Returns an error if the title is blank or too long.
    pub fn to_update(&self) -> Result<SectionUpdate, ValidationError> {
        SectionUpdate {
            title: self.title.clone(),
            description: Some(self.description.clone()),
            image_url: Some(self.image_url.clone()),
        }
        .validated()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_form_default_icon() {
        let form = FeatureForm::default();
        assert_eq!(form.icon, FeatureIcon::Users);
        assert!(form.title.is_empty());
    }

    #[test]
    fn test_feature_form_to_new() {
        let form = FeatureForm {
            title: " Speed ".to_owned(),
            description: "Pages load fast".to_owned(),
            icon: FeatureIcon::Zap,
        };
        let new = form.to_new().unwrap();
        assert_eq!(new.title, "Speed");
        assert_eq!(new.icon, FeatureIcon::Zap);
    }

    #[test]
    fn test_feature_form_requires_title() {
        assert_eq!(
            FeatureForm::default().to_new(),
            Err(ValidationError::Required { field: "title" })
        );
    }

    #[test]
    fn test_product_form_feature_list() {
        let mut form = ProductForm::default();
        assert!(form.add_feature("  Unlimited users "));
        assert!(!form.add_feature("   "));
        assert!(form.add_feature("24/7 support"));
        assert_eq!(form.features, ["Unlimited users", "24/7 support"]);

        assert_eq!(form.remove_feature(5), None);
        assert_eq!(form.remove_feature(0).as_deref(), Some("Unlimited users"));
        assert_eq!(form.features, ["24/7 support"]);
    }

    #[test]
    fn test_product_form_blank_image_becomes_none() {
        let form = ProductForm {
            title: "Starter".to_owned(),
            ..ProductForm::default()
        };
        assert_eq!(form.to_new().unwrap().image_url, None);
        assert_eq!(form.to_patch().unwrap().image_url, Some(None));
    }

    #[test]
    fn test_section_form_to_update() {
        let form = SectionForm {
            title: "X".to_owned(),
            description: String::new(),
            image_url: String::new(),
        };
        let update = form.to_update().unwrap();
        assert_eq!(update.title, "X");
        assert_eq!(update.description, None);
    }
}
