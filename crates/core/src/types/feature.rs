//! Marketing feature cards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::icon::{self, FeatureIcon};
use super::id::FeatureId;
use super::position::Position;
use crate::forms::FeatureForm;
use crate::ordering::OrderedEntity;
use crate::validation::{self, ValidationError};

/// A feature card (`features` row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub id: FeatureId,
    pub title: String,
    pub description: String,
    pub icon: FeatureIcon,
    pub position: Position,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field values for a new feature card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFeature {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "icon::deserialize_strict")]
    pub icon: FeatureIcon,
}

/// Partial update of a feature card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "icon::deserialize_strict_option"
    )]
    pub icon: Option<FeatureIcon>,
}

impl OrderedEntity for Feature {
    type Id = FeatureId;
    type New = NewFeature;
    type Patch = FeaturePatch;
    type Form = FeatureForm;

    const KIND: &'static str = "feature";

    fn id(&self) -> FeatureId {
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

    fn from_new(id: FeatureId, new: NewFeature, position: Position, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title,
            description: new.description,
            icon: new.icon,
            position,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &FeaturePatch, now: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(description) = &patch.description {
            self.description.clone_from(description);
        }
        if let Some(icon) = patch.icon {
            self.icon = icon;
        }
        self.updated_at = now;
    }

    fn validate_patch(patch: FeaturePatch) -> Result<FeaturePatch, ValidationError> {
        Ok(FeaturePatch {
            title: patch.title.as_deref().map(validation::title).transpose()?,
            description: patch.description.map(|d| d.trim().to_owned()),
            icon: patch.icon,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_skips_absent_fields_on_the_wire() {
        let patch = FeaturePatch {
            icon: Some(FeatureIcon::Zap),
            ..FeaturePatch::default()
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"icon":"Zap"}"#);
    }

    #[test]
    fn test_patch_rejects_unknown_icon() {
        assert!(serde_json::from_str::<FeaturePatch>(r#"{"icon":"Rocket"}"#).is_err());
    }

    #[test]
    fn test_validate_patch_rejects_blank_title() {
        let patch = FeaturePatch {
            title: Some("  ".to_owned()),
            ..FeaturePatch::default()
        };
        assert!(Feature::validate_patch(patch).is_err());
    }

    #[test]
    fn test_apply_patch_leaves_absent_fields() {
        let now = Utc::now();
        let mut feature = Feature::from_new(
            FeatureId::generate(),
            NewFeature {
                title: "Speed".to_owned(),
                description: "Fast".to_owned(),
                icon: FeatureIcon::Zap,
            },
            Position::new(6),
            now,
        );
        feature.apply_patch(
            &FeaturePatch {
                title: Some("Velocity".to_owned()),
                ..FeaturePatch::default()
            },
            now,
        );

        assert_eq!(feature.title, "Velocity");
        assert_eq!(feature.description, "Fast");
        assert_eq!(feature.icon, FeatureIcon::Zap);
        assert_eq!(feature.position, Position::new(6));
    }

    #[test]
    fn test_row_with_retired_icon_still_loads() {
        let json = r#"{
            "id": "6f1c2b0e-6a0e-4c43-9d5c-4b8f1b6f2a10",
            "title": "Legacy",
            "description": "",
            "icon": "Rocket",
            "position": 1,
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z"
        }"#;
        let feature: Feature = serde_json::from_str(json).unwrap();
        assert_eq!(feature.icon, FeatureIcon::Users);
    }
}
