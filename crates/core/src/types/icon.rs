//! Icons available to feature cards.
//!
//! The landing page front end ships a fixed icon set. Stored names that no
//! longer match a known icon fall back to [`FeatureIcon::default`] so the card
//! still renders.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::validation::ValidationError;

/// A known feature-card icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum FeatureIcon {
    #[default]
    Users,
    Check,
    Zap,
    Clock,
    BarChart,
    Shield,
}

impl FeatureIcon {
    /// Every icon, in picker order.
    pub const ALL: [Self; 6] = [
        Self::Users,
        Self::Check,
        Self::Zap,
        Self::Clock,
        Self::BarChart,
        Self::Shield,
    ];

    /// Name stored in the `icon` column.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Users => "Users",
            Self::Check => "Check",
            Self::Zap => "Zap",
            Self::Clock => "Clock",
            Self::BarChart => "BarChart",
            Self::Shield => "Shield",
        }
    }

    /// Glyph reference in the front end's icon set.
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Check => "check",
            Self::Zap => "zap",
            Self::Clock => "clock",
            Self::BarChart => "bar-chart",
            Self::Shield => "shield",
        }
    }

    /// Resolve a stored name, falling back to the default icon.
    #[must_use]
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!(icon = %name, fallback = %Self::default(), "Unknown feature icon");
            Self::default()
        })
    }
}

impl fmt::Display for FeatureIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FeatureIcon {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|icon| icon.name() == s)
            .ok_or_else(|| ValidationError::UnknownIcon(s.to_owned()))
    }
}

// Lenient on read: rows written by older front ends may carry retired names.
impl<'de> Deserialize<'de> for FeatureIcon {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name_or_default(&name))
    }
}

/// Strict deserializer for client input: unknown names are rejected.
///
/// # Errors
///
/// Returns a deserialization error naming the unknown icon.
pub fn deserialize_strict<'de, D>(deserializer: D) -> Result<FeatureIcon, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    name.parse().map_err(serde::de::Error::custom)
}

/// Strict deserializer for an optional icon field.
///
/// # Errors
///
/// Returns a deserialization error naming the unknown icon.
pub fn deserialize_strict_option<'de, D>(deserializer: D) -> Result<Option<FeatureIcon>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|name| name.parse().map_err(serde::de::Error::custom))
        .transpose()
}

/// Picker entry describing one icon.
#[derive(Debug, Clone, Serialize)]
pub struct IconOption {
    pub name: &'static str,
    pub glyph: &'static str,
}

impl From<FeatureIcon> for IconOption {
    fn from(icon: FeatureIcon) -> Self {
        Self {
            name: icon.name(),
            glyph: icon.glyph(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_names() {
        for icon in FeatureIcon::ALL {
            assert_eq!(icon.name().parse::<FeatureIcon>().unwrap(), icon);
        }
    }

    #[test]
    fn test_parse_unknown_name_is_error() {
        assert_eq!(
            "Rocket".parse::<FeatureIcon>(),
            Err(ValidationError::UnknownIcon("Rocket".to_owned()))
        );
    }

    #[test]
    fn test_deserialize_unknown_falls_back() {
        let icon: FeatureIcon = serde_json::from_str("\"Rocket\"").unwrap();
        assert_eq!(icon, FeatureIcon::Users);
    }

    #[test]
    fn test_strict_deserializer_rejects_unknown() {
        #[derive(Deserialize)]
        struct Input {
            #[serde(deserialize_with = "deserialize_strict")]
            #[allow(dead_code)]
            icon: FeatureIcon,
        }

        assert!(serde_json::from_str::<Input>(r#"{"icon":"Zap"}"#).is_ok());
        assert!(serde_json::from_str::<Input>(r#"{"icon":"Rocket"}"#).is_err());
    }

    #[test]
    fn test_serialize_uses_stored_name() {
        assert_eq!(
            serde_json::to_string(&FeatureIcon::BarChart).unwrap(),
            "\"BarChart\""
        );
        assert_eq!(FeatureIcon::BarChart.glyph(), "bar-chart");
    }
}
