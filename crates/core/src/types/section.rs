//! Fixed landing page sections.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::PageContentId;
use crate::validation::ValidationError;

/// Identifier of a fixed landing page region (`hero`, `about`, ...).
///
/// ## Constraints
///
/// - Length: 1-64 characters
/// - Lowercase ASCII letters, digits, `-` and `_` only
///
/// ```
/// use landing_cms_core::SectionKey;
///
/// assert!(SectionKey::parse("hero").is_ok());
/// assert!(SectionKey::parse("call_to-action2").is_ok());
/// assert!(SectionKey::parse("Hero").is_err());
/// assert!(SectionKey::parse("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SectionKey(String);

impl SectionKey {
    /// Maximum key length.
    pub const MAX_LENGTH: usize = 64;

    /// Parse and validate a section key.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidSectionKey`] if the key is empty, too
    /// long, or contains characters outside `[a-z0-9_-]`.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let valid = !s.is_empty()
            && s.len() <= Self::MAX_LENGTH
            && s.bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_');
        if !valid {
            return Err(ValidationError::InvalidSectionKey(s.to_owned()));
        }
        Ok(Self(s.to_owned()))
    }

    /// The hero banner at the top of the page.
    #[must_use]
    pub fn hero() -> Self {
        Self("hero".to_owned())
    }

    /// The "about us" block.
    #[must_use]
    pub fn about() -> Self {
        Self("about".to_owned())
    }

    /// Heading of the product showcase.
    #[must_use]
    pub fn products() -> Self {
        Self("products".to_owned())
    }

    /// Heading of the feature grid.
    #[must_use]
    pub fn features() -> Self {
        Self("features".to_owned())
    }

    /// Get the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human readable label ("hero" -> "Hero").
    #[must_use]
    pub fn label(&self) -> String {
        let mut chars = self.0.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
        })
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SectionKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SectionKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SectionKey> for String {
    fn from(key: SectionKey) -> Self {
        key.0
    }
}

/// Editable content of one landing page section (`page_content` row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSection {
    pub id: PageContentId,
    pub section_id: SectionKey,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Replacement values for a section. Always scoped to one section key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionUpdate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl SectionUpdate {
    /// Check the update before it is sent anywhere.
    ///
    /// # Errors
    ///
    /// Returns an error if the title is blank or too long.
    pub fn validated(self) -> Result<Self, ValidationError> {
        Ok(Self {
            title: crate::validation::title(&self.title)?,
            description: self
                .description
                .as_deref()
                .and_then(crate::validation::optional_text),
            image_url: self
                .image_url
                .as_deref()
                .and_then(crate::validation::optional_text),
        })
    }
}

impl PageSection {
    /// Apply an update in place.
    pub fn apply(&mut self, update: &SectionUpdate, now: DateTime<Utc>) {
        self.title.clone_from(&update.title);
        self.description.clone_from(&update.description);
        self.image_url.clone_from(&update.image_url);
        self.updated_at = now;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_section_key_rejects_bad_input() {
        assert!(SectionKey::parse("").is_err());
        assert!(SectionKey::parse("has space").is_err());
        assert!(SectionKey::parse("UPPER").is_err());
        assert!(SectionKey::parse(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_section_key_deserialize_validates() {
        assert!(serde_json::from_str::<SectionKey>("\"about\"").is_ok());
        assert!(serde_json::from_str::<SectionKey>("\"../etc\"").is_err());
    }

    #[test]
    fn test_label() {
        assert_eq!(SectionKey::hero().label(), "Hero");
    }

    #[test]
    fn test_update_validated_normalizes_blanks() {
        let update = SectionUpdate {
            title: "  Welcome ".to_owned(),
            description: Some("   ".to_owned()),
            image_url: Some("https://cdn.example.com/hero.jpg".to_owned()),
        }
        .validated()
        .unwrap();

        assert_eq!(update.title, "Welcome");
        assert_eq!(update.description, None);
        assert_eq!(
            update.image_url.as_deref(),
            Some("https://cdn.example.com/hero.jpg")
        );
    }

    #[test]
    fn test_update_requires_title() {
        let update = SectionUpdate {
            title: String::new(),
            description: None,
            image_url: None,
        };
        assert!(update.validated().is_err());
    }
}
