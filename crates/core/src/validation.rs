//! Input validation shared by edit forms and API payloads.

use thiserror::Error;

/// Maximum length of a title field.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Errors produced when editor input is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required text field was empty or whitespace.
    #[error("{field} is required")]
    Required {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A text field exceeded its maximum length.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Name of the offending field.
        field: &'static str,
        /// Maximum allowed length.
        max: usize,
    },

    /// A section key did not match the allowed format.
    #[error("invalid section key '{0}': use lowercase letters, digits, '-' or '_'")]
    InvalidSectionKey(String),

    /// An icon name is not one of the known icons.
    #[error("unknown icon '{0}'")]
    UnknownIcon(String),
}

/// Trim a required text field, rejecting blank input.
///
/// # Errors
///
/// Returns [`ValidationError::Required`] if the trimmed value is empty.
pub fn required_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(trimmed.to_owned())
}

/// Trim a required title, enforcing [`MAX_TITLE_LENGTH`].
///
/// # Errors
///
/// Returns an error if the title is blank or too long.
pub fn title(value: &str) -> Result<String, ValidationError> {
    let title = required_text("title", value)?;
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "title",
            max: MAX_TITLE_LENGTH,
        });
    }
    Ok(title)
}

/// Normalize an optional text field: blank input becomes `None`.
#[must_use]
pub fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_trims() {
        assert_eq!(required_text("title", "  Speed ").as_deref(), Ok("Speed"));
    }

    #[test]
    fn test_required_text_rejects_blank() {
        assert_eq!(
            required_text("title", "   "),
            Err(ValidationError::Required { field: "title" })
        );
    }

    #[test]
    fn test_title_too_long() {
        let long = "x".repeat(MAX_TITLE_LENGTH + 1);
        assert!(matches!(title(&long), Err(ValidationError::TooLong { .. })));
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(""), None);
        assert_eq!(optional_text("  \n"), None);
        assert_eq!(optional_text(" a "), Some("a".to_owned()));
    }
}
