//! Provides a safe free-text representation.
//!
//! Free text (forum messages, names shown to other users) is normalized to
//! NFKC first, then trimmed, length checked and rejected when it holds
//! control characters or HTML. Every check sees the stored form.

use std::fmt;

use ammonia::is_html;
use serde::Serialize;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use validator::ValidateNonControlCharacter;

use crate::utils::validation::MAX_SHORT_CONTENT_LENGTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TextError {
    #[error("Message cannot be empty.")]
    Empty,
    #[error("Message exceeds maximum length of {0} characters.")]
    TooLong(usize),
    #[error("Message contains invalid control characters.")]
    ControlCharacters,
    #[error("Message cannot contain HTML.")]
    Html,
}

/// Text that passed validation and can be stored and displayed as is.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TextInput {
    text_content: String,
}

impl TextInput {
    /// Validates short text, up to `MAX_SHORT_CONTENT_LENGTH` characters.
    pub fn new_short_form(content: &str) -> Result<Self, TextError> {
        Self::new(content, MAX_SHORT_CONTENT_LENGTH)
    }

    fn new(content: &str, max_length: usize) -> Result<Self, TextError> {
        let normalized: String = content.nfkc().collect();
        let trimmed = normalized.trim();

        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }

        if trimmed.chars().count() > max_length {
            return Err(TextError::TooLong(max_length));
        }

        if !trimmed.validate_non_control_character() {
            return Err(TextError::ControlCharacters);
        }

        if is_html(trimmed) {
            return Err(TextError::Html);
        }

        Ok(Self {
            text_content: trimmed.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text_content
    }

    pub fn into_inner(self) -> String {
        self.text_content
    }
}

impl fmt::Display for TextInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text_content)
    }
}

impl AsRef<str> for TextInput {
    fn as_ref(&self) -> &str {
        &self.text_content
    }
}
