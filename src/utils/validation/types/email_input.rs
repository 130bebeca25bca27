//! Represents a normalized email address.
//!
//! Account emails are compared after normalization, so that `Ada@Example.com`
//! and `ada@example.com ` designate the same account.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::validation::{EMAIL_PATTERN, MAX_EMAIL_LENGTH};

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(EMAIL_PATTERN).expect("Failed to compile email regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EmailError {
    #[error("Email address cannot be empty")]
    Empty,
    #[error("Email address exceeds maximum length of 254 characters")]
    TooLong,
    #[error("Invalid email format")]
    Format,
}

/// A trimmed, lowercased email address of the shape `local@domain.tld`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailInput {
    email: String,
}

impl EmailInput {
    /// Creates a new `EmailInput` after validating the provided email string.
    ///
    /// # Example
    /// ```
    /// use bloodbridge::utils::validation::EmailInput;
    ///
    /// let email = EmailInput::new("  Ada@Example.com ").unwrap();
    /// assert_eq!(email.as_str(), "ada@example.com");
    /// assert!(EmailInput::new("not-an-email").is_err());
    /// ```
    pub fn new(email: &str) -> Result<Self, EmailError> {
        let email_trimmed = email.trim();

        if email_trimmed.is_empty() {
            return Err(EmailError::Empty);
        }

        if email_trimmed.len() > MAX_EMAIL_LENGTH {
            return Err(EmailError::TooLong);
        }

        if !EMAIL_REGEX.is_match(email_trimmed) {
            return Err(EmailError::Format);
        }

        Ok(Self {
            email: email_trimmed.to_lowercase(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.email
    }
}

impl TryFrom<String> for EmailInput {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<EmailInput> for String {
    fn from(value: EmailInput) -> Self {
        value.email
    }
}

impl fmt::Display for EmailInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.email)
    }
}

impl AsRef<str> for EmailInput {
    fn as_ref(&self) -> &str {
        &self.email
    }
}
