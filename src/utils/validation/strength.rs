//! Composite password strength rules.
//!
//! Unlike the other rules, a strength check reports every unmet condition at
//! once: the messages of the failing conditions are joined with a space.

use once_cell::sync::Lazy;
use regex::Regex;

use super::constants::{MIN_PASSWORD_LENGTH, PASSWORD_SPECIAL_CHARS};

static DIGIT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d").expect("Failed to compile digit regex"));
static LETTER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z]").expect("Failed to compile letter regex"));
static UPPERCASE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Z]").expect("Failed to compile uppercase regex"));
static LOWERCASE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z]").expect("Failed to compile lowercase regex"));

/// Which classes of characters a password has to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicy {
    /// At least eight characters with a letter and a digit (sign-up).
    Basic,
    /// At least eight characters with an uppercase letter, a lowercase
    /// letter, a digit and one of `@$!%*?&`.
    Strict,
}

impl PasswordPolicy {
    /// Returns the message of every unmet condition, in a fixed order.
    pub fn unmet(&self, password: &str) -> Vec<&'static str> {
        let mut messages = Vec::new();

        if password.chars().count() < MIN_PASSWORD_LENGTH {
            messages.push("At least eight characters.");
        }

        match self {
            PasswordPolicy::Basic => {
                if !LETTER_REGEX.is_match(password) {
                    messages.push("At least one letter.");
                }
                if !DIGIT_REGEX.is_match(password) {
                    messages.push("At least one number.");
                }
            }
            PasswordPolicy::Strict => {
                if !UPPERCASE_REGEX.is_match(password) {
                    messages.push("At least one uppercase letter.");
                }
                if !LOWERCASE_REGEX.is_match(password) {
                    messages.push("At least one lowercase letter.");
                }
                if !DIGIT_REGEX.is_match(password) {
                    messages.push("At least one number.");
                }
                if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
                    messages.push("At least one special character (@, $, !, etc.).");
                }
            }
        }

        messages
    }

    /// Space separated message for the unmet conditions, `None` when the
    /// password satisfies the policy.
    pub fn check(&self, password: &str) -> Option<String> {
        let unmet = self.unmet(password);
        if unmet.is_empty() {
            None
        } else {
            Some(unmet.join(" "))
        }
    }
}
