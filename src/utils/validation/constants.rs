//! Constants used throughout the validation system

/// Minimum length of any account password
pub const MIN_PASSWORD_LENGTH: usize = 8;
/// Characters accepted as "special" by the strict password policy
pub const PASSWORD_SPECIAL_CHARS: &str = "@$!%*?&";
/// Maximum length for short-form content (names, forum messages)
pub const MAX_SHORT_CONTENT_LENGTH: usize = 250;
/// Maximum length of an email address
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Shape `local@domain.tld`, no whitespace and a single `@`
pub const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
/// Calendar date as submitted by `<input type="date">`
pub const DATE_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}$";
/// Loose international phone number
pub const PHONE_PATTERN: &str = r"^\+?[0-9 ()-]{7,20}$";
/// ABO group with rhesus factor
pub const BLOOD_GROUP_PATTERN: &str = r"^(A|B|AB|O)[+-]$";
