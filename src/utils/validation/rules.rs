//! Declarative rules attached to form fields.

use once_cell::sync::Lazy;
use regex::Regex;

use super::constants::{DATE_PATTERN, EMAIL_PATTERN};
use super::strength::PasswordPolicy;
use crate::dom::{Document, Element};

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(EMAIL_PATTERN).expect("Failed to compile email regex"));
static DATE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(DATE_PATTERN).expect("Failed to compile date regex"));

const EMAIL_MESSAGE: &str = "Please enter a valid email address.";
const MISMATCH_MESSAGE: &str = "Passwords do not match.";
const TERMS_MESSAGE: &str = "You must accept the terms and conditions.";
const DATE_MESSAGE: &str = "Please enter a valid date (YYYY-MM-DD).";
const AMOUNT_MESSAGE: &str = "Please enter a valid donation amount.";
const CHOICE_MESSAGE: &str = "Please select a payment method.";

/// How the value of a field is read from its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// The element value with surrounding whitespace removed.
    Trimmed,
    /// The element value as typed (passwords).
    Raw,
    /// The checked state of a checkbox, read as `"true"` or `""`.
    Checked,
}

/// A single predicate with the message shown when it fails.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Non-empty after trimming: "`<label>` is required."
    Required,
    /// The checkbox must be ticked.
    Checked { message: String },
    /// A non-empty value must match `regex`. Emptiness is left to `Required`.
    Pattern { regex: Regex, message: String },
    /// At least this many characters: "Minimum N characters required."
    MinLength(usize),
    /// Equal to the current value of another field.
    Matches { other: String, message: String },
    /// Composite strength check, reports every unmet condition.
    Strength(PasswordPolicy),
    /// A finite number strictly greater than zero. Empty fails.
    Positive { message: String },
    /// One of a fixed set of options. Empty fails.
    OneOf { options: Vec<String>, message: String },
}

impl Rule {
    pub fn email() -> Self {
        Rule::Pattern {
            regex: EMAIL_REGEX.clone(),
            message: EMAIL_MESSAGE.to_string(),
        }
    }

    pub fn date() -> Self {
        Rule::Pattern {
            regex: DATE_REGEX.clone(),
            message: DATE_MESSAGE.to_string(),
        }
    }

    pub fn pattern(pattern: &str, message: &str) -> Result<Self, regex::Error> {
        Ok(Rule::Pattern {
            regex: Regex::new(pattern)?,
            message: message.to_string(),
        })
    }

    /// Equality with `other`, reported as "Passwords do not match."
    pub fn matches(other: &str) -> Self {
        Rule::Matches {
            other: other.to_string(),
            message: MISMATCH_MESSAGE.to_string(),
        }
    }

    /// Donation amount, reported as "Please enter a valid donation amount."
    pub fn positive_amount() -> Self {
        Rule::Positive {
            message: AMOUNT_MESSAGE.to_string(),
        }
    }

    /// Choice among `options`, reported as "Please select a payment method."
    pub fn payment_method(options: &[&str]) -> Self {
        Rule::OneOf {
            options: options.iter().map(|o| o.to_string()).collect(),
            message: CHOICE_MESSAGE.to_string(),
        }
    }

    pub fn terms_accepted() -> Self {
        Rule::Checked {
            message: TERMS_MESSAGE.to_string(),
        }
    }

    /// Evaluates the rule, returning the error message on failure.
    fn failure(&self, field: &FieldRule, value: &str, doc: &Document) -> Option<String> {
        match self {
            Rule::Required => {
                let missing = match field.source {
                    ValueSource::Checked => value.is_empty(),
                    _ => value.trim().is_empty(),
                };
                missing.then(|| format!("{} is required.", field.label))
            }
            Rule::Checked { message } => value.is_empty().then(|| message.clone()),
            Rule::Pattern { regex, message } => {
                (!value.is_empty() && !regex.is_match(value)).then(|| message.clone())
            }
            Rule::MinLength(min) => (value.chars().count() < *min)
                .then(|| format!("Minimum {min} characters required.")),
            Rule::Matches { other, message } => {
                let other_value = doc
                    .element(other)
                    .map(|element| field.source.read(element))
                    .unwrap_or_default();
                (value != other_value).then(|| message.clone())
            }
            Rule::Strength(policy) => policy.check(value),
            Rule::Positive { message } => {
                let positive = value
                    .parse::<f64>()
                    .is_ok_and(|amount| amount.is_finite() && amount > 0.0);
                (!positive).then(|| message.clone())
            }
            Rule::OneOf { options, message } => {
                (!options.iter().any(|option| option == value)).then(|| message.clone())
            }
        }
    }
}

impl ValueSource {
    pub(crate) fn read(&self, element: &Element) -> String {
        match self {
            ValueSource::Trimmed => element.value().trim().to_string(),
            ValueSource::Raw => element.value().to_string(),
            ValueSource::Checked => {
                if element.checked() {
                    "true".to_string()
                } else {
                    String::new()
                }
            }
        }
    }
}

/// Validation rules of one field, evaluated in declaration order.
#[derive(Debug, Clone)]
pub struct FieldRule {
    field: String,
    label: String,
    source: ValueSource,
    rules: Vec<Rule>,
}

impl FieldRule {
    pub fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
            label: field.to_string(),
            source: ValueSource::Trimmed,
            rules: Vec::new(),
        }
    }

    /// Human readable name used in the "is required" message.
    pub fn label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn source(mut self, source: ValueSource) -> Self {
        self.source = source;
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub(crate) fn extract(&self, element: &Element) -> String {
        self.source.read(element)
    }

    /// Message of the first failing rule, `None` when every rule passes.
    pub(crate) fn first_failure(&self, value: &str, doc: &Document) -> Option<String> {
        self.rules
            .iter()
            .find_map(|rule| rule.failure(self, value, doc))
    }
}
