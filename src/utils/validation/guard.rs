//! Submission gating for a single form.
//!
//! A `FormGuard` owns the rules and the state of every field of one form.
//! Fields are validated when the user leaves them and all together on
//! submit; the caller's action only runs when every field is valid.

use std::collections::BTreeMap;

use log::{debug, info, warn};
use thiserror::Error;

use super::display::ErrorDisplay;
use super::rules::FieldRule;
use super::state::{FieldState, FormState, ValidatedPayload};
use crate::dom::Document;
use crate::notify::Notifier;
use crate::utils::error_messages::{FORM_INVALID, FORM_SUBMITTED};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Element not found: {0}")]
    ElementNotFound(String),
}

/// Result of a submission attempt.
#[derive(Debug)]
pub enum SubmitOutcome<R> {
    /// Every field was valid, the action ran and returned this value.
    Submitted(R),
    /// At least one field is invalid, nothing was submitted.
    Blocked { errors: Vec<(String, String)> },
}

impl<R> SubmitOutcome<R> {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted(_))
    }
}

#[derive(Debug, Clone)]
pub struct FormGuard {
    form_id: String,
    display: ErrorDisplay,
    fields: Vec<(FieldRule, FieldState)>,
    success_message: String,
}

impl FormGuard {
    /// Registers `rules` against the form `form_id` of `doc`.
    ///
    /// The form element itself is mandatory. A rule whose field is missing
    /// from the document is dropped, the field is then not validated.
    pub fn bind(
        form_id: &str,
        doc: &Document,
        display: ErrorDisplay,
        rules: Vec<FieldRule>,
    ) -> Result<Self, FormError> {
        if doc.element(form_id).is_none() {
            return Err(FormError::ElementNotFound(form_id.to_string()));
        }

        let fields = rules
            .into_iter()
            .filter(|rule| {
                let present = doc.element(rule.field()).is_some();
                if !present {
                    warn!("Form {}: no element for field {}, rule disabled", form_id, rule.field());
                }
                present
            })
            .map(|rule| (rule, FieldState::default()))
            .collect();

        Ok(Self {
            form_id: form_id.to_string(),
            display,
            fields,
            success_message: FORM_SUBMITTED.to_string(),
        })
    }

    /// Message of the success notification shown when a submission goes through.
    pub fn with_success_message(mut self, message: &str) -> Self {
        self.success_message = message.to_string();
        self
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    pub fn display(&self) -> ErrorDisplay {
        self.display
    }

    pub fn is_registered(&self, field: &str) -> bool {
        self.position(field).is_some()
    }

    fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|(rule, _)| rule.field() == field)
    }

    /// Runs the rules of `field` and renders the outcome.
    ///
    /// A field without rules is always valid.
    pub fn validate_field(&mut self, doc: &mut Document, field: &str) -> bool {
        let Some(index) = self.position(field) else {
            return true;
        };

        let rule = &self.fields[index].0;
        let value = doc
            .element(field)
            .map(|element| rule.extract(element))
            .unwrap_or_default();
        let failure = rule.first_failure(&value, doc);

        let display = self.display;
        let state = &mut self.fields[index].1;
        match failure {
            Some(message) => {
                debug!("Form {}: field {} invalid: {}", self.form_id, field, message);
                display.show(doc, field, &message);
                state.valid = false;
                state.message = Some(message);
                false
            }
            None => {
                display.clear(doc, field);
                state.valid = true;
                state.message = None;
                true
            }
        }
    }

    /// The user left `field`: mark it touched and validate it.
    pub fn blur(&mut self, doc: &mut Document, field: &str) -> bool {
        if let Some(index) = self.position(field) {
            self.fields[index].1.touched = true;
        }
        self.validate_field(doc, field)
    }

    /// The user typed in `field`: hide its error without re-running the rules.
    ///
    /// The validity is left as is, it is only recomputed on blur or submit.
    pub fn clear_field_error(&mut self, doc: &mut Document, field: &str) {
        let Some(index) = self.position(field) else {
            return;
        };
        self.display.clear(doc, field);
        self.fields[index].1.message = None;
    }

    pub fn form_state(&self) -> FormState {
        FormState::new(
            self.fields
                .iter()
                .map(|(rule, state)| (rule.field().to_string(), state.clone()))
                .collect(),
        )
    }

    /// Validates every field and, if all pass, hands the payload to `action`.
    ///
    /// The action is called at most once and its return value is passed back
    /// without being awaited or inspected. On failure a single aggregate
    /// notification is emitted and the field messages stay visible.
    pub fn handle_submit<F, R>(
        &mut self,
        doc: &mut Document,
        notifier: &Notifier,
        action: F,
    ) -> SubmitOutcome<R>
    where
        F: FnOnce(ValidatedPayload) -> R,
    {
        let names: Vec<String> = self
            .fields
            .iter()
            .map(|(rule, _)| rule.field().to_string())
            .collect();
        for name in &names {
            self.validate_field(doc, name);
        }

        let state = self.form_state();
        if !state.is_submittable() {
            info!("Form {}: submission blocked", self.form_id);
            notifier.danger(FORM_INVALID);
            return SubmitOutcome::Blocked {
                errors: state.errors(),
            };
        }

        let values: BTreeMap<String, String> = self
            .fields
            .iter()
            .map(|(rule, _)| {
                let value = doc
                    .element(rule.field())
                    .map(|element| rule.extract(element))
                    .unwrap_or_default();
                (rule.field().to_string(), value)
            })
            .collect();

        info!("Form {}: submitted", self.form_id);
        notifier.success(&self.success_message);
        SubmitOutcome::Submitted(action(ValidatedPayload::new(values)))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::dom::{Element, ElementKind, FEEDBACK_CLASS, INVALID_CLASS};
    use crate::notify::NotificationKind;
    use crate::utils::validation::{PasswordPolicy, Rule, ValueSource};

    fn login_doc(email: &str, password: &str) -> Document {
        let mut doc = Document::new();
        doc.append(Element::new("loginForm", ElementKind::Form));
        doc.append(Element::new("email", ElementKind::Email)).set_value(email);
        doc.append(Element::new("password", ElementKind::Password)).set_value(password);
        doc
    }

    fn login_rules() -> Vec<FieldRule> {
        vec![
            FieldRule::new("email").label("Email").rule(Rule::Required).rule(Rule::email()),
            FieldRule::new("password")
                .label("Password")
                .source(ValueSource::Raw)
                .rule(Rule::Required),
        ]
    }

    fn notifier() -> Notifier {
        Notifier::new(Duration::from_secs(5))
    }

    #[test]
    fn test_bind_requires_form_element() {
        let doc = Document::new();
        let result = FormGuard::bind("loginForm", &doc, ErrorDisplay::Sibling, login_rules());
        assert_eq!(
            result.unwrap_err(),
            FormError::ElementNotFound("loginForm".to_string())
        );
    }

    #[test]
    fn test_bind_drops_rules_for_missing_fields() {
        let doc = login_doc("", "");
        let mut rules = login_rules();
        rules.push(FieldRule::new("phone").rule(Rule::Required));

        let guard = FormGuard::bind("loginForm", &doc, ErrorDisplay::Sibling, rules).unwrap();
        assert!(guard.is_registered("email"));
        assert!(!guard.is_registered("phone"));
    }

    #[test]
    fn test_whitespace_value_yields_required_message() {
        let mut doc = login_doc("   ", "secret");
        let mut guard =
            FormGuard::bind("loginForm", &doc, ErrorDisplay::Sibling, login_rules()).unwrap();

        assert!(!guard.validate_field(&mut doc, "email"));
        let state = guard.form_state();
        assert_eq!(
            state.field("email").unwrap().message.as_deref(),
            Some("Email is required.")
        );
        assert!(!state.is_submittable());
        assert_eq!(doc.element("email-feedback").unwrap().text(), "Email is required.");
    }

    #[test]
    fn test_blur_marks_touched() {
        let mut doc = login_doc("user@example.com", "secret");
        let mut guard =
            FormGuard::bind("loginForm", &doc, ErrorDisplay::Sibling, login_rules()).unwrap();

        assert!(!guard.form_state().field("email").unwrap().touched);
        assert!(guard.blur(&mut doc, "email"));
        let email = guard.form_state().field("email").cloned().unwrap();
        assert!(email.touched);
        assert!(email.valid);
    }

    #[test]
    fn test_clear_field_error_does_not_revalidate() {
        let mut doc = login_doc("not-an-email", "secret");
        let mut guard =
            FormGuard::bind("loginForm", &doc, ErrorDisplay::Sibling, login_rules()).unwrap();

        guard.blur(&mut doc, "email");
        assert!(doc.element("email").unwrap().has_class(INVALID_CLASS));

        doc.element_mut("email").unwrap().set_value("still-not-an-email");
        guard.clear_field_error(&mut doc, "email");

        assert!(!doc.element("email").unwrap().has_class(INVALID_CLASS));
        assert!(doc.element("email-feedback").unwrap().is_hidden());
        let state = guard.form_state();
        assert!(state.field("email").unwrap().message.is_none());
        assert!(!state.field("email").unwrap().valid);
    }

    #[test]
    fn test_repeated_invalid_submits_do_not_duplicate_errors() {
        let mut doc = login_doc("", "");
        let mut guard =
            FormGuard::bind("loginForm", &doc, ErrorDisplay::Sibling, login_rules()).unwrap();
        let notifier = notifier();

        let first = guard.handle_submit(&mut doc, &notifier, |_| ());
        let after_first = doc.clone();
        let second = guard.handle_submit(&mut doc, &notifier, |_| ());

        assert!(!first.is_submitted());
        assert!(!second.is_submitted());
        assert_eq!(doc, after_first);
        assert_eq!(doc.count_with_class(FEEDBACK_CLASS), 2);
        assert_eq!(doc.count_with_class(INVALID_CLASS), 2);
    }

    #[test]
    fn test_blocked_submit_reports_errors_and_aggregate_notification() {
        let mut doc = login_doc("user@example.com", "");
        let mut guard =
            FormGuard::bind("loginForm", &doc, ErrorDisplay::Sibling, login_rules()).unwrap();
        let notifier = notifier();
        let mut calls = 0;

        let outcome = guard.handle_submit(&mut doc, &notifier, |_| calls += 1);

        assert_eq!(calls, 0);
        match outcome {
            SubmitOutcome::Blocked { errors } => assert_eq!(
                errors,
                vec![("password".to_string(), "Password is required.".to_string())]
            ),
            SubmitOutcome::Submitted(_) => panic!("Submission should have been blocked"),
        }
        let active = notifier.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].kind, NotificationKind::Danger);
        assert_eq!(active[0].message, "Please fix the errors above and try again.");
    }

    #[test]
    fn test_valid_submit_hands_trimmed_payload_to_action() {
        let mut doc = login_doc("  user@example.com ", " secret ");
        let mut guard = FormGuard::bind("loginForm", &doc, ErrorDisplay::Sibling, login_rules())
            .unwrap()
            .with_success_message("Signing you in...");
        let notifier = notifier();

        let outcome = guard.handle_submit(&mut doc, &notifier, |payload| payload);

        let SubmitOutcome::Submitted(payload) = outcome else {
            panic!("Submission should have gone through");
        };
        assert_eq!(payload.get("email"), Some("user@example.com"));
        assert_eq!(payload.get("password"), Some(" secret "));
        assert!(guard.form_state().is_submittable());
        assert_eq!(notifier.active()[0].message, "Signing you in...");
    }

    #[test]
    fn test_native_validity_display() {
        let mut doc = Document::new();
        doc.append(Element::new("passwordForm", ElementKind::Form));
        doc.append(Element::new("newPassword", ElementKind::Password)).set_value("weakpass");
        let rules = vec![FieldRule::new("newPassword")
            .source(ValueSource::Raw)
            .rule(Rule::Strength(PasswordPolicy::Strict))];
        let mut guard =
            FormGuard::bind("passwordForm", &doc, ErrorDisplay::NativeValidity, rules).unwrap();

        assert!(!guard.validate_field(&mut doc, "newPassword"));
        assert_eq!(
            doc.element("newPassword").unwrap().custom_validity(),
            "At least one uppercase letter. At least one number. \
             At least one special character (@, $, !, etc.)."
        );
        assert_eq!(doc.count_with_class(FEEDBACK_CLASS), 0);

        doc.element_mut("newPassword").unwrap().set_value("Str0ng@pass");
        assert!(guard.validate_field(&mut doc, "newPassword"));
        assert_eq!(doc.element("newPassword").unwrap().custom_validity(), "");
    }
}
