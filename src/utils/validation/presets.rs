//! The forms of the application and the rules guarding them.

use once_cell::sync::Lazy;

use super::constants::{BLOOD_GROUP_PATTERN, PHONE_PATTERN};
use super::display::ErrorDisplay;
use super::guard::{FormError, FormGuard};
use super::rules::{FieldRule, Rule, ValueSource};
use super::strength::PasswordPolicy;
use crate::dom::{Document, Element, ElementKind};

static PHONE_RULE: Lazy<Rule> = Lazy::new(|| {
    Rule::pattern(PHONE_PATTERN, "Please enter a valid phone number.")
        .expect("Failed to compile phone regex")
});
static BLOOD_GROUP_RULE: Lazy<Rule> = Lazy::new(|| {
    Rule::pattern(BLOOD_GROUP_PATTERN, "Please select a valid blood group.")
        .expect("Failed to compile blood group regex")
});

/// Blood groups offered by the select inputs.
pub const BLOOD_GROUPS: [&str; 8] = ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

/// Payment methods offered by the monetary donation form.
pub const PAYMENT_METHODS: [&str; 3] = ["Mobile Money", "Card", "Bank Transfer"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    SignUp,
    SignIn,
    ChangePassword,
    Profile,
    ScheduleDonation,
    Payment,
}

impl FormKind {
    /// Resolves the short name used in URLs.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "signup" => Some(FormKind::SignUp),
            "signin" => Some(FormKind::SignIn),
            "password" => Some(FormKind::ChangePassword),
            "profile" => Some(FormKind::Profile),
            "donation" => Some(FormKind::ScheduleDonation),
            "payment" => Some(FormKind::Payment),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FormKind::SignUp => "signup",
            FormKind::SignIn => "signin",
            FormKind::ChangePassword => "password",
            FormKind::Profile => "profile",
            FormKind::ScheduleDonation => "donation",
            FormKind::Payment => "payment",
        }
    }

    pub fn form_id(&self) -> &'static str {
        match self {
            FormKind::SignUp => "signUpForm",
            FormKind::SignIn => "loginForm",
            FormKind::ChangePassword => "passwordForm",
            FormKind::Profile => "profileForm",
            FormKind::ScheduleDonation => "donationForm",
            FormKind::Payment => "paymentForm",
        }
    }

    /// The change-password form reports through the native validation
    /// message of its inputs, every other form through feedback nodes.
    pub fn display(&self) -> ErrorDisplay {
        match self {
            FormKind::ChangePassword => ErrorDisplay::NativeValidity,
            _ => ErrorDisplay::Sibling,
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            FormKind::SignUp => "Creating your account...",
            FormKind::SignIn => "Signing you in...",
            FormKind::ChangePassword => "Updating your password...",
            FormKind::Profile => "Saving your profile...",
            FormKind::ScheduleDonation => "Scheduling your donation...",
            FormKind::Payment => "Review your donation below.",
        }
    }

    /// Empty document holding the form and its inputs, in display order.
    pub fn document(&self) -> Document {
        let mut doc = Document::new();
        doc.append(Element::new(self.form_id(), ElementKind::Form));

        let inputs: Vec<Element> = match self {
            FormKind::SignUp => vec![
                Element::new("fullName", ElementKind::Text).with_label("Full name"),
                Element::new("email", ElementKind::Email).with_label("Email"),
                Element::new("password", ElementKind::Password).with_label("Password"),
                Element::new("confirmPassword", ElementKind::Password)
                    .with_label("Confirm password"),
                Element::new("terms", ElementKind::Checkbox)
                    .with_label("I accept the terms and conditions"),
            ],
            FormKind::SignIn => vec![
                Element::new("email", ElementKind::Email).with_label("Email"),
                Element::new("password", ElementKind::Password).with_label("Password"),
            ],
            FormKind::ChangePassword => vec![
                Element::new("currentPassword", ElementKind::Password)
                    .with_label("Current password"),
                Element::new("newPassword", ElementKind::Password).with_label("New password"),
            ],
            FormKind::Profile => vec![
                Element::new("fullName", ElementKind::Text).with_label("Full name"),
                Element::new("phoneNumber", ElementKind::Tel).with_label("Phone number"),
                Element::new("bloodGroup", ElementKind::Text)
                    .with_label("Blood group")
                    .with_attribute("list", "bloodGroups"),
                Element::new("dateOfBirth", ElementKind::Date).with_label("Date of birth"),
                Element::new("nationalIdNumber", ElementKind::Text)
                    .with_label("National ID number"),
                Element::new("emergencyContactName", ElementKind::Text)
                    .with_label("Emergency contact name"),
                Element::new("emergencyContactPhone", ElementKind::Tel)
                    .with_label("Emergency contact phone"),
            ],
            FormKind::ScheduleDonation => vec![
                Element::new("bloodType", ElementKind::Text)
                    .with_label("Blood type")
                    .with_attribute("list", "bloodGroups"),
                Element::new("location", ElementKind::Text).with_label("Location"),
                Element::new("date", ElementKind::Date).with_label("Date"),
            ],
            FormKind::Payment => vec![
                Element::new("amount", ElementKind::Number)
                    .with_label("Amount (GHS)")
                    .with_attribute("min", "0.01"),
                Element::new("paymentMethod", ElementKind::Select)
                    .with_label("Payment method")
                    .with_options(&PAYMENT_METHODS),
            ],
        };

        for input in inputs {
            doc.append(input);
        }
        doc
    }

    pub fn rules(&self) -> Vec<FieldRule> {
        match self {
            FormKind::SignUp => vec![
                FieldRule::new("fullName").label("Full name").rule(Rule::Required),
                FieldRule::new("email")
                    .label("Email")
                    .rule(Rule::Required)
                    .rule(Rule::email()),
                FieldRule::new("password")
                    .label("Password")
                    .source(ValueSource::Raw)
                    .rule(Rule::Required)
                    .rule(Rule::Strength(PasswordPolicy::Basic)),
                FieldRule::new("confirmPassword")
                    .label("Confirm password")
                    .source(ValueSource::Raw)
                    .rule(Rule::matches("password")),
                FieldRule::new("terms")
                    .label("Terms")
                    .source(ValueSource::Checked)
                    .rule(Rule::terms_accepted()),
            ],
            // Credentials are checked by the identity provider, not here.
            FormKind::SignIn => vec![
                FieldRule::new("email").label("Email").rule(Rule::Required),
                FieldRule::new("password")
                    .label("Password")
                    .source(ValueSource::Raw)
                    .rule(Rule::Required),
            ],
            FormKind::ChangePassword => vec![
                FieldRule::new("currentPassword")
                    .label("Current password")
                    .source(ValueSource::Raw)
                    .rule(Rule::Required),
                FieldRule::new("newPassword")
                    .label("New password")
                    .source(ValueSource::Raw)
                    .rule(Rule::Strength(PasswordPolicy::Strict)),
            ],
            FormKind::Profile => vec![
                FieldRule::new("fullName").label("Full name").rule(Rule::Required),
                FieldRule::new("phoneNumber").rule(PHONE_RULE.clone()),
                FieldRule::new("bloodGroup")
                    .label("Blood group")
                    .rule(Rule::Required)
                    .rule(BLOOD_GROUP_RULE.clone()),
                FieldRule::new("dateOfBirth").rule(Rule::date()),
                FieldRule::new("nationalIdNumber"),
                FieldRule::new("emergencyContactName"),
                FieldRule::new("emergencyContactPhone").rule(PHONE_RULE.clone()),
            ],
            FormKind::ScheduleDonation => vec![
                FieldRule::new("bloodType")
                    .label("Blood type")
                    .rule(Rule::Required)
                    .rule(BLOOD_GROUP_RULE.clone()),
                FieldRule::new("location").label("Location").rule(Rule::Required),
                FieldRule::new("date")
                    .label("Date")
                    .rule(Rule::Required)
                    .rule(Rule::date()),
            ],
            FormKind::Payment => vec![
                FieldRule::new("amount")
                    .label("Amount")
                    .rule(Rule::positive_amount()),
                FieldRule::new("paymentMethod")
                    .label("Payment method")
                    .rule(Rule::payment_method(&PAYMENT_METHODS)),
            ],
        }
    }

    /// Guard bound to `doc`, which must hold this form.
    pub fn guard(&self, doc: &Document) -> Result<FormGuard, FormError> {
        Ok(FormGuard::bind(self.form_id(), doc, self.display(), self.rules())?
            .with_success_message(self.success_message()))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use super::*;
    use crate::dom::{FEEDBACK_CLASS, INVALID_CLASS};
    use crate::notify::{NotificationKind, Notifier};
    use crate::utils::validation::{SubmitOutcome, ValidatedPayload};

    fn filled(kind: FormKind, values: &[(&str, &str)]) -> (Document, FormGuard) {
        let mut doc = kind.document();
        doc.fill(values.iter().copied());
        let guard = kind.guard(&doc).unwrap();
        (doc, guard)
    }

    fn sign_up_values(terms: &str) -> Vec<(&str, &str)> {
        vec![
            ("fullName", " Ada Lovelace "),
            ("email", "ada@example.com"),
            ("password", "Secret123"),
            ("confirmPassword", "Secret123"),
            ("terms", terms),
        ]
    }

    fn field_message(guard: &FormGuard, field: &str) -> Option<String> {
        guard.form_state().field(field).and_then(|s| s.message.clone())
    }

    #[test]
    fn test_every_form_binds() {
        for kind in [
            FormKind::SignUp,
            FormKind::SignIn,
            FormKind::ChangePassword,
            FormKind::Profile,
            FormKind::ScheduleDonation,
            FormKind::Payment,
        ] {
            let doc = kind.document();
            let guard = kind.guard(&doc).unwrap();
            assert_eq!(guard.form_state().fields().count(), kind.rules().len());
            assert_eq!(FormKind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn test_required_fields_report_required_message() {
        let (mut doc, mut guard) = filled(FormKind::SignUp, &[("fullName", "   ")]);

        assert!(!guard.validate_field(&mut doc, "fullName"));
        assert!(!guard.validate_field(&mut doc, "email"));
        assert!(!guard.validate_field(&mut doc, "password"));
        assert_eq!(field_message(&guard, "fullName").as_deref(), Some("Full name is required."));
        assert_eq!(field_message(&guard, "email").as_deref(), Some("Email is required."));
        assert_eq!(field_message(&guard, "password").as_deref(), Some("Password is required."));
        assert!(!guard.form_state().is_submittable());
    }

    #[test]
    fn test_sign_up_email_shape() {
        let (mut doc, mut guard) = filled(FormKind::SignUp, &[("email", "ada.example.com")]);
        assert!(!guard.validate_field(&mut doc, "email"));
        assert_eq!(
            field_message(&guard, "email").as_deref(),
            Some("Please enter a valid email address.")
        );

        doc.element_mut("email").unwrap().set_value("ada@example");
        assert!(!guard.validate_field(&mut doc, "email"));

        doc.element_mut("email").unwrap().set_value("ada@example.com");
        assert!(guard.validate_field(&mut doc, "email"));
    }

    #[test]
    fn test_sign_up_password_strength() {
        let test_cases = vec![
            ("abcdefg1", None),
            ("abc123", Some("At least eight characters.")),
            ("abcdefgh", Some("At least one number.")),
        ];

        for (password, expected) in test_cases {
            let (mut doc, mut guard) = filled(FormKind::SignUp, &[("password", password)]);
            assert_eq!(guard.validate_field(&mut doc, "password"), expected.is_none());
            assert_eq!(field_message(&guard, "password").as_deref(), expected, "{password}");
        }
    }

    #[test]
    fn test_confirm_password_must_match() {
        let (mut doc, mut guard) = filled(
            FormKind::SignUp,
            &[("password", "Secret123"), ("confirmPassword", "Secret124")],
        );
        assert!(!guard.validate_field(&mut doc, "confirmPassword"));
        assert_eq!(
            field_message(&guard, "confirmPassword").as_deref(),
            Some("Passwords do not match.")
        );

        doc.element_mut("confirmPassword").unwrap().set_value("Secret123");
        assert!(guard.validate_field(&mut doc, "confirmPassword"));
    }

    #[test]
    fn test_sign_in_has_no_strength_check() {
        let (mut doc, mut guard) =
            filled(FormKind::SignIn, &[("email", "ada@example.com"), ("password", "x")]);
        assert!(guard.validate_field(&mut doc, "password"));
    }

    #[test]
    fn test_valid_sign_up_invokes_action_once() {
        let (mut doc, mut guard) = filled(FormKind::SignUp, &sign_up_values("on"));
        let notifier = Notifier::new(Duration::from_secs(5));
        let calls = Cell::new(0);
        let received: Cell<Option<ValidatedPayload>> = Cell::new(None);

        let outcome = guard.handle_submit(&mut doc, &notifier, |payload| {
            calls.set(calls.get() + 1);
            received.set(Some(payload));
        });

        assert!(outcome.is_submitted());
        assert_eq!(calls.get(), 1);
        let payload = received.take().unwrap();
        assert_eq!(payload.get("fullName"), Some("Ada Lovelace"));
        assert_eq!(payload.get("email"), Some("ada@example.com"));
        assert_eq!(payload.get("password"), Some("Secret123"));

        let active = notifier.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].kind, NotificationKind::Success);
        assert_eq!(doc.count_with_class(INVALID_CLASS), 0);
    }

    #[test]
    fn test_unchecked_terms_block_sign_up() {
        let (mut doc, mut guard) = filled(FormKind::SignUp, &sign_up_values(""));
        let notifier = Notifier::new(Duration::from_secs(5));
        let calls = Cell::new(0);

        let outcome = guard.handle_submit(&mut doc, &notifier, |_| calls.set(calls.get() + 1));

        assert_eq!(calls.get(), 0);
        let SubmitOutcome::Blocked { errors } = outcome else {
            panic!("Submission should have been blocked");
        };
        assert_eq!(
            errors,
            vec![(
                "terms".to_string(),
                "You must accept the terms and conditions.".to_string()
            )]
        );
        assert_eq!(
            notifier.active()[0].message,
            "Please fix the errors above and try again."
        );
        assert_eq!(doc.count_with_class(FEEDBACK_CLASS), 1);
    }

    #[test]
    fn test_profile_optional_fields_accept_empty_values() {
        let (mut doc, mut guard) =
            filled(FormKind::Profile, &[("fullName", "Ada"), ("bloodGroup", "O-")]);
        let notifier = Notifier::new(Duration::from_secs(5));

        let outcome = guard.handle_submit(&mut doc, &notifier, |payload| payload);
        let SubmitOutcome::Submitted(payload) = outcome else {
            panic!("Profile should be valid");
        };
        assert_eq!(payload.get("phoneNumber"), Some(""));
        assert_eq!(payload.get("bloodGroup"), Some("O-"));
    }

    #[test]
    fn test_profile_rejects_unknown_blood_group() {
        let (mut doc, mut guard) =
            filled(FormKind::Profile, &[("fullName", "Ada"), ("bloodGroup", "C+")]);
        assert!(!guard.validate_field(&mut doc, "bloodGroup"));
        assert_eq!(
            field_message(&guard, "bloodGroup").as_deref(),
            Some("Please select a valid blood group.")
        );
    }

    #[test]
    fn test_donation_date_shape() {
        let (mut doc, mut guard) = filled(
            FormKind::ScheduleDonation,
            &[("bloodType", "A+"), ("location", "Accra"), ("date", "12/05/2025")],
        );
        assert!(!guard.validate_field(&mut doc, "date"));
        doc.element_mut("date").unwrap().set_value("2025-05-12");
        assert!(guard.validate_field(&mut doc, "date"));
    }

    #[test]
    fn test_profile_optional_field_blocks_only_when_malformed() {
        let (mut doc, mut guard) = filled(
            FormKind::Profile,
            &[("fullName", "Ada"), ("bloodGroup", "O-"), ("phoneNumber", "call me")],
        );
        let notifier = Notifier::new(Duration::from_secs(5));

        let SubmitOutcome::Blocked { errors } = guard.handle_submit(&mut doc, &notifier, |_| ())
        else {
            panic!("A malformed phone number should block the profile");
        };
        assert_eq!(
            errors,
            vec![(
                "phoneNumber".to_string(),
                "Please enter a valid phone number.".to_string()
            )]
        );

        doc.element_mut("phoneNumber").unwrap().set_value("");
        assert!(guard.handle_submit(&mut doc, &notifier, |_| ()).is_submitted());
    }

    #[test]
    fn test_payment_checks_amount_before_method() {
        let (mut doc, mut guard) = filled(FormKind::Payment, &[("amount", "0")]);
        let notifier = Notifier::new(Duration::from_secs(5));

        let SubmitOutcome::Blocked { errors } = guard.handle_submit(&mut doc, &notifier, |_| ())
        else {
            panic!("An empty payment should be blocked");
        };
        assert_eq!(
            errors,
            vec![
                (
                    "amount".to_string(),
                    "Please enter a valid donation amount.".to_string()
                ),
                (
                    "paymentMethod".to_string(),
                    "Please select a payment method.".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_valid_payment_hands_amount_and_method() {
        let (mut doc, mut guard) = filled(
            FormKind::Payment,
            &[("amount", " 50 "), ("paymentMethod", "Mobile Money")],
        );
        let notifier = Notifier::new(Duration::from_secs(5));

        let outcome = guard.handle_submit(&mut doc, &notifier, |payload| payload);
        let SubmitOutcome::Submitted(payload) = outcome else {
            panic!("Payment should be valid");
        };
        assert_eq!(payload.get("amount"), Some("50"));
        assert_eq!(payload.get("paymentMethod"), Some("Mobile Money"));
        assert_eq!(notifier.active()[0].message, "Review your donation below.");
    }
}
