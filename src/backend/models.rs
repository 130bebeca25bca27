//! Structures transmises aux templates.
//! Contient les vues des formulaires, du tableau de bord et de la navigation.

use std::time::SystemTime;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::dom::{feedback_id, Document, ElementKind};
use crate::notify::{Notification, NotificationKind};
use crate::utils::validation::presets::{FormKind, BLOOD_GROUPS};
use crate::utils::validation::ErrorDisplay;

const NOT_PROVIDED: &str = "Not Provided";
const UNKNOWN: &str = "Unknown";
const NOT_AVAILABLE: &str = "N/A";
const NO_DATE: &str = "--";

/// Champs du profil pris en compte dans le taux de complétion
pub const PROFILE_FIELDS: [&str; 7] = [
    "fullName",
    "phoneNumber",
    "bloodGroup",
    "dateOfBirth",
    "nationalIdNumber",
    "emergencyContactName",
    "emergencyContactPhone",
];

#[derive(Debug, Serialize)]
pub struct NavItem {
    pub href: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// Liens de navigation, celui de la page courante est marqué actif.
pub fn nav_items(current_path: &str, signed_in: bool) -> Vec<NavItem> {
    let links: &[(&'static str, &'static str)] = if signed_in {
        &[
            ("/", "Home"),
            ("/dashboard", "Dashboard"),
            ("/profile", "Profile"),
            ("/donate", "Donate"),
            ("/forum", "Forum"),
            ("/account/password", "Password"),
        ]
    } else {
        &[
            ("/", "Home"),
            ("/signup", "Sign up"),
            ("/signin", "Sign in"),
            ("/donate", "Donate"),
            ("/forum", "Forum"),
        ]
    };

    links
        .iter()
        .map(|&(href, label)| NavItem {
            href,
            label,
            active: href == current_path,
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct FieldView {
    pub id: String,
    pub label: String,
    pub input_type: &'static str,
    pub value: String,
    pub checked: bool,
    pub is_checkbox: bool,
    pub is_password: bool,
    pub is_select: bool,
    pub options: Vec<String>,
    pub invalid: bool,
    pub feedback: Option<String>,
    pub custom_validity: String,
    pub list: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FormView {
    pub name: &'static str,
    pub form_id: &'static str,
    pub native_validity: bool,
    pub fields: Vec<FieldView>,
    pub blood_groups: [&'static str; 8],
}

impl FormView {
    /// Vue des champs de `kind`, telle que le document la décrit.
    /// Les mots de passe ne sont jamais renvoyés au navigateur.
    pub fn new(kind: FormKind, doc: &Document) -> Self {
        let fields = doc
            .elements()
            .filter(|e| e.kind().is_input())
            .map(|e| {
                let feedback = doc
                    .element(&feedback_id(e.id()))
                    .filter(|f| !f.is_hidden())
                    .map(|f| f.text().to_string());
                let value = match e.kind() {
                    ElementKind::Password => String::new(),
                    _ => e.value().to_string(),
                };

                FieldView {
                    id: e.id().to_string(),
                    label: e.label().to_string(),
                    input_type: e.kind().input_type(),
                    value,
                    checked: e.checked(),
                    is_checkbox: e.kind() == ElementKind::Checkbox,
                    is_password: e.kind() == ElementKind::Password,
                    is_select: e.kind() == ElementKind::Select,
                    options: e.options().to_vec(),
                    invalid: e.has_class(crate::dom::INVALID_CLASS),
                    feedback,
                    custom_validity: e.custom_validity().to_string(),
                    list: e.attribute("list").map(str::to_string),
                }
            })
            .collect();

        Self {
            name: kind.name(),
            form_id: kind.form_id(),
            native_validity: kind.display() == ErrorDisplay::NativeValidity,
            fields,
            blood_groups: BLOOD_GROUPS,
        }
    }
}

/// Réponse de la validation d'un champ à la sortie de celui-ci
#[derive(Debug, Serialize)]
pub struct ValidationResult {
    pub field: String,
    pub valid: bool,
    pub message: Option<String>,
    pub display: ErrorDisplay,
}

#[derive(Debug, Serialize)]
pub struct NotificationView {
    pub id: String,
    pub message: String,
    pub kind: NotificationKind,
    /// Temps restant avant expiration, pour la fermeture côté client
    pub expires_in_ms: u64,
}

impl NotificationView {
    pub fn new(notification: &Notification, now: SystemTime) -> Self {
        Self {
            id: notification.id.to_string(),
            message: notification.message.clone(),
            kind: notification.kind,
            expires_in_ms: notification
                .expires_at
                .duration_since(now)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0),
        }
    }
}

/// Formate une date `AAAA-MM-JJ` comme « May 12, 2025 ».
pub fn format_date(value: Option<&Value>) -> String {
    match value.and_then(Value::as_str).filter(|s| !s.is_empty()) {
        None => NO_DATE.to_string(),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(|date| date.format("%b %-d, %Y").to_string())
            .unwrap_or_else(|_| raw.to_string()),
    }
}

fn text_or(data: &Value, field: &str, fallback: &str) -> String {
    data.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(fallback)
        .to_string()
}

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub blood_group: String,
    pub date_of_birth: String,
    pub national_id: String,
    pub emergency_name: String,
    pub emergency_phone: String,
    pub next_donation: String,
    pub last_donation: String,
    pub completion: u8,
}

impl ProfileView {
    pub fn from_document(data: &Value) -> Self {
        Self {
            full_name: text_or(data, "fullName", ""),
            email: text_or(data, "email", ""),
            phone_number: text_or(data, "phoneNumber", NOT_PROVIDED),
            blood_group: text_or(data, "bloodGroup", UNKNOWN),
            date_of_birth: format_date(data.get("dateOfBirth")),
            national_id: text_or(data, "nationalIdNumber", NOT_AVAILABLE),
            emergency_name: text_or(data, "emergencyContactName", NOT_AVAILABLE),
            emergency_phone: text_or(data, "emergencyContactPhone", NOT_AVAILABLE),
            next_donation: format_date(data.get("nextDonationDate")),
            last_donation: format_date(data.get("lastDonationDate")),
            completion: data
                .get("profileCompletion")
                .and_then(Value::as_u64)
                .map(|p| p.min(100) as u8)
                .unwrap_or(0),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DonationView {
    pub blood_type: String,
    pub date: String,
    pub location: String,
    pub status: String,
}

impl DonationView {
    pub fn from_document(data: &Value) -> Self {
        let date = match data.get("date").and_then(Value::as_str) {
            Some(raw) if !raw.is_empty() => format_date(data.get("date")),
            _ => UNKNOWN.to_string(),
        };

        Self {
            blood_type: text_or(data, "bloodType", UNKNOWN),
            date,
            location: text_or(data, "location", UNKNOWN),
            status: text_or(data, "status", UNKNOWN),
        }
    }
}

/// Pourcentage arrondi des champs du profil renseignés.
pub fn profile_completion<'a, I>(values: I) -> u8
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let filled = values
        .into_iter()
        .filter(|(field, value)| {
            PROFILE_FIELDS.iter().any(|f| f == field) && !value.trim().is_empty()
        })
        .count();
    ((filled as f64 / PROFILE_FIELDS.len() as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_nav_marks_current_page() {
        let items = nav_items("/dashboard", true);
        let active: Vec<&str> = items.iter().filter(|i| i.active).map(|i| i.href).collect();
        assert_eq!(active, vec!["/dashboard"]);

        assert!(nav_items("/unknown", false).iter().all(|i| !i.active));
    }

    #[test]
    fn test_profile_fallbacks() {
        let view = ProfileView::from_document(&json!({
            "fullName": "Ada Lovelace",
            "email": "ada@example.com",
            "phoneNumber": "",
        }));

        assert_eq!(view.full_name, "Ada Lovelace");
        assert_eq!(view.phone_number, "Not Provided");
        assert_eq!(view.blood_group, "Unknown");
        assert_eq!(view.date_of_birth, "--");
        assert_eq!(view.national_id, "N/A");
        assert_eq!(view.emergency_phone, "N/A");
        assert_eq!(view.completion, 0);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(Some(&json!("2025-05-02"))), "May 2, 2025");
        assert_eq!(format_date(Some(&json!(""))), "--");
        assert_eq!(format_date(None), "--");
        assert_eq!(format_date(Some(&json!("soon"))), "soon");
    }

    #[test]
    fn test_donation_card() {
        let view = DonationView::from_document(&json!({
            "bloodType": "O+",
            "location": "Accra",
            "status": "pending",
        }));
        assert_eq!(view.blood_type, "O+");
        assert_eq!(view.date, "Unknown");
        assert_eq!(view.status, "pending");
    }

    #[test]
    fn test_profile_completion() {
        assert_eq!(profile_completion(vec![("fullName", "Ada")]), 14);
        assert_eq!(
            profile_completion(PROFILE_FIELDS.iter().map(|f| (*f, "x"))),
            100
        );
        assert_eq!(profile_completion(vec![("fullName", "  "), ("other", "x")]), 0);
    }

    #[test]
    fn test_form_view_hides_passwords_and_shows_feedback() {
        let kind = FormKind::SignUp;
        let mut doc = kind.document();
        doc.fill([("email", "bad"), ("password", "Secret123")]);
        let mut guard = kind.guard(&doc).unwrap();
        guard.validate_field(&mut doc, "email");

        let view = FormView::new(kind, &doc);
        let email = view.fields.iter().find(|f| f.id == "email").unwrap();
        let password = view.fields.iter().find(|f| f.id == "password").unwrap();

        assert!(email.invalid);
        assert_eq!(email.feedback.as_deref(), Some("Please enter a valid email address."));
        assert_eq!(password.value, "");
        assert!(view.fields.iter().any(|f| f.is_checkbox));
    }
}
