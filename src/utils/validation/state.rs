//! Validation state of fields and forms.

use std::collections::BTreeMap;

use serde::Serialize;

/// Current validity of one registered field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldState {
    /// Starts `false`: a field is only valid once it has been validated.
    pub valid: bool,
    /// Message of the last failed validation, cleared on input.
    pub message: Option<String>,
    /// The user has left the field at least once.
    pub touched: bool,
}

/// Snapshot of every field state of a form, in registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    fields: Vec<(String, FieldState)>,
}

impl FormState {
    pub(crate) fn new(fields: Vec<(String, FieldState)>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldState> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, state)| state)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldState)> {
        self.fields.iter().map(|(name, state)| (name.as_str(), state))
    }

    /// True iff every registered field is valid.
    ///
    /// An optional field passes its rules when empty, so it only blocks
    /// while it holds a value its rules reject.
    pub fn is_submittable(&self) -> bool {
        self.fields.iter().all(|(_, state)| state.valid)
    }

    /// `(field, message)` of every field currently showing an error.
    pub fn errors(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .filter_map(|(field, state)| {
                state
                    .message
                    .as_ref()
                    .map(|message| (field.clone(), message.clone()))
            })
            .collect()
    }
}

/// Field values of a form that passed validation.
///
/// Only `FormGuard` builds this type, and only from a submittable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidatedPayload {
    values: BTreeMap<String, String>,
}

impl ValidatedPayload {
    pub(crate) fn new(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(valid: bool, message: Option<&str>) -> FieldState {
        FieldState {
            valid,
            message: message.map(str::to_string),
            touched: false,
        }
    }

    #[test]
    fn test_form_is_submittable_only_when_all_valid() {
        let form = FormState::new(vec![
            ("email".into(), state(true, None)),
            ("password".into(), state(false, Some("Password is required."))),
        ]);
        assert!(!form.is_submittable());
        assert_eq!(
            form.errors(),
            vec![("password".to_string(), "Password is required.".to_string())]
        );

        let form = FormState::new(vec![("email".into(), state(true, None))]);
        assert!(form.is_submittable());
    }

    #[test]
    fn test_new_field_is_not_valid() {
        let form = FormState::new(vec![("email".into(), FieldState::default())]);
        assert!(!form.is_submittable());
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_payload_serializes_as_map() {
        let payload = ValidatedPayload::new(BTreeMap::from([(
            "email".to_string(),
            "a@b.co".to_string(),
        )]));
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({ "email": "a@b.co" })
        );
    }
}
