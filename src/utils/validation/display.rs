//! Rendering of field errors into the page document.

use serde::Serialize;

use crate::dom::{
    feedback_id, Document, Element, ElementKind, FEEDBACK_CLASS, HIDDEN_CLASS, INVALID_CLASS,
};

/// Where a field's error message is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorDisplay {
    /// `is-invalid` on the field and the message in a feedback node next to it.
    /// The node is created on first use and reused afterwards.
    #[default]
    Sibling,
    /// The message goes into the field's native validation message slot.
    #[serde(rename = "native")]
    NativeValidity,
}

impl ErrorDisplay {
    /// Marks `field` invalid and shows `message`.
    pub fn show(&self, doc: &mut Document, field: &str, message: &str) {
        match self {
            ErrorDisplay::Sibling => {
                let Some(element) = doc.element_mut(field) else {
                    return;
                };
                element.add_class(INVALID_CLASS);

                let id = feedback_id(field);
                if doc.element(&id).is_none() {
                    let mut feedback = Element::new(&id, ElementKind::Feedback);
                    feedback.add_class(FEEDBACK_CLASS);
                    doc.append(feedback);
                }
                if let Some(feedback) = doc.element_mut(&id) {
                    feedback.set_text(message);
                    feedback.remove_class(HIDDEN_CLASS);
                }
            }
            ErrorDisplay::NativeValidity => {
                if let Some(element) = doc.element_mut(field) {
                    element.set_custom_validity(message);
                }
            }
        }
    }

    /// Removes the invalid marker of `field` and hides its message.
    pub fn clear(&self, doc: &mut Document, field: &str) {
        match self {
            ErrorDisplay::Sibling => {
                if let Some(element) = doc.element_mut(field) {
                    element.remove_class(INVALID_CLASS);
                }
                if let Some(feedback) = doc.element_mut(&feedback_id(field)) {
                    feedback.add_class(HIDDEN_CLASS);
                }
            }
            ErrorDisplay::NativeValidity => {
                if let Some(element) = doc.element_mut(field) {
                    element.set_custom_validity("");
                }
            }
        }
    }
}
