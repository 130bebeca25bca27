//! Modèle minimal du document HTML d'une page.
//!
//! Les formulaires sont décrits par un `Document` : une liste ordonnée
//! d'éléments adressés par leur id. Toute recherche renvoie une `Option`,
//! l'appelant doit traiter explicitement le cas où l'élément est absent.

use std::collections::{BTreeMap, BTreeSet};

/// Marker class applied to a field that failed validation.
pub const INVALID_CLASS: &str = "is-invalid";
/// Class of the feedback node rendered next to an invalid field.
pub const FEEDBACK_CLASS: &str = "invalid-feedback";
/// Class hiding an element.
pub const HIDDEN_CLASS: &str = "d-none";

/// Kind of element, drives how a value is read and how it is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Form,
    Text,
    Email,
    Password,
    Date,
    Tel,
    Number,
    Select,
    Checkbox,
    Feedback,
}

impl ElementKind {
    /// `type` attribute used when rendering an input.
    pub fn input_type(&self) -> &'static str {
        match self {
            ElementKind::Email => "email",
            ElementKind::Password => "password",
            ElementKind::Date => "date",
            ElementKind::Tel => "tel",
            ElementKind::Number => "number",
            ElementKind::Checkbox => "checkbox",
            _ => "text",
        }
    }

    pub fn is_input(&self) -> bool {
        !matches!(self, ElementKind::Form | ElementKind::Feedback)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    id: String,
    kind: ElementKind,
    label: String,
    value: String,
    checked: bool,
    text: String,
    custom_validity: String,
    classes: BTreeSet<String>,
    attributes: BTreeMap<String, String>,
    options: Vec<String>,
}

impl Element {
    pub fn new(id: &str, kind: ElementKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
            label: id.to_string(),
            value: String::new(),
            checked: false,
            text: String::new(),
            custom_validity: String::new(),
            classes: BTreeSet::new(),
            attributes: BTreeMap::new(),
            options: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    /// Choices offered by a select element.
    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| o.to_string()).collect();
        self
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
    }

    pub fn checked(&self) -> bool {
        self.checked
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    /// Native validation message slot. Empty means the element is valid.
    pub fn custom_validity(&self) -> &str {
        &self.custom_validity
    }

    pub fn set_custom_validity(&mut self, message: &str) {
        self.custom_validity = message.to_string();
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn add_class(&mut self, class: &str) {
        self.classes.insert(class.to_string());
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.remove(class);
    }

    pub fn is_hidden(&self) -> bool {
        self.has_class(HIDDEN_CLASS)
    }
}

/// Ordered collection of elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element. An existing element with the same id is replaced in place.
    pub fn append(&mut self, element: Element) -> &mut Element {
        let index = match self.elements.iter().position(|e| e.id == element.id) {
            Some(index) => {
                self.elements[index] = element;
                index
            }
            None => {
                self.elements.push(element);
                self.elements.len() - 1
            }
        };
        &mut self.elements[index]
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Number of elements carrying `class`.
    pub fn count_with_class(&self, class: &str) -> usize {
        self.elements.iter().filter(|e| e.has_class(class)).count()
    }

    /// Fills the input elements from submitted key/value pairs.
    ///
    /// Missing keys reset the input: an absent checkbox is unchecked and an
    /// absent text value is empty. Keys without a matching element are ignored.
    pub fn fill<'a, I>(&mut self, values: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)> + Clone,
    {
        for element in self.elements.iter_mut().filter(|e| e.kind.is_input()) {
            let submitted = values
                .clone()
                .into_iter()
                .find(|(key, _)| *key == element.id)
                .map(|(_, value)| value);

            match element.kind {
                ElementKind::Checkbox => {
                    element.checked = submitted.is_some_and(|v| !v.is_empty() && v != "false")
                }
                _ => element.value = submitted.unwrap_or_default().to_string(),
            }
        }
    }
}

/// Id of the feedback node paired with `field_id`.
pub fn feedback_id(field_id: &str) -> String {
    format!("{field_id}-feedback")
}
