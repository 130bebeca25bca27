//! Root module for the validation system.
//!
//! `FormGuard` gates a form's submission behind declarative per-field rules
//! and annotates the page `Document` with the result. The typed inputs in
//! `types` validate free values that do not come from a guarded form.

mod constants;
mod display;
mod guard;
pub mod presets;
mod rules;
mod state;
mod strength;
mod types;

// Re-export commonly used types and functions
pub use constants::*;
pub use display::ErrorDisplay;
pub use guard::{FormError, FormGuard, SubmitOutcome};
pub use rules::{FieldRule, Rule, ValueSource};
pub use state::{FieldState, FormState, ValidatedPayload};
pub use strength::PasswordPolicy;
pub use types::{EmailError, EmailInput, TextError, TextInput};
