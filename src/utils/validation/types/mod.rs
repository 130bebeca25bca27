//! Validated values that do not come from a guarded form.

mod email_input;
mod text_input;

pub use email_input::{EmailError, EmailInput};
pub use text_input::{TextError, TextInput};
