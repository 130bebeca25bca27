//! Represents all possible errors in the application

use axum::response::{IntoResponse, Response};
use http::StatusCode;
use log::error;
use thiserror::Error;

pub const FORM_INVALID: &str = "Please fix the errors above and try again.";

pub const FORM_SUBMITTED: &str = "Submitting the form...";

pub const SIGNUP_FAILED: &str = "Sign-up failed";

pub const SIGNIN_FAILED: &str = "Sign-in failed";

pub const SIGNOUT_FAILED: &str = "Sign-out failed";

pub const PROFILE_FAILED: &str = "Unable to save your profile";

pub const PROFILE_MISSING: &str = "User data not found.";

pub const PROFILE_LOAD_FAILED: &str = "Something went wrong while loading your profile.";

pub const DONATION_FAILED: &str = "Unable to schedule your donation";

pub const HISTORY_FAILED: &str = "Unable to load donation history. Please try again later.";

pub const PASSWORD_FAILED: &str = "Password update failed";

pub const MESSAGE_FAILED: &str = "Message rejected";

pub const INTERNAL_ERROR: &str = "Internal Server Error";

/// Formats a collaborator failure as shown to the user.
pub fn remote_failure(context: &str, cause: &dyn std::fmt::Display) -> String {
    format!("{context}: {cause}")
}

/// Errors escaping a request handler.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Template rendering failed: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("Session store failed: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Missing request extension: {0}")]
    MissingExtension(&'static str),

    #[error("Form setup failed: {0}")]
    Form(#[from] crate::utils::validation::FormError),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("{}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR).into_response()
    }
}
