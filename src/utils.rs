//! Utilitaires partagés : messages d'erreur, mots de passe et validation des formulaires.

pub mod error_messages;
pub mod password_utils;
pub mod validation;
