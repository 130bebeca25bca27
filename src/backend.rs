//! Module principal pour le backend de l'application.
//! Contient les gestionnaires pour les routes, les modèles de données,
//! le routeur, et les middlewares.
pub mod handlers_auth;
pub mod handlers_unauth;
pub mod middlewares;
mod models;
mod pages;
pub mod router;
