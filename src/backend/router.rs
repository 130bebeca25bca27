//! Configuration des routes pour l'application.
//! Définit les routes accessibles avec ou sans authentification et configure les middlewares.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_sessions::{MemoryStore, SessionManagerLayer};

use crate::backend::handlers_auth::{
    change_password, dashboard, password_page, profile_page, schedule_donation, signout,
    update_profile,
};
use crate::backend::handlers_unauth::{
    confirm_donation, dismiss_notification, donate, donate_page, forum_page, index, post_message,
    signin, signin_page, signup, signup_page, toggle_theme, validate_field,
};
use crate::backend::middlewares::SessionUser;
use crate::context::AppContext;

/// Initialisation du routeur principal et des middlewares
pub fn get_router(ctx: Arc<AppContext>) -> Router {
    // Sessions en mémoire, servies en HTTP simple
    let store = MemoryStore::default();
    let session_manager = SessionManagerLayer::new(store)
        .with_secure(false)
        .with_http_only(true);

    let router = Router::new()
        .merge(unauth_routes())
        .merge(auth_routes())
        .layer(session_manager)
        .layer(Extension(ctx));

    // CORS ouvert en mode debug uniquement
    if cfg!(debug_assertions) {
        let cors = CorsLayer::new()
            .allow_methods(tower_http::cors::AllowMethods::any())
            .allow_origin(Any);
        router.layer(cors)
    } else {
        router
    }
}

/// Routes accessibles sans authentification
fn unauth_routes() -> Router {
    Router::new()
        .route("/", get(index)) // Page d'accueil
        .route("/signup", get(signup_page).post(signup)) // Inscription
        .route("/signin", get(signin_page).post(signin)) // Connexion
        .route("/validate/:form/:field", post(validate_field)) // Validation d'un champ
        .route("/donate", get(donate_page).post(donate)) // Don monétaire
        .route("/donate/confirm", post(confirm_donation)) // Confirmation du don
        .route("/forum", get(forum_page).post(post_message)) // Forum du client
        .route("/theme", post(toggle_theme)) // Thème clair ou sombre
        .route("/notifications/:id/dismiss", post(dismiss_notification)) // Fermeture d'une notification
}

/// Routes nécessitant une authentification
fn auth_routes() -> Router {
    Router::new()
        .route("/dashboard", get(dashboard)) // Tableau de bord
        .route("/signout", post(signout)) // Déconnexion
        .route("/profile", get(profile_page).post(update_profile)) // Profil
        .route("/donations/schedule", post(schedule_donation)) // Demande de don
        .route("/account/password", get(password_page).post(change_password)) // Mot de passe
        .route_layer(axum::middleware::from_extractor::<SessionUser>()) // Utilisateur connecté requis
}
