//! Extracteurs liés à la session.
//! `SessionUser` vérifie qu'un utilisateur est connecté, `ClientState` charge
//! les notifications et l'état local du client.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::Redirect;
use tower_sessions::Session;

use crate::consts::{SESSION_EMAIL, SESSION_NOTIFICATIONS, SESSION_UID};
use crate::context::AppContext;
use crate::demo_state::DemoState;
use crate::identity::Credential;
use crate::notify::{NotificationCenter, Notifier};
use crate::utils::error_messages::AppError;

/// Utilisateur connecté. Redirige vers la page de connexion sinon.
#[derive(Debug, Clone)]
pub struct SessionUser(pub Credential);

impl SessionUser {
    pub fn uid(&self) -> &str {
        &self.0.uid
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }

    /// Ouvre la session de `credential`, avec un nouvel identifiant de session.
    pub async fn sign_in(session: &Session, credential: &Credential) -> Result<(), AppError> {
        session.cycle_id().await?;
        session.insert(SESSION_UID, &credential.uid).await?;
        session.insert(SESSION_EMAIL, &credential.email).await?;
        Ok(())
    }

    pub async fn sign_out(session: &Session) -> Result<(), AppError> {
        session.remove::<String>(SESSION_UID).await?;
        session.remove::<String>(SESSION_EMAIL).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>() {
            let uid = session.get::<String>(SESSION_UID).await.ok().flatten();
            let email = session.get::<String>(SESSION_EMAIL).await.ok().flatten();
            if let (Some(uid), Some(email)) = (uid, email) {
                return Ok(SessionUser(Credential { uid, email }));
            }
        }

        Err(Redirect::to("/signin"))
    }
}

/// État propre au client : notifications et état local, lus depuis la session.
///
/// Les modifications ne sont conservées qu'après un appel à `save`.
pub struct ClientState {
    pub ctx: Arc<AppContext>,
    pub session: Session,
    pub notifier: Notifier,
    pub demo: DemoState,
}

impl ClientState {
    pub async fn save(&self) -> Result<(), AppError> {
        if let Some(center) = self.notifier.snapshot() {
            self.session.insert(SESSION_NOTIFICATIONS, &center).await?;
        }
        self.demo.store(&self.session).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for ClientState
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<Arc<AppContext>>()
            .cloned()
            .ok_or(AppError::MissingExtension("AppContext"))?;
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AppError::MissingExtension("Session"))?;

        let center = session
            .get::<NotificationCenter>(SESSION_NOTIFICATIONS)
            .await?;
        let notifier = Notifier::restore(center, ctx.config.notify_ttl);
        let demo = DemoState::load(&session).await?;

        Ok(Self {
            ctx,
            session,
            notifier,
            demo,
        })
    }
}
