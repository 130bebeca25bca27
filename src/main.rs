//! Point d'entrée principal de l'application.
//! Charge la configuration, ouvre les données des comptes et des documents,
//! et démarre le serveur web avec Axum.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use bloodbridge::{
    backend::router::get_router, config::AppConfig, context::AppContext, identity::AuthEvent,
};
use dotenv::dotenv;
use env_logger::Env;
use log::{info, warn};
use tokio::sync::broadcast::error::RecvError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Charger les variables d'environnement
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    let port = config.port;
    let ctx = Arc::new(AppContext::open(config)?);

    // Journal des changements d'état d'authentification
    let mut events = ctx.identity.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(AuthEvent::SignedUp(c)) => info!("Account created for {}", c.email),
                Ok(AuthEvent::SignedIn(c)) => info!("{} signed in", c.email),
                Ok(AuthEvent::SignedOut { uid }) => info!("User {} signed out", uid),
                Ok(AuthEvent::PasswordChanged { uid }) => {
                    info!("User {} changed their password", uid)
                }
                Err(RecvError::Lagged(n)) => warn!("Skipped {} auth events", n),
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Démarrer le serveur web
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to open web server listener")?;

    axum::serve(listener, get_router(ctx))
        .await
        .context("Failed to bind Axum to listener")?;

    Ok(())
}
