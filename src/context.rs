//! Contexte de l'application, construit au démarrage et transmis aux handlers.

use std::sync::Arc;

use anyhow::Result;
use handlebars::Handlebars;
use log::info;

use crate::config::AppConfig;
use crate::consts::{ACCOUNTS_FILE, DOCUMENTS_FILE};
use crate::database::Database;
use crate::identity::{IdentityProvider, LocalIdentity};
use crate::views;

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub identity: Arc<dyn IdentityProvider>,
    pub database: Arc<Database>,
    pub hbs: Arc<Handlebars<'static>>,
}

impl AppContext {
    /// Ouvre les fichiers de données du dossier configuré.
    pub fn open(config: AppConfig) -> Result<Self> {
        info!("Loading data from {}", config.data_dir.display());
        let identity = LocalIdentity::open(&config.data_dir.join(ACCOUNTS_FILE))?;
        let database = Database::open(&config.data_dir.join(DOCUMENTS_FILE))?;
        Self::with(config, Arc::new(identity), Arc::new(database))
    }

    /// Contexte sans persistance.
    pub fn in_memory(config: AppConfig) -> Result<Self> {
        Self::with(
            config,
            Arc::new(LocalIdentity::in_memory()),
            Arc::new(Database::in_memory()),
        )
    }

    pub fn with(
        config: AppConfig,
        identity: Arc<dyn IdentityProvider>,
        database: Arc<Database>,
    ) -> Result<Self> {
        Ok(Self {
            config,
            identity,
            database,
            hbs: Arc::new(views::registry()?),
        })
    }
}
