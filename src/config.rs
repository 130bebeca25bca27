//! Configuration de l'application, lue depuis l'environnement (et `.env`).

use std::{path::PathBuf, time::Duration};

use thiserror::Error;

use crate::consts::{
    DEFAULT_DATA_DIR, DEFAULT_HTTP_PORT, DEFAULT_NOTIFY_TTL_SECS, ENV_DATA_DIR, ENV_NOTIFY_TTL,
    ENV_PORT,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub notify_ttl: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_HTTP_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            notify_ttl: Duration::from_secs(DEFAULT_NOTIFY_TTL_SECS),
        }
    }
}

impl AppConfig {
    /// Lit la configuration depuis les variables d'environnement.
    /// `dotenv` doit avoir été appelé au préalable pour prendre en compte `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Construit la configuration à partir d'une fonction de lecture arbitraire.
    /// Les variables absentes prennent leur valeur par défaut.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_PORT) {
            config.port = parse(ENV_PORT, &value)?;
        }

        if let Some(value) = lookup(ENV_DATA_DIR) {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    name: ENV_DATA_DIR,
                    value,
                });
            }
            config.data_dir = PathBuf::from(value);
        }

        if let Some(value) = lookup(ENV_NOTIFY_TTL) {
            config.notify_ttl = Duration::from_secs(parse(ENV_NOTIFY_TTL, &value)?);
        }

        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    })
}
