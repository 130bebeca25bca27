//! Fournisseur d'identité : création de comptes, connexion et déconnexion.
//!
//! L'implémentation locale conserve les comptes dans un fichier YAML, avec
//! des mots de passe hachés par Argon2, et publie chaque changement d'état
//! d'authentification sur un canal `broadcast`.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::RwLock,
};

use anyhow::anyhow;
use async_trait::async_trait;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::database;
use crate::utils::password_utils::{self, PWHash};
use crate::utils::validation::{EmailError, EmailInput};

/// Minimal length accepted by the provider itself, independently of the forms.
const PROVIDER_MIN_PASSWORD: usize = 6;
const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub uid: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedUp(Credential),
    SignedIn(Credential),
    SignedOut { uid: String },
    PasswordChanged { uid: String },
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("The email address is already in use by another account.")]
    EmailInUse,
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("Password should be at least 6 characters.")]
    WeakPassword,
    #[error("{0}")]
    InvalidEmail(#[from] EmailError),
    #[error("No account matches this session.")]
    UnknownAccount,
    #[error("Password hashing failed")]
    Hashing,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_account(&self, email: &str, password: &str)
        -> Result<Credential, IdentityError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Credential, IdentityError>;

    async fn sign_out(&self, uid: &str) -> Result<(), IdentityError>;

    async fn update_password(
        &self,
        uid: &str,
        current: &str,
        new: &str,
    ) -> Result<(), IdentityError>;

    /// Receives every auth-state change published after the call.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    uid: String,
    email: String,
    password: PWHash,
}

impl Account {
    fn credential(&self) -> Credential {
        Credential {
            uid: self.uid.clone(),
            email: self.email.clone(),
        }
    }
}

/// Comptes indexés par email normalisé
type Accounts = BTreeMap<String, Account>;

pub struct LocalIdentity {
    path: Option<PathBuf>,
    accounts: RwLock<Accounts>,
    events: broadcast::Sender<AuthEvent>,
}

impl LocalIdentity {
    pub fn in_memory() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            path: None,
            accounts: RwLock::new(Accounts::default()),
            events,
        }
    }

    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let mut identity = Self::in_memory();
        database::load(&identity.accounts, path)?;
        identity.path = Some(path.to_path_buf());
        Ok(identity)
    }

    fn save(&self, accounts: &Accounts) -> anyhow::Result<()> {
        match &self.path {
            Some(path) => database::save(accounts, path),
            None => Ok(()),
        }
    }

    fn publish(&self, event: AuthEvent) {
        // No subscriber is not an error
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Credential, IdentityError> {
        let email = EmailInput::new(email)?;
        if password.chars().count() < PROVIDER_MIN_PASSWORD {
            return Err(IdentityError::WeakPassword);
        }

        let password = password_utils::hash(password).map_err(|_| IdentityError::Hashing)?;

        let credential = {
            let mut accounts = self.accounts.write().or(Err(anyhow!("DB poisoned")))?;
            if accounts.contains_key(email.as_str()) {
                return Err(IdentityError::EmailInUse);
            }

            let account = Account {
                uid: Uuid::new_v4().to_string(),
                email: email.to_string(),
                password,
            };
            let credential = account.credential();
            accounts.insert(email.to_string(), account);
            self.save(&accounts)?;
            credential
        };

        info!("Account created for {}", credential.email);
        self.publish(AuthEvent::SignedUp(credential.clone()));
        Ok(credential)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Credential, IdentityError> {
        // A malformed email is reported like any unknown account
        let key = EmailInput::new(email).map(String::from).unwrap_or_default();

        let account = self
            .accounts
            .read()
            .or(Err(anyhow!("DB poisoned")))?
            .get(&key)
            .cloned();

        let verified = password_utils::verify(password, account.as_ref().map(|a| &a.password));
        match account {
            Some(account) if verified => {
                let credential = account.credential();
                self.publish(AuthEvent::SignedIn(credential.clone()));
                Ok(credential)
            }
            _ => {
                warn!("Failed sign-in attempt");
                Err(IdentityError::InvalidCredentials)
            }
        }
    }

    async fn sign_out(&self, uid: &str) -> Result<(), IdentityError> {
        self.publish(AuthEvent::SignedOut {
            uid: uid.to_string(),
        });
        Ok(())
    }

    async fn update_password(
        &self,
        uid: &str,
        current: &str,
        new: &str,
    ) -> Result<(), IdentityError> {
        if new.chars().count() < PROVIDER_MIN_PASSWORD {
            return Err(IdentityError::WeakPassword);
        }

        let mut accounts = self.accounts.write().or(Err(anyhow!("DB poisoned")))?;
        let account = accounts
            .values_mut()
            .find(|a| a.uid == uid)
            .ok_or(IdentityError::UnknownAccount)?;

        if !password_utils::verify(current, Some(&account.password)) {
            return Err(IdentityError::InvalidCredentials);
        }

        account.password = password_utils::hash(new).map_err(|_| IdentityError::Hashing)?;
        self.save(&accounts)?;
        drop(accounts);

        self.publish(AuthEvent::PasswordChanged {
            uid: uid.to_string(),
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
