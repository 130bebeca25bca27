//! État local d'un client : des valeurs JSON sous des clés fixes, conservées
//! dans la session.
//!
//! Les valeurs sont lues et écrites de façon synchrone une fois l'état chargé,
//! sans expiration ni versionnement.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::warn;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tower_sessions::Session;
use uuid::Uuid;

use crate::consts::{
    CHAT_MESSAGES_KEY, DONATION_SCHEDULE_KEY, PENDING_PAYMENT_KEY, SESSION_DEMO_STATE, THEME_KEY,
};
use crate::utils::validation::TextInput;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

/// Dernière demande de don du client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationSchedule {
    pub blood_type: String,
    pub location: String,
    pub date: String,
}

/// Don monétaire validé, en attente de confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub method: String,
    /// Montant en GHS, deux décimales.
    pub amount: String,
}

impl PaymentIntent {
    /// "Proceeding with <method>: GHS <amount>"
    pub fn summary(&self) -> String {
        format!("Proceeding with {}: GHS {}", self.method, self.amount)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DemoState {
    values: BTreeMap<String, Value>,
}

impl DemoState {
    /// Valeur sous `key`. Une valeur illisible est ignorée.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.values.get(key)?;
        serde_json::from_value(value.clone())
            .map_err(|e| warn!("Ignoring malformed demo value {}: {}", key, e))
            .ok()
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), serde_json::Error> {
        self.values.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    pub fn theme(&self) -> Theme {
        self.get(THEME_KEY).unwrap_or_default()
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), serde_json::Error> {
        self.set(THEME_KEY, &theme)
    }

    pub fn chat_messages(&self) -> Vec<ChatMessage> {
        self.get(CHAT_MESSAGES_KEY).unwrap_or_default()
    }

    pub fn push_chat_message(&mut self, text: TextInput) -> Result<ChatMessage, serde_json::Error> {
        let message = ChatMessage {
            id: Uuid::new_v4(),
            text: text.into_inner(),
            sent_at: Utc::now(),
        };
        let mut messages = self.chat_messages();
        messages.push(message.clone());
        self.set(CHAT_MESSAGES_KEY, &messages)?;
        Ok(message)
    }

    pub fn donation_schedule(&self) -> Option<DonationSchedule> {
        self.get(DONATION_SCHEDULE_KEY)
    }

    pub fn set_donation_schedule(
        &mut self,
        schedule: &DonationSchedule,
    ) -> Result<(), serde_json::Error> {
        self.set(DONATION_SCHEDULE_KEY, schedule)
    }

    pub fn pending_payment(&self) -> Option<PaymentIntent> {
        self.get(PENDING_PAYMENT_KEY)
    }

    pub fn set_pending_payment(&mut self, intent: &PaymentIntent) -> Result<(), serde_json::Error> {
        self.set(PENDING_PAYMENT_KEY, intent)
    }

    /// Retire le don en attente, s'il existe.
    pub fn take_pending_payment(&mut self) -> Option<PaymentIntent> {
        let intent = self.pending_payment();
        self.remove(PENDING_PAYMENT_KEY);
        intent
    }

    /// Charge l'état du client depuis sa session, vide s'il n'existe pas encore.
    pub async fn load(session: &Session) -> Result<Self, tower_sessions::session::Error> {
        Ok(session
            .get::<DemoState>(SESSION_DEMO_STATE)
            .await?
            .unwrap_or_default())
    }

    pub async fn store(&self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(SESSION_DEMO_STATE, self).await
    }
}
