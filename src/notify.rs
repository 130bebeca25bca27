//! Canal de notifications affichées à l'utilisateur.
//!
//! Chaque client possède un conteneur de notifications, créé au premier
//! message. Les notifications s'empilent, se ferment une par une et expirent
//! individuellement.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Danger,
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub kind: NotificationKind,
    pub expires_at: SystemTime,
}

/// The notification container of one client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationCenter {
    notifications: Vec<Notification>,
}

impl NotificationCenter {
    pub fn push(
        &mut self,
        message: &str,
        kind: NotificationKind,
        expires_at: SystemTime,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.notifications.push(Notification {
            id,
            message: message.to_string(),
            kind,
            expires_at,
        });
        id
    }

    /// Removes one notification, returns whether it was present.
    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        self.notifications.len() != before
    }

    /// Drops every notification expired at `now` and returns the others, oldest first.
    pub fn active(&mut self, now: SystemTime) -> Vec<Notification> {
        self.notifications.retain(|n| n.expires_at > now);
        self.notifications.clone()
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }
}

/// Shared handle on a client's notification container.
///
/// Cloned into spawned submission actions so they can report their outcome.
#[derive(Debug, Clone)]
pub struct Notifier {
    container: Arc<Mutex<Option<NotificationCenter>>>,
    ttl: Duration,
}

impl Notifier {
    /// A notifier without container yet.
    pub fn new(ttl: Duration) -> Self {
        Self::restore(None, ttl)
    }

    /// A notifier over a previously saved container.
    pub fn restore(center: Option<NotificationCenter>, ttl: Duration) -> Self {
        Self {
            container: Arc::new(Mutex::new(center)),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<NotificationCenter>> {
        self.container
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Shows `message`; it expires after the configured time to live.
    pub fn notify(&self, message: &str, kind: NotificationKind) -> Uuid {
        debug!("Notification ({:?}): {}", kind, message);
        let expires_at = SystemTime::now() + self.ttl;
        self.lock()
            .get_or_insert_with(NotificationCenter::default)
            .push(message, kind, expires_at)
    }

    pub fn success(&self, message: &str) -> Uuid {
        self.notify(message, NotificationKind::Success)
    }

    pub fn danger(&self, message: &str) -> Uuid {
        self.notify(message, NotificationKind::Danger)
    }

    pub fn info(&self, message: &str) -> Uuid {
        self.notify(message, NotificationKind::Info)
    }

    pub fn warning(&self, message: &str) -> Uuid {
        self.notify(message, NotificationKind::Warning)
    }

    pub fn dismiss(&self, id: Uuid) -> bool {
        self.lock()
            .as_mut()
            .map(|center| center.dismiss(id))
            .unwrap_or(false)
    }

    /// Notifications still visible now.
    pub fn active(&self) -> Vec<Notification> {
        self.active_at(SystemTime::now())
    }

    pub fn active_at(&self, now: SystemTime) -> Vec<Notification> {
        self.lock()
            .as_mut()
            .map(|center| center.active(now))
            .unwrap_or_default()
    }

    /// Copy of the container for persistence, `None` if it was never created.
    pub fn snapshot(&self) -> Option<NotificationCenter> {
        self.lock().clone()
    }
}
