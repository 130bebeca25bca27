//! Définition des constantes globales pour l'application.

pub const DEFAULT_HTTP_PORT: u16 = 8080; // Port par défaut pour le serveur HTTP.
pub const DEFAULT_DATA_DIR: &str = "./data"; // Dossier des fichiers YAML.
pub const DEFAULT_NOTIFY_TTL_SECS: u64 = 5; // Durée de vie d'une notification.

pub const ENV_PORT: &str = "BLOODBRIDGE_PORT";
pub const ENV_DATA_DIR: &str = "BLOODBRIDGE_DATA_DIR";
pub const ENV_NOTIFY_TTL: &str = "BLOODBRIDGE_NOTIFY_TTL_SECS";

pub const ACCOUNTS_FILE: &str = "accounts.yaml"; // Comptes du fournisseur d'identité.
pub const DOCUMENTS_FILE: &str = "documents.yaml"; // Collections du magasin de documents.

// Collections du magasin de documents
pub const USERS_COLLECTION: &str = "users";
pub const DONATIONS_COLLECTION: &str = "donations";

// Clés de l'état local (démo), identiques côté client
pub const CHAT_MESSAGES_KEY: &str = "chatMessages";
pub const DONATION_SCHEDULE_KEY: &str = "donationSchedule";
pub const THEME_KEY: &str = "theme";
pub const PENDING_PAYMENT_KEY: &str = "pendingPayment";

// Clés de session
pub const SESSION_UID: &str = "uid";
pub const SESSION_EMAIL: &str = "email";
pub const SESSION_NOTIFICATIONS: &str = "notifications";
pub const SESSION_DEMO_STATE: &str = "demo_state";
