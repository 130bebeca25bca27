//! BloodBridge : portail de don de sang.
//! Validation des formulaires côté serveur, notifications, comptes et
//! documents des donneurs.

pub mod backend;
pub mod config;
pub mod consts;
pub mod context;
pub mod database;
pub mod demo_state;
pub mod dom;
pub mod identity;
pub mod notify;
pub mod utils;
pub mod views;
