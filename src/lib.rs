//! MailRelay - failover mail relay over HTTP mail provider APIs
//!
//! Accepts a mail request, validates it, probes two HTTP mail providers in
//! priority order, and submits the mail to the first one that answers.
//!
//! # Architecture
//!
//! - **mail**: Mail requests, address syntax, and request validation
//! - **provider**: Provider profiles, health probes, wire payloads, and the HTTP exchange
//! - **delivery**: The failover pipeline and outcome classification
//! - **config**: YAML configuration and validation
//! - **server**: HTTP front end (axum)

pub mod config;
pub mod delivery;
pub mod error;
pub mod logging;
pub mod mail;
pub mod provider;
pub mod server;

// Re-exports
pub use error::{MailRelayError, Result};
