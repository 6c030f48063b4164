//! Error types for MailRelay
//!
//! Defines the crate-wide error enum. Outcomes that are part of normal
//! delivery (validation failures, unreachable or rejecting providers) are not
//! errors; they are reported through [`crate::delivery::DeliveryOutcome`].

use crate::provider::ProviderId;
use thiserror::Error;

/// Result type alias for MailRelay operations
pub type Result<T> = std::result::Result<T, MailRelayError>;

/// Error type for MailRelay operations
#[derive(Error, Debug)]
pub enum MailRelayError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors outside of a delivery exchange
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The selected provider could not be reached or written to after it
    /// passed its health probe
    #[error("Could not connect to the {provider} mail provider: {source}")]
    Transport {
        provider: ProviderId,
        #[source]
        source: reqwest::Error,
    },

    /// Inbound server errors
    #[error("Server error: {0}")]
    Server(String),

    /// Other errors
    #[error("{0}")]
    Other(String),

    /// Anyhow errors (for more context)
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

impl MailRelayError {
    /// Whether this error aborted a delivery after a provider was selected
    pub fn is_transport(&self) -> bool {
        matches!(self, MailRelayError::Transport { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = MailRelayError::Config("missing primary.url".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing primary.url");
        assert!(!err.is_transport());
    }

    #[test]
    fn test_yaml_error_conversion() {
        let err: MailRelayError = serde_yaml::from_str::<Vec<u8>>("{ nope").unwrap_err().into();
        assert!(matches!(err, MailRelayError::Yaml(_)));
        assert!(err.to_string().starts_with("YAML error:"));
    }
}
