//! Configuration validation
//!
//! Validates MailRelay configuration before any provider is contacted:
//! - Provider URLs are absolute http(s) URLs
//! - HTTP methods parse
//! - Content types match the provider payload format
//! - API keys resolve (inline or from the environment)
//! - Timeouts and server settings are usable

use super::provider_config::{AuthScheme, ProviderConfig};
use super::relay_config::RelayConfig;
use crate::provider::ProviderId;
use crate::MailRelayError;
use std::net::SocketAddr;

/// Validation error details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub provider: Option<ProviderId>,
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            provider: None,
            field: field.into(),
            message: message.into(),
        }
    }

    fn for_provider(mut self, provider: ProviderId) -> Self {
        self.provider = Some(provider);
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = self.provider {
            write!(f, "[{}] {}: {}", provider, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Validation result
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// Validate a MailRelay configuration
pub fn validate_config(config: &RelayConfig) -> ValidationResult {
    let mut errors = Vec::new();

    for id in ProviderId::ALL {
        if let Err(provider_errors) = validate_provider(id, config.provider(id)) {
            errors.extend(provider_errors.into_iter().map(|e| e.for_provider(id)));
        }
    }

    if config.primary.url == config.secondary.url {
        errors.push(ValidationError::new(
            "secondary.url",
            "Secondary provider must not share the primary's URL",
        ));
    }

    if config.timeouts.connect_ms == 0 {
        errors.push(ValidationError::new(
            "timeouts.connect_ms",
            "Timeout must be greater than 0",
        ));
    }

    if config.timeouts.read_ms == 0 {
        errors.push(ValidationError::new(
            "timeouts.read_ms",
            "Timeout must be greater than 0",
        ));
    }

    if config.server.bind.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind",
            format!("Invalid bind address: {}", config.server.bind),
        ));
    }

    if config.server.max_body_size == 0 {
        errors.push(ValidationError::new(
            "server.max_body_size",
            "Body size limit must be greater than 0",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a single provider
fn validate_provider(id: ProviderId, provider: &ProviderConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if !is_valid_http_url(&provider.url) {
        errors.push(ValidationError::new(
            "url",
            format!("Invalid provider URL: {}", provider.url),
        ));
    }

    if provider.parsed_method().is_none() {
        errors.push(ValidationError::new(
            "method",
            format!("Invalid HTTP method: {}", provider.method),
        ));
    }

    if !provider.content_type_matches(id) {
        errors.push(ValidationError::new(
            "content_type",
            format!(
                "Content type {} does not match the payload format ({})",
                provider.content_type.as_deref().unwrap_or_default(),
                id.wire_format().content_type()
            ),
        ));
    }

    if provider.resolve_api_key().is_none() {
        let message = match provider.api_key_env {
            Some(ref var) => format!("API key missing: set {} or api_key", var),
            None => "API key missing: set api_key or api_key_env".to_string(),
        };
        errors.push(ValidationError::new("api_key", message));
    }

    if provider.auth == AuthScheme::Basic && provider.username.is_empty() {
        errors.push(ValidationError::new(
            "username",
            "Basic auth requires a username",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check if a string is an absolute http(s) URL
fn is_valid_http_url(url: &str) -> bool {
    match reqwest::Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.has_host(),
        Err(_) => false,
    }
}

/// Validate configuration and return a Result
pub fn validate_config_result(config: &RelayConfig) -> crate::Result<()> {
    validate_config(config).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        MailRelayError::Config(format!(
            "Configuration validation failed:\n  - {}",
            messages.join("\n  - ")
        ))
    })
}
