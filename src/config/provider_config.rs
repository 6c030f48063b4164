//! Provider configuration
//!
//! One [`ProviderConfig`] per provider: endpoint, request headers, and where
//! to find the API key.

use crate::provider::{Credential, ProviderId, ProviderProfile};
use crate::{MailRelayError, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// How the API key is presented to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    Bearer,

    /// HTTP basic auth with `username` and the key as password
    Basic,
}

/// Settings for one mail provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Send endpoint, also used for health probes
    pub url: String,

    /// HTTP method for sends
    #[serde(default = "default_method")]
    pub method: String,

    /// `Content-Type` header; defaults to the provider's wire format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// `Accept` header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,

    /// Credential scheme
    pub auth: AuthScheme,

    /// Basic auth username
    #[serde(default = "default_username")]
    pub username: String,

    /// API key given inline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

fn default_method() -> String {
    "POST".to_string()
}

fn default_username() -> String {
    "api".to_string()
}

impl ProviderConfig {
    /// SendGrid-style provider using a bearer token from `SENDGRID_API_KEY`
    pub fn sendgrid(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: default_method(),
            content_type: Some("application/json".to_string()),
            accept: Some("application/json".to_string()),
            auth: AuthScheme::Bearer,
            username: default_username(),
            api_key: None,
            api_key_env: Some("SENDGRID_API_KEY".to_string()),
        }
    }

    /// Mailgun-style provider using basic auth from `MAILGUN_API_KEY`
    pub fn mailgun(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: default_method(),
            content_type: Some("application/x-www-form-urlencoded".to_string()),
            accept: None,
            auth: AuthScheme::Basic,
            username: default_username(),
            api_key: None,
            api_key_env: Some("MAILGUN_API_KEY".to_string()),
        }
    }

    /// Set an inline API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Read the API key from an environment variable
    pub fn with_api_key_env(mut self, var: impl Into<String>) -> Self {
        self.api_key_env = Some(var.into());
        self
    }

    /// The API key, inline value first, then the environment
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Some(key.clone());
        }

        self.api_key_env
            .as_ref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|k| !k.is_empty())
    }

    /// Parsed HTTP method
    pub fn parsed_method(&self) -> Option<Method> {
        Method::from_bytes(self.method.to_ascii_uppercase().as_bytes()).ok()
    }

    /// Whether the configured `Content-Type` names the provider's wire format
    ///
    /// Parameters such as `charset` are ignored; an unset type always matches.
    pub fn content_type_matches(&self, id: ProviderId) -> bool {
        match self.content_type {
            Some(ref content_type) => {
                let media_type = content_type.split(';').next().unwrap_or_default().trim();
                media_type.eq_ignore_ascii_case(id.wire_format().content_type())
            }
            None => true,
        }
    }

    /// Build the runtime profile for this provider
    pub fn to_profile(&self, id: ProviderId) -> Result<ProviderProfile> {
        if !self.content_type_matches(id) {
            return Err(MailRelayError::Config(format!(
                "Content type '{}' does not match the {} provider's payload format ({})",
                self.content_type.as_deref().unwrap_or_default(),
                id,
                id.wire_format().content_type()
            )));
        }

        let key = self.resolve_api_key().ok_or_else(|| {
            MailRelayError::Config(format!("No API key configured for the {} provider", id))
        })?;

        let method = self.parsed_method().ok_or_else(|| {
            MailRelayError::Config(format!(
                "Invalid HTTP method '{}' for the {} provider",
                self.method, id
            ))
        })?;

        let credential = match self.auth {
            AuthScheme::Bearer => Credential::bearer(key),
            AuthScheme::Basic => Credential::basic(&self.username, key),
        };

        let mut profile = ProviderProfile::new(id, &self.url, credential).with_method(method);
        if let Some(ref content_type) = self.content_type {
            profile = profile.with_content_type(content_type);
        }
        if let Some(ref accept) = self.accept {
            profile = profile.with_accept(accept);
        }

        Ok(profile)
    }
}
