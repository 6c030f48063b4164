//! MailRelay configuration file handling
//!
//! Loads and manages the ~/.config/mailrelay/config.yaml file.

use super::provider_config::ProviderConfig;
use crate::provider::{ProviderId, Providers, Timeouts, DEFAULT_TIMEOUT_MS};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Inbound HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the server binds to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Request body size limit in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_max_body_size() -> usize {
    1024 * 1024 // 1MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_size: default_max_body_size(),
        }
    }
}

/// Provider call timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Connect timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub connect_ms: u64,

    /// Read timeout for health probes and sends in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub read_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: default_timeout_ms(),
            read_ms: default_timeout_ms(),
        }
    }
}

impl TimeoutConfig {
    pub fn to_timeouts(self) -> Timeouts {
        Timeouts {
            connect: Duration::from_millis(self.connect_ms),
            read: Duration::from_millis(self.read_ms),
        }
    }
}

/// MailRelay configuration
///
/// Represents the complete ~/.config/mailrelay/config.yaml file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Inbound server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Provider call timeouts
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Provider tried first
    pub primary: ProviderConfig,

    /// Provider used when the primary is unreachable
    pub secondary: ProviderConfig,
}

impl RelayConfig {
    /// Create a configuration for the given providers with default settings
    pub fn new(primary: ProviderConfig, secondary: ProviderConfig) -> Self {
        Self {
            server: ServerConfig::default(),
            timeouts: TimeoutConfig::default(),
            primary,
            secondary,
        }
    }

    /// Starter configuration written by `mailrelay init`
    pub fn template() -> Self {
        Self::new(
            ProviderConfig::sendgrid("https://api.sendgrid.com/v3/mail/send"),
            ProviderConfig::mailgun("https://api.mailgun.net/v3/example.com/messages"),
        )
    }

    /// Load configuration from the default path (~/.config/mailrelay/config.yaml)
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path();
        Self::load(&path)
    }

    /// Load configuration from a specific path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(crate::MailRelayError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading MailRelay configuration");

        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;

        tracing::debug!(
            primary = %config.primary.url,
            secondary = %config.secondary.url,
            bind = %config.server.bind,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %path.display(), "Saving MailRelay configuration");

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;

        Ok(())
    }

    /// Get the default config path (~/.config/mailrelay/config.yaml)
    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("mailrelay");
        path.push("config.yaml");
        path
    }

    /// Settings for a provider identity
    pub fn provider(&self, id: ProviderId) -> &ProviderConfig {
        match id {
            ProviderId::Primary => &self.primary,
            ProviderId::Secondary => &self.secondary,
        }
    }

    /// Build the runtime provider pair
    pub fn providers(&self) -> Result<Providers> {
        Ok(Providers::new(
            self.primary.to_profile(ProviderId::Primary)?,
            self.secondary.to_profile(ProviderId::Secondary)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_template_defaults() {
        let config = RelayConfig::template();
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.timeouts.connect_ms, 3000);
        assert_eq!(config.timeouts.read_ms, 3000);
        assert_eq!(
            config.provider(ProviderId::Primary).url,
            "https://api.sendgrid.com/v3/mail/send"
        );
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.yaml");

        let mut config = RelayConfig::template();
        config.server.bind = "0.0.0.0:9000".to_string();
        config.save(&path).unwrap();

        let loaded = RelayConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = RelayConfig::load(temp_dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(crate::MailRelayError::Config(_))));
    }

    #[test]
    fn test_parse_minimal_yaml() {
        let yaml = r#"
primary:
  url: https://api.sendgrid.com/v3/mail/send
  auth: bearer
  api_key: sg
secondary:
  url: https://api.mailgun.net/v3/example.com/messages
  auth: basic
  api_key: mg
"#;
        let config: RelayConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.timeouts, TimeoutConfig::default());

        let providers = config.providers().unwrap();
        assert_eq!(providers.get(ProviderId::Secondary).id(), ProviderId::Secondary);
    }

    #[test]
    fn test_timeouts_conversion() {
        let timeouts = TimeoutConfig {
            connect_ms: 1500,
            read_ms: 2500,
        }
        .to_timeouts();
        assert_eq!(timeouts.connect, Duration::from_millis(1500));
        assert_eq!(timeouts.read, Duration::from_millis(2500));
    }
}
