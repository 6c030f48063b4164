//! Configuration system
//!
//! Loads ~/.config/mailrelay/config.yaml with:
//! - Primary and secondary provider endpoints and credentials
//! - Connect and read timeouts for provider calls
//! - Inbound server bind address and body limit

mod provider_config;
mod relay_config;
pub mod validation;

pub use provider_config::{AuthScheme, ProviderConfig};
pub use relay_config::{RelayConfig, ServerConfig, TimeoutConfig};
pub use validation::{validate_config, validate_config_result, ValidationError};
