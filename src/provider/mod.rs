//! Mail provider plumbing
//!
//! Everything between a validated [`MailRequest`](crate::mail::MailRequest)
//! and a provider's HTTP response.
//!
//! # Overview
//!
//! - **profile**: static provider settings plus the shared redirect slot
//! - **payload**: provider-specific wire formats (SendGrid JSON, Mailgun form)
//! - **health**: OPTIONS reachability probe
//! - **selector**: strict PRIMARY → SECONDARY fail-over
//! - **exchange**: the send itself, following at most one redirect hop

pub mod exchange;
pub mod health;
pub mod payload;
pub mod profile;
pub mod selector;

pub use exchange::{Exchange, ExchangeResult, HttpExchange};
pub use health::{HealthProbe, HttpHealthProber};
pub use payload::{build_payload, MailgunFormat, SendGridFormat, WireFormat, WirePayload};
pub use profile::{Credential, ProviderProfile, RedirectSlot};
pub use selector::{ProviderSelector, Selection};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Connect and read timeout used for every provider call, in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

/// Provider identity, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    Primary,
    Secondary,
}

impl ProviderId {
    /// Both identities, highest priority first
    pub const ALL: [ProviderId; 2] = [ProviderId::Primary, ProviderId::Secondary];

    /// The wire format this provider expects
    pub fn wire_format(self) -> &'static dyn WireFormat {
        match self {
            ProviderId::Primary => &SendGridFormat,
            ProviderId::Secondary => &MailgunFormat,
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderId::Primary => write!(f, "primary"),
            ProviderId::Secondary => write!(f, "secondary"),
        }
    }
}

/// Network timeouts for provider calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            read: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

/// The two configured providers, shared across requests
#[derive(Debug, Clone)]
pub struct Providers {
    primary: Arc<ProviderProfile>,
    secondary: Arc<ProviderProfile>,
}

impl Providers {
    /// Create the provider pair
    ///
    /// Profile identities are only checked in debug builds.
    pub fn new(primary: ProviderProfile, secondary: ProviderProfile) -> Self {
        debug_assert_eq!(primary.id(), ProviderId::Primary);
        debug_assert_eq!(secondary.id(), ProviderId::Secondary);

        Self {
            primary: Arc::new(primary),
            secondary: Arc::new(secondary),
        }
    }

    /// Get the profile for a provider identity
    pub fn get(&self, id: ProviderId) -> &ProviderProfile {
        match id {
            ProviderId::Primary => &self.primary,
            ProviderId::Secondary => &self.secondary,
        }
    }

    /// Profiles in priority order
    pub fn in_priority_order(&self) -> impl Iterator<Item = &ProviderProfile> {
        ProviderId::ALL.into_iter().map(move |id| self.get(id))
    }
}
