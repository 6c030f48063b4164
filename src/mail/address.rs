//! Mail address syntax
//!
//! Provides RFC 5322 style syntactic checks for the addresses carried by a
//! [`MailRequest`](super::MailRequest).
//!
//! # Address Format
//!
//! Addresses are plain `local@domain` strings (no display names):
//!
//! - the local part is a dot-atom or a quoted string
//! - the domain is either a bracketed IP literal (`[192.0.2.1]`) or a DNS
//!   name with at least two labels and an alphabetic top-level label
//!
//! # Examples
//!
//! ```
//! use mailrelay::mail::Address;
//!
//! let addr: Address = "jane.doe@example.com".parse().unwrap();
//! assert_eq!(addr.user(), "jane.doe");
//! assert_eq!(addr.domain(), "example.com");
//!
//! // Single-label domains are not routable on the public internet
//! assert!("john@example".parse::<Address>().is_err());
//! ```

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use thiserror::Error;

/// Error type for address parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address cannot be empty")]
    Empty,

    #[error("invalid address format: expected 'user@domain', got '{0}'")]
    MissingAt(String),

    #[error("address contains forbidden characters: '{0}'")]
    ForbiddenCharacters(String),

    #[error("address user part is invalid: '{0}'")]
    InvalidUser(String),

    #[error("address domain is invalid: '{0}'")]
    InvalidDomain(String),
}

/// A syntactically valid mail address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    user: String,
    domain: String,
}

impl Address {
    /// Create a new address from parts
    ///
    /// # Errors
    /// Returns an error if either part fails the syntax rules.
    pub fn new(user: impl Into<String>, domain: impl Into<String>) -> Result<Self, AddressError> {
        let user = user.into();
        let domain = domain.into();

        Self::validate_user(&user)?;
        Self::validate_domain(&domain)?;

        Ok(Self { user, domain })
    }

    /// Get the user (local) part of the address
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Get the domain part of the address
    pub fn domain(&self) -> &str {
        &self.domain
    }

    fn validate_user(user: &str) -> Result<(), AddressError> {
        if EmailAddress::is_valid_local_part(user) {
            Ok(())
        } else {
            Err(AddressError::InvalidUser(user.to_string()))
        }
    }

    fn validate_domain(domain: &str) -> Result<(), AddressError> {
        // IP literal, e.g. [192.0.2.1] or [IPv6:2001:db8::1]
        if let Some(literal) = domain
            .strip_prefix('[')
            .and_then(|d| d.strip_suffix(']'))
        {
            let ip = literal.strip_prefix("IPv6:").unwrap_or(literal);
            return ip
                .parse::<IpAddr>()
                .map(|_| ())
                .map_err(|_| AddressError::InvalidDomain(domain.to_string()));
        }

        if !EmailAddress::is_valid_domain(domain) {
            return Err(AddressError::InvalidDomain(domain.to_string()));
        }

        // Require a real top-level label: "example" alone is rejected
        match domain.rsplit_once('.') {
            Some((rest, tld)) if !rest.is_empty() && is_top_level_label(tld) => Ok(()),
            _ => Err(AddressError::InvalidDomain(domain.to_string())),
        }
    }
}

fn is_top_level_label(label: &str) -> bool {
    if let Some(punycode) = label.strip_prefix("xn--") {
        return !punycode.is_empty();
    }

    label.chars().count() >= 2 && label.chars().all(char::is_alphabetic)
}

/// Check whether a string is a syntactically valid address
pub fn is_valid(address: &str) -> bool {
    address.parse::<Address>().is_ok()
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(AddressError::Empty);
        }

        // Display names and routing brackets are not accepted here
        if s.contains(|c: char| c == '<' || c == '>') || s.trim() != s {
            return Err(AddressError::ForbiddenCharacters(s.to_string()));
        }

        // Quoted user parts may themselves contain '@'
        let (user, domain) = s
            .rsplit_once('@')
            .ok_or_else(|| AddressError::MissingAt(s.to_string()))?;

        Self::new(user, domain)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.domain)
    }
}
