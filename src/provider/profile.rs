//! Provider profiles
//!
//! A [`ProviderProfile`] holds the static settings for one provider and a
//! [`RedirectSlot`] recording the last redirect target the provider answered
//! with. The slot is the only state shared and mutated across concurrent
//! deliveries; everything else in a profile is immutable once built.

use super::ProviderId;
use reqwest::{Method, RequestBuilder};
use std::fmt;
use std::sync::RwLock;

/// Provider credential
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// `Authorization: Bearer <token>`
    Bearer(String),

    /// HTTP basic auth
    Basic { username: String, password: String },
}

impl Credential {
    /// Bearer token credential
    pub fn bearer(token: impl Into<String>) -> Self {
        Credential::Bearer(token.into())
    }

    /// Basic auth credential
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credential::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Attach this credential to an outgoing request
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Credential::Bearer(token) => request.bearer_auth(token),
            Credential::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
        }
    }
}

// Keys must never reach the logs
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Bearer(_) => f.write_str("Bearer(***)"),
            Credential::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

/// Last redirect target observed for a provider
///
/// Replaced wholesale under a narrow lock; concurrent writers race and the
/// last one wins.
#[derive(Debug, Default)]
pub struct RedirectSlot {
    url: RwLock<Option<String>>,
}

impl RedirectSlot {
    /// Current redirect target, if one has been observed
    pub fn get(&self) -> Option<String> {
        match self.url.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Record a new redirect target
    pub fn set(&self, url: impl Into<String>) {
        let url = url.into();
        match self.url.write() {
            Ok(mut guard) => *guard = Some(url),
            Err(poisoned) => *poisoned.into_inner() = Some(url),
        }
    }
}

/// Static configuration for one provider
#[derive(Debug)]
pub struct ProviderProfile {
    id: ProviderId,
    url: String,
    method: Method,
    content_type: String,
    accept: Option<String>,
    credential: Credential,
    redirect: RedirectSlot,
}

impl ProviderProfile {
    /// Create a profile with `POST` and the content type of the provider's
    /// wire format
    pub fn new(id: ProviderId, url: impl Into<String>, credential: Credential) -> Self {
        Self {
            id,
            url: url.into(),
            method: Method::POST,
            content_type: id.wire_format().content_type().to_string(),
            accept: None,
            credential,
            redirect: RedirectSlot::default(),
        }
    }

    /// Set the HTTP method used for sends
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the `Content-Type` header value
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Set the `Accept` header value
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    pub fn id(&self) -> ProviderId {
        self.id
    }

    /// Configured base URL
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn accept(&self) -> Option<&str> {
        self.accept.as_deref()
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Last observed redirect target
    pub fn redirect_url(&self) -> Option<String> {
        self.redirect.get()
    }

    /// Record a redirect target for subsequent sends
    pub fn set_redirect_url(&self, url: impl Into<String>) {
        self.redirect.set(url);
    }

    /// URL the next send goes to: the redirect target if set, else the base URL
    pub fn target_url(&self) -> String {
        self.redirect_url().unwrap_or_else(|| self.url.clone())
    }
}
