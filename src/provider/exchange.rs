//! Provider exchange
//!
//! Sends a [`WirePayload`] to a provider and reads back the status and body.
//!
//! Redirects are handled by hand, not by the HTTP client: a `301`/`302`
//! answer stores the `Location` target in the profile's redirect slot and the
//! send is repeated once against it. Whatever the repeated send answers,
//! including another redirect, is returned as-is.

use super::{ProviderProfile, Timeouts, WirePayload};
use crate::{MailRelayError, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use reqwest::{redirect, Client, Response, StatusCode};
use tracing::{debug, warn};

/// Final status and body of a provider exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeResult {
    pub status: u16,
    pub body: String,
}

impl ExchangeResult {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Performs the send for a selected provider
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Send the payload to the provider
    ///
    /// # Errors
    /// Returns [`MailRelayError::Transport`] when the provider cannot be
    /// connected to, written to, or read from.
    async fn send(&self, payload: &WirePayload, profile: &ProviderProfile) -> Result<ExchangeResult>;
}

/// HTTP exchange with one-hop redirect handling
#[derive(Debug, Clone)]
pub struct HttpExchange {
    client: Client,
}

impl HttpExchange {
    /// Create an exchange with the given connect/read timeouts
    ///
    /// Each attempt is bounded by both timeouts together; a provider that
    /// stalls past them fails the send with [`MailRelayError::Transport`].
    pub fn new(timeouts: Timeouts) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeouts.connect)
            .read_timeout(timeouts.read)
            .timeout(timeouts.connect + timeouts.read)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self { client })
    }

    async fn attempt(
        &self,
        url: &str,
        payload: &WirePayload,
        profile: &ProviderProfile,
    ) -> Result<Response> {
        let mut request = self
            .client
            .request(profile.method().clone(), url)
            .header(CONTENT_TYPE, profile.content_type())
            .body(payload.as_bytes().to_vec());

        if let Some(accept) = profile.accept() {
            request = request.header(ACCEPT, accept);
        }

        debug!(
            provider = %profile.id(),
            url = url,
            bytes = payload.len(),
            "Sending mail to provider"
        );

        profile
            .credential()
            .apply(request)
            .send()
            .await
            .map_err(|source| {
                tracing::error!(
                    provider = %profile.id(),
                    url = url,
                    "Could not connect to the mail provider: {}",
                    source
                );
                MailRelayError::Transport {
                    provider: profile.id(),
                    source,
                }
            })
    }
}

#[async_trait]
impl Exchange for HttpExchange {
    async fn send(&self, payload: &WirePayload, profile: &ProviderProfile) -> Result<ExchangeResult> {
        let url = profile.target_url();
        let mut response = self.attempt(&url, payload, profile).await?;

        if is_redirect(response.status()) {
            match redirect_target(&response) {
                Some(location) => {
                    warn!(
                        provider = %profile.id(),
                        from = url.as_str(),
                        to = location.as_str(),
                        "Provider redirected the request; update the configured url"
                    );
                    profile.set_redirect_url(location.clone());
                    response = self.attempt(&location, payload, profile).await?;
                }
                None => {
                    warn!(
                        provider = %profile.id(),
                        status = response.status().as_u16(),
                        "Provider redirect has no usable Location header"
                    );
                }
            }
        }

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|source| MailRelayError::Transport {
                provider: profile.id(),
                source,
            })?;

        debug!(provider = %profile.id(), status = status, "Provider answered");

        Ok(ExchangeResult { status, body })
    }
}

fn is_redirect(status: StatusCode) -> bool {
    status == StatusCode::MOVED_PERMANENTLY || status == StatusCode::FOUND
}

/// `Location` header resolved against the URL that produced it
fn redirect_target(response: &Response) -> Option<String> {
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    response.url().join(location).ok().map(|url| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Credential, ProviderId};

    #[test]
    fn test_is_redirect() {
        assert!(is_redirect(StatusCode::MOVED_PERMANENTLY));
        assert!(is_redirect(StatusCode::FOUND));
        assert!(!is_redirect(StatusCode::SEE_OTHER));
        assert!(!is_redirect(StatusCode::TEMPORARY_REDIRECT));
        assert!(!is_redirect(StatusCode::OK));
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        let exchange = HttpExchange::new(Timeouts::default()).unwrap();
        let profile = ProviderProfile::new(
            ProviderId::Secondary,
            "http://127.0.0.1:1/messages",
            Credential::basic("api", "key"),
        );
        let payload = WirePayload::new(b"from=a".to_vec(), "application/x-www-form-urlencoded");

        let err = exchange.send(&payload, &profile).await.unwrap_err();
        assert!(err.is_transport());
        assert!(err.to_string().contains("secondary"));
        assert_eq!(profile.redirect_url(), None);
    }
}
