//! Failover delivery pipeline
//!
//! Runs one request through validation, provider selection, payload
//! construction, the exchange, and classification, in that order. Each stage
//! can end the pipeline early with an outcome.
//!
//! The selected provider is passed from stage to stage as a value; nothing
//! about one request's choice is stored where a concurrent request could see
//! it. Once a provider is selected it is committed to: a transport failure is
//! returned as an error rather than retried against the other provider.

use super::outcome::{classify, DeliveryOutcome};
use super::sink::{LogSink, UndeliveredReason, UndeliveredSink};
use crate::config::RelayConfig;
use crate::mail::{validate, MailRequest};
use crate::provider::{
    build_payload, Exchange, HealthProbe, HttpExchange, HttpHealthProber, ProviderId,
    ProviderSelector, Providers, Selection,
};
use crate::Result;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Delivers mail through the first reachable provider
pub struct FailoverMailer<P = HttpHealthProber, E = HttpExchange> {
    providers: Providers,
    selector: ProviderSelector<P>,
    exchange: E,
    sink: Arc<dyn UndeliveredSink>,
}

impl FailoverMailer {
    /// Build a mailer talking HTTP to the configured providers
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        let timeouts = config.timeouts.to_timeouts();
        let providers = config.providers()?;

        Ok(Self::with_parts(
            providers,
            HttpHealthProber::new(timeouts)?,
            HttpExchange::new(timeouts)?,
        ))
    }
}

impl<P: HealthProbe, E: Exchange> FailoverMailer<P, E> {
    /// Build a mailer from explicit parts
    pub fn with_parts(providers: Providers, prober: P, exchange: E) -> Self {
        Self {
            providers,
            selector: ProviderSelector::new(prober),
            exchange,
            sink: Arc::new(LogSink),
        }
    }

    /// Replace the hook that receives undelivered mail
    pub fn with_sink(mut self, sink: Arc<dyn UndeliveredSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn providers(&self) -> &Providers {
        &self.providers
    }

    /// Probe both providers and report their reachability
    pub async fn probe_all(&self) -> Vec<(ProviderId, bool)> {
        self.selector.probe_all(&self.providers).await
    }

    /// Deliver one mail request
    ///
    /// # Errors
    /// Returns [`MailRelayError::Transport`](crate::MailRelayError::Transport)
    /// when the selected provider passed its probe but could not then be
    /// sent to.
    pub async fn send(&self, request: &MailRequest) -> Result<DeliveryOutcome> {
        let errors = validate(request);
        if !errors.is_empty() {
            error!(errors = errors.len(), "Bad request, mail not sent");
            return Ok(DeliveryOutcome::validation_failed(errors));
        }

        let provider = match self.selector.select(&self.providers).await {
            Selection::Provider(id) => id,
            Selection::Unreachable => {
                warn!("Can't reach to any mail providers!!");
                self.sink.hold(request, UndeliveredReason::Unreachable);
                return Ok(DeliveryOutcome::unreachable());
            }
        };

        let payload = build_payload(request, provider)?;
        let profile = self.providers.get(provider);
        let result = self.exchange.send(&payload, profile).await?;

        let outcome = classify(&result);
        if outcome.is_sent() {
            info!(
                provider = %provider,
                recipients = request.recipient_count(),
                "Mail delivered to provider"
            );
        } else {
            self.sink.hold(
                request,
                UndeliveredReason::Rejected {
                    provider,
                    status: result.status,
                },
            );
        }

        Ok(outcome)
    }
}
