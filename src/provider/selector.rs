//! Provider selection
//!
//! Strict priority fail-over: PRIMARY if its probe succeeds, otherwise
//! SECONDARY if its probe succeeds, otherwise nothing. Every call probes from
//! scratch; no health state is kept between requests, and probes are never
//! raced against each other.

use super::{HealthProbe, ProviderId, Providers};
use tracing::{info, warn};

/// Result of provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Deliver through this provider
    Provider(ProviderId),

    /// No provider answered its probe
    Unreachable,
}

/// Chooses the provider for one delivery
#[derive(Debug, Clone)]
pub struct ProviderSelector<P> {
    prober: P,
}

impl<P: HealthProbe> ProviderSelector<P> {
    pub fn new(prober: P) -> Self {
        Self { prober }
    }

    /// Probe providers in priority order and pick the first reachable one
    pub async fn select(&self, providers: &Providers) -> Selection {
        for profile in providers.in_priority_order() {
            if self.prober.probe(profile.url()).await {
                info!(provider = %profile.id(), "Selected mail provider");
                return Selection::Provider(profile.id());
            }

            warn!(
                provider = %profile.id(),
                url = profile.url(),
                "Mail provider failed health probe"
            );
        }

        Selection::Unreachable
    }

    /// Probe every provider, without stopping at the first reachable one
    pub async fn probe_all(&self, providers: &Providers) -> Vec<(ProviderId, bool)> {
        let mut results = Vec::with_capacity(ProviderId::ALL.len());
        for profile in providers.in_priority_order() {
            results.push((profile.id(), self.prober.probe(profile.url()).await));
        }
        results
    }

    pub fn prober(&self) -> &P {
        &self.prober
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Credential, ProviderProfile};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Prober answering from a fixed set of reachable URLs and recording calls
    struct StubProber {
        reachable: HashSet<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl StubProber {
        fn new(reachable: &[&'static str]) -> Self {
            Self {
                reachable: reachable.iter().copied().collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HealthProbe for StubProber {
        async fn probe(&self, url: &str) -> bool {
            self.calls.lock().unwrap().push(url.to_string());
            self.reachable.contains(url)
        }
    }

    const PRIMARY: &str = "https://primary.test/send";
    const SECONDARY: &str = "https://secondary.test/send";

    fn providers() -> Providers {
        Providers::new(
            ProviderProfile::new(ProviderId::Primary, PRIMARY, Credential::bearer("k")),
            ProviderProfile::new(ProviderId::Secondary, SECONDARY, Credential::basic("api", "k")),
        )
    }

    #[tokio::test]
    async fn test_primary_preferred() {
        let selector = ProviderSelector::new(StubProber::new(&[PRIMARY, SECONDARY]));
        let selection = selector.select(&providers()).await;

        assert_eq!(selection, Selection::Provider(ProviderId::Primary));
        assert_eq!(selector.prober().calls(), vec![PRIMARY]);
    }

    #[tokio::test]
    async fn test_fails_over_to_secondary() {
        let selector = ProviderSelector::new(StubProber::new(&[SECONDARY]));
        let selection = selector.select(&providers()).await;

        assert_eq!(selection, Selection::Provider(ProviderId::Secondary));
        assert_eq!(selector.prober().calls(), vec![PRIMARY, SECONDARY]);
    }

    #[tokio::test]
    async fn test_all_unreachable() {
        let selector = ProviderSelector::new(StubProber::new(&[]));
        assert_eq!(selector.select(&providers()).await, Selection::Unreachable);
    }

    #[tokio::test]
    async fn test_probes_base_url_not_redirect() {
        let providers = providers();
        providers
            .get(ProviderId::Primary)
            .set_redirect_url("https://moved.test/send");

        let selector = ProviderSelector::new(StubProber::new(&[PRIMARY]));
        assert_eq!(
            selector.select(&providers).await,
            Selection::Provider(ProviderId::Primary)
        );
        assert_eq!(selector.prober().calls(), vec![PRIMARY]);
    }

    #[tokio::test]
    async fn test_no_state_between_selections() {
        let providers = providers();
        let selector = ProviderSelector::new(StubProber::new(&[SECONDARY]));

        selector.select(&providers).await;
        selector.select(&providers).await;

        assert_eq!(
            selector.prober().calls(),
            vec![PRIMARY, SECONDARY, PRIMARY, SECONDARY]
        );
    }

    #[tokio::test]
    async fn test_probe_all() {
        let selector = ProviderSelector::new(StubProber::new(&[PRIMARY]));
        let results = selector.probe_all(&providers()).await;

        assert_eq!(
            results,
            vec![(ProviderId::Primary, true), (ProviderId::Secondary, false)]
        );
    }
}
