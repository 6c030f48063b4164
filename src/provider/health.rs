//! Provider health probing
//!
//! A probe is a body-less `OPTIONS` request against the provider's base URL.
//! Only a `200 OK` counts as reachable; redirects are not followed and any
//! network failure is reported as unreachable rather than as an error.

use super::Timeouts;
use crate::Result;
use async_trait::async_trait;
use reqwest::{redirect, Client, Method, StatusCode};
use tracing::{debug, warn};

/// Reachability check for a provider endpoint
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Whether the endpoint answered `200 OK`
    async fn probe(&self, url: &str) -> bool;
}

/// `OPTIONS`-based prober over HTTP
#[derive(Debug, Clone)]
pub struct HttpHealthProber {
    client: Client,
}

impl HttpHealthProber {
    /// Create a prober with the given connect/read timeouts
    pub fn new(timeouts: Timeouts) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeouts.connect)
            .read_timeout(timeouts.read)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProber {
    async fn probe(&self, url: &str) -> bool {
        match self.client.request(Method::OPTIONS, url).send().await {
            Ok(response) => {
                let status = response.status();
                debug!(url = url, status = status.as_u16(), "Health probe answered");
                status == StatusCode::OK
            }
            Err(e) => {
                warn!(url = url, "Couldn't establish a connection: {}", e);
                false
            }
        }
    }
}
