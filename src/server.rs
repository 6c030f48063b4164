//! HTTP front end for the relay
//!
//! # Routes
//!
//! - `POST /api/emails` - Deliver a mail (body: JSON mail submission)
//! - `GET /health` - Liveness check
//!
//! # Example
//!
//! ```no_run
//! use mailrelay::config::RelayConfig;
//! use mailrelay::delivery::FailoverMailer;
//! use mailrelay::server::RelayServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RelayConfig::load_default()?;
//!     let mailer = FailoverMailer::from_config(&config)?;
//!
//!     RelayServer::new(mailer, config.server.max_body_size)
//!         .run(&config.server.bind)
//!         .await?;
//!     Ok(())
//! }
//! ```

use crate::delivery::{DeliveryOutcome, DeliveryResponse, FailoverMailer};
use crate::mail::{MailRequest, MailSubmission};
use crate::provider::{Exchange, HealthProbe, HttpExchange, HttpHealthProber};
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

/// Server error types
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bind error: {0}")]
    Bind(String),
}

impl From<ServerError> for crate::MailRelayError {
    fn from(err: ServerError) -> Self {
        crate::MailRelayError::Server(err.to_string())
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

struct AppState<P, E> {
    mailer: FailoverMailer<P, E>,
}

/// HTTP server wrapping a [`FailoverMailer`]
pub struct RelayServer<P = HttpHealthProber, E = HttpExchange> {
    state: Arc<AppState<P, E>>,
    max_body_size: usize,
}

impl<P, E> RelayServer<P, E>
where
    P: HealthProbe + 'static,
    E: Exchange + 'static,
{
    pub fn new(mailer: FailoverMailer<P, E>, max_body_size: usize) -> Self {
        Self {
            state: Arc::new(AppState { mailer }),
            max_body_size,
        }
    }

    /// Build the router
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/api/emails", post(send_email::<P, E>))
            .layer(DefaultBodyLimit::max(self.max_body_size))
            .with_state(self.state.clone())
    }

    /// Run the server on the given address
    ///
    /// # Errors
    /// Returns [`MailRelayError::Server`](crate::MailRelayError::Server) when
    /// the address cannot be bound or the listener fails.
    pub async fn run(self, addr: &str) -> crate::Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("{}: {}", addr, e)))?;

        tracing::info!(
            addr = addr,
            max_body_size = self.max_body_size,
            "Mail relay listening"
        );

        axum::serve(listener, self.router())
            .await
            .map_err(ServerError::Io)?;
        Ok(())
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn send_email<P, E>(
    State(state): State<Arc<AppState<P, E>>>,
    Json(submission): Json<MailSubmission>,
) -> Result<(StatusCode, Json<DeliveryResponse>), (StatusCode, Json<ErrorResponse>)>
where
    P: HealthProbe + 'static,
    E: Exchange + 'static,
{
    let request = MailRequest::from(submission);

    let outcome = state.mailer.send(&request).await.map_err(|e| {
        tracing::error!(error = %e, "Mail delivery failed");
        let status = if e.is_transport() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (
            status,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    let status = match outcome {
        DeliveryOutcome::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::CREATED,
    };

    Ok((status, Json(outcome.to_response())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{
        Credential, ExchangeResult, ProviderId, ProviderProfile, Providers, WirePayload,
    };
    use crate::MailRelayError;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    struct AlwaysUp;

    #[async_trait]
    impl HealthProbe for AlwaysUp {
        async fn probe(&self, _url: &str) -> bool {
            true
        }
    }

    struct FixedExchange(Option<u16>);

    #[async_trait]
    impl Exchange for FixedExchange {
        async fn send(
            &self,
            _payload: &WirePayload,
            profile: &ProviderProfile,
        ) -> crate::Result<ExchangeResult> {
            match self.0 {
                Some(status) => Ok(ExchangeResult::new(status, "")),
                None => Err(MailRelayError::Transport {
                    provider: profile.id(),
                    source: reqwest::Client::new()
                        .get("http://[::1")
                        .build()
                        .unwrap_err(),
                }),
            }
        }
    }

    fn create_test_server(status: Option<u16>) -> RelayServer<AlwaysUp, FixedExchange> {
        create_limited_server(status, 1024 * 1024)
    }

    fn create_limited_server(
        status: Option<u16>,
        max_body_size: usize,
    ) -> RelayServer<AlwaysUp, FixedExchange> {
        let providers = Providers::new(
            ProviderProfile::new(
                ProviderId::Primary,
                "https://primary.test/send",
                Credential::bearer("sg"),
            ),
            ProviderProfile::new(
                ProviderId::Secondary,
                "https://secondary.test/send",
                Credential::basic("api", "mg"),
            ),
        );
        let mailer = FailoverMailer::with_parts(providers, AlwaysUp, FixedExchange(status));
        RelayServer::new(mailer, max_body_size)
    }

    fn post_email(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/emails")
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_run_reports_bind_failure() {
        let err = create_test_server(Some(202))
            .run("not-an-address")
            .await
            .unwrap_err();

        assert!(matches!(err, MailRelayError::Server(_)));
        assert!(err.to_string().contains("Bind error: not-an-address"));
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_server(Some(202)).router();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_send_email_created() {
        let app = create_test_server(Some(202)).router();

        let response = app
            .oneshot(post_email(serde_json::json!({
                "from": "sender@example.com",
                "to": ["someone@example.com"],
                "subject": "Hello",
                "text": "Body"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Yayy, Your email has been sent!!");
        assert!(json["timestamp"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_rejection_is_still_created() {
        let app = create_test_server(Some(500)).router();

        let response = app
            .oneshot(post_email(serde_json::json!({
                "from": "sender@example.com",
                "to": ["someone@example.com"],
                "subject": "Hello",
                "text": "Body"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body_json(response).await["message"],
            "Sorry, Your email has not been sent!!"
        );
    }

    #[tokio::test]
    async fn test_validation_failure_is_bad_request() {
        let app = create_test_server(Some(202)).router();

        let response = app
            .oneshot(post_email(serde_json::json!({
                "to": ["someone@example.com"],
                "subject": "Hello",
                "text": "Body"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["message"],
            "Your email has not been sent: From email is missing"
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_bad_gateway() {
        let app = create_test_server(None).router();

        let response = app
            .oneshot(post_email(serde_json::json!({
                "from": "sender@example.com",
                "to": ["someone@example.com"],
                "subject": "Hello",
                "text": "Body"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("primary mail provider"));
    }

    #[tokio::test]
    async fn test_body_limit() {
        let app = create_limited_server(Some(202), 64).router();

        let response = app
            .oneshot(post_email(serde_json::json!({
                "from": "sender@example.com",
                "to": ["someone@example.com"],
                "subject": "Hello",
                "text": "x".repeat(256)
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
