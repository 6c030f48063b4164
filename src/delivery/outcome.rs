//! Delivery outcomes and response classification

use crate::provider::ExchangeResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message returned when a provider accepted the mail
pub const SENT_MESSAGE: &str = "Yayy, Your email has been sent!!";

/// Message returned when a provider refused the mail
pub const REJECTED_MESSAGE: &str = "Sorry, Your email has not been sent!!";

/// Reason given when no provider answered its health probe
pub const UNREACHABLE_REASON: &str = "Can't reach to any mail providers!!";

/// Outcome of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// A provider accepted the mail
    Sent(DateTime<Utc>),

    /// The request failed validation; nothing was sent
    ValidationFailed {
        errors: Vec<String>,
        at: DateTime<Utc>,
    },

    /// Neither provider answered its health probe
    AllProvidersUnreachable(DateTime<Utc>),

    /// The selected provider answered with an error status
    ProviderRejected(DateTime<Utc>),
}

impl DeliveryOutcome {
    pub fn sent() -> Self {
        DeliveryOutcome::Sent(Utc::now())
    }

    pub fn validation_failed(errors: Vec<String>) -> Self {
        DeliveryOutcome::ValidationFailed {
            errors,
            at: Utc::now(),
        }
    }

    pub fn unreachable() -> Self {
        DeliveryOutcome::AllProvidersUnreachable(Utc::now())
    }

    pub fn rejected() -> Self {
        DeliveryOutcome::ProviderRejected(Utc::now())
    }

    /// When the outcome was reached
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            DeliveryOutcome::Sent(at)
            | DeliveryOutcome::AllProvidersUnreachable(at)
            | DeliveryOutcome::ProviderRejected(at)
            | DeliveryOutcome::ValidationFailed { at, .. } => *at,
        }
    }

    /// Human-readable description for the caller
    pub fn message(&self) -> String {
        match self {
            DeliveryOutcome::Sent(_) => SENT_MESSAGE.to_string(),
            DeliveryOutcome::ValidationFailed { errors, .. } => {
                format!("Your email has not been sent: {}", errors.join("; "))
            }
            DeliveryOutcome::AllProvidersUnreachable(_) => format!(
                "Your email has not been sent due to the reason : {}",
                UNREACHABLE_REASON
            ),
            DeliveryOutcome::ProviderRejected(_) => REJECTED_MESSAGE.to_string(),
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, DeliveryOutcome::Sent(_))
    }

    /// Validation errors, if the request was refused before sending
    pub fn validation_errors(&self) -> Option<&[String]> {
        match self {
            DeliveryOutcome::ValidationFailed { errors, .. } => Some(errors.as_slice()),
            _ => None,
        }
    }

    /// Wire shape returned to the client
    pub fn to_response(&self) -> DeliveryResponse {
        DeliveryResponse {
            message: self.message(),
            timestamp: self.timestamp().timestamp_millis(),
        }
    }
}

/// Response body returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryResponse {
    pub message: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl From<&DeliveryOutcome> for DeliveryResponse {
    fn from(outcome: &DeliveryOutcome) -> Self {
        outcome.to_response()
    }
}

/// Map a provider's answer to an outcome
///
/// Anything below 400 is a send; the body is logged, never returned.
pub fn classify(result: &ExchangeResult) -> DeliveryOutcome {
    if result.status < 400 {
        tracing::info!(status = result.status, "Provider accepted the mail");
        tracing::debug!(body = result.body.as_str(), "Provider response body");
        DeliveryOutcome::sent()
    } else {
        tracing::warn!(
            status = result.status,
            body = result.body.as_str(),
            "Provider rejected the mail"
        );
        DeliveryOutcome::rejected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_success_range() {
        assert!(classify(&ExchangeResult::new(200, "")).is_sent());
        assert!(classify(&ExchangeResult::new(202, "")).is_sent());
        assert!(classify(&ExchangeResult::new(302, "")).is_sent());
        assert!(classify(&ExchangeResult::new(399, "")).is_sent());
    }

    #[test]
    fn test_classify_error_range() {
        assert!(matches!(
            classify(&ExchangeResult::new(400, "bad")),
            DeliveryOutcome::ProviderRejected(_)
        ));
        assert!(matches!(
            classify(&ExchangeResult::new(500, "{\"errors\":[]}")),
            DeliveryOutcome::ProviderRejected(_)
        ));
    }

    #[test]
    fn test_messages() {
        assert_eq!(DeliveryOutcome::sent().message(), "Yayy, Your email has been sent!!");
        assert_eq!(
            DeliveryOutcome::rejected().message(),
            "Sorry, Your email has not been sent!!"
        );
        assert!(DeliveryOutcome::unreachable()
            .message()
            .contains("Can't reach to any mail providers!!"));

        let outcome = DeliveryOutcome::validation_failed(vec![
            "'to' email is invalid - x".to_string(),
            "'cc' email is invalid - y".to_string(),
        ]);
        assert_eq!(
            outcome.message(),
            "Your email has not been sent: 'to' email is invalid - x; 'cc' email is invalid - y"
        );
        assert_eq!(outcome.validation_errors().map(|e| e.len()), Some(2));
    }

    #[test]
    fn test_response_shape() {
        let before = Utc::now().timestamp_millis();
        let outcome = DeliveryOutcome::sent();
        let json = serde_json::to_value(outcome.to_response()).unwrap();

        assert_eq!(json["message"], "Yayy, Your email has been sent!!");
        assert!(json["timestamp"].as_i64().unwrap() >= before);
    }
}
