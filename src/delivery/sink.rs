//! Undelivered mail hook
//!
//! Mail that could not be delivered is handed to an [`UndeliveredSink`].
//! Nothing is persisted or retried by this crate; a sink that queues mail for
//! a later attempt plugs in here.

use crate::mail::MailRequest;
use crate::provider::ProviderId;
use std::fmt;

/// Why a request was not delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndeliveredReason {
    /// No provider answered its health probe
    Unreachable,

    /// The selected provider answered with an error status
    Rejected { provider: ProviderId, status: u16 },
}

impl fmt::Display for UndeliveredReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UndeliveredReason::Unreachable => write!(f, "no mail provider reachable"),
            UndeliveredReason::Rejected { provider, status } => {
                write!(f, "{} provider rejected the mail with status {}", provider, status)
            }
        }
    }
}

/// Receives requests that were not delivered
pub trait UndeliveredSink: Send + Sync {
    fn hold(&self, request: &MailRequest, reason: UndeliveredReason);
}

/// Sink that only records the drop in the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl UndeliveredSink for LogSink {
    fn hold(&self, request: &MailRequest, reason: UndeliveredReason) {
        tracing::warn!(
            from = request.from.as_str(),
            recipients = request.recipient_count(),
            reason = %reason,
            "Mail dropped without delivery"
        );
    }
}
