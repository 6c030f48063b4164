//! Mail delivery
//!
//! The failover pipeline and the outcomes it reports.
//!
//! # Pipeline
//!
//! 1. **Validate** the request; invalid requests never touch the network
//! 2. **Select** a provider by probing PRIMARY, then SECONDARY
//! 3. **Build** the provider's wire payload
//! 4. **Exchange** the payload with the provider (one redirect hop at most)
//! 5. **Classify** the provider's answer
//!
//! Undelivered mail is handed to an [`UndeliveredSink`].

mod mailer;
mod outcome;
mod sink;

pub use mailer::FailoverMailer;
pub use outcome::{
    classify, DeliveryOutcome, DeliveryResponse, REJECTED_MESSAGE, SENT_MESSAGE,
    UNREACHABLE_REASON,
};
pub use sink::{LogSink, UndeliveredReason, UndeliveredSink};
