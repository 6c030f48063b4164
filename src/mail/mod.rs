//! Outbound mail model
//!
//! The request type accepted by the delivery pipeline, address syntax checks,
//! and request validation.
//!
//! # Overview
//!
//! - [`MailSubmission`]: inbound shape, every field optional
//! - [`MailRequest`]: normalized request handed to the pipeline
//! - [`validate`]: structural checks, run before any provider is contacted

mod address;
mod request;
mod validator;

pub use address::{is_valid, Address, AddressError};
pub use request::{ContentKind, MailRequest, MailSubmission};
pub use validator::validate;
