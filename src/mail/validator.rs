//! Mail request validation
//!
//! Structural checks run before any network activity. The checks are ordered:
//!
//! 1. missing sender (stops here)
//! 2. no recipient at all (stops here)
//! 3. address syntax for from, to, cc and bcc
//! 4. duplicate recipients across and within to, cc and bcc
//!
//! Providers reject duplicated recipients, so they are caught here rather
//! than surfacing as a provider rejection.

use super::address;
use super::MailRequest;
use std::collections::HashSet;

/// Validate a mail request
///
/// Returns the list of problems found; an empty list means the request is
/// valid.
pub fn validate(request: &MailRequest) -> Vec<String> {
    let mut errors = Vec::new();

    if request.from.is_empty() {
        tracing::error!("From email is missing in request");
        errors.push("From email is missing".to_string());
        return errors;
    }

    if !request.has_recipients() {
        tracing::error!("Recipient is missing in request");
        errors.push("To email is missing".to_string());
        return errors;
    }

    check_format(&mut errors, std::slice::from_ref(&request.from), "from");
    check_format(&mut errors, &request.to, "to");
    check_format(&mut errors, &request.cc, "cc");
    check_format(&mut errors, &request.bcc, "bcc");

    check_duplicates(&mut errors, request);

    if !errors.is_empty() {
        tracing::debug!(errors = errors.len(), "Mail request failed validation");
    }

    errors
}

fn check_format(errors: &mut Vec<String>, addresses: &[String], field: &str) {
    for addr in addresses {
        if !address::is_valid(addr) {
            errors.push(format!("'{}' email is invalid - {}", field, addr));
        }
    }
}

fn check_duplicates(errors: &mut Vec<String>, request: &MailRequest) {
    let mut to_seen: HashSet<&str> = HashSet::new();
    let mut cc_seen: HashSet<&str> = HashSet::new();
    let mut bcc_seen: HashSet<&str> = HashSet::new();
    let mut duplicates = Duplicates::default();

    for to in &request.to {
        if !to_seen.insert(to) {
            duplicates.push(to);
        }
    }

    for cc in &request.cc {
        let repeated = !cc_seen.insert(cc);
        if repeated || to_seen.contains(cc.as_str()) {
            duplicates.push(cc);
        }
    }

    for bcc in &request.bcc {
        let repeated = !bcc_seen.insert(bcc);
        if repeated || to_seen.contains(bcc.as_str()) || cc_seen.contains(bcc.as_str()) {
            duplicates.push(bcc);
        }
    }

    if !duplicates.is_empty() {
        errors.push(format!(
            "Email address in to, cc and bcc should be unique - {}",
            duplicates.join(",")
        ));
    }
}

/// Insertion-ordered set of duplicated addresses
#[derive(Default)]
struct Duplicates<'a> {
    seen: HashSet<&'a str>,
    ordered: Vec<&'a str>,
}

impl<'a> Duplicates<'a> {
    fn push(&mut self, addr: &'a str) {
        if self.seen.insert(addr) {
            self.ordered.push(addr);
        }
    }

    fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    fn join(&self, sep: &str) -> String {
        self.ordered.join(sep)
    }
}
