//! Provider wire formats
//!
//! Each provider expects the same logical message in its own request schema.
//! [`WireFormat`] turns a [`MailRequest`] into the bytes of that schema:
//!
//! - [`SendGridFormat`]: SendGrid v3 `mail/send` JSON
//! - [`MailgunFormat`]: Mailgun `messages` form encoding
//!
//! Building a payload is pure; validation has already happened upstream.

use super::ProviderId;
use crate::mail::{ContentKind, MailRequest};
use crate::Result;
use serde::Serialize;

/// Serialized request body for one provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WirePayload {
    bytes: Vec<u8>,
    content_type: &'static str,
}

impl WirePayload {
    pub fn new(bytes: Vec<u8>, content_type: &'static str) -> Self {
        Self {
            bytes,
            content_type,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Content type the bytes were encoded as
    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A provider request schema
pub trait WireFormat: Send + Sync {
    /// Content type of the encoded body
    fn content_type(&self) -> &'static str;

    /// Encode a mail request into this format
    fn encode(&self, request: &MailRequest) -> Result<Vec<u8>>;
}

/// Build the payload for the given provider
pub fn build_payload(request: &MailRequest, provider: ProviderId) -> Result<WirePayload> {
    let format = provider.wire_format();
    let bytes = format.encode(request)?;

    tracing::debug!(
        provider = %provider,
        bytes = bytes.len(),
        recipients = request.recipient_count(),
        "Built provider payload"
    );

    Ok(WirePayload::new(bytes, format.content_type()))
}

// ============================================================================
// SendGrid
// ============================================================================

/// SendGrid v3 JSON format
#[derive(Debug, Clone, Copy, Default)]
pub struct SendGridFormat;

#[derive(Debug, Serialize)]
struct SendGridMail<'a> {
    personalizations: [SendGridPersonalization<'a>; 1],
    from: SendGridAddress<'a>,
    subject: &'a str,
    content: [SendGridContent<'a>; 1],
}

#[derive(Debug, Serialize)]
struct SendGridPersonalization<'a> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    to: Vec<SendGridAddress<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cc: Vec<SendGridAddress<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    bcc: Vec<SendGridAddress<'a>>,
}

#[derive(Debug, Serialize)]
struct SendGridAddress<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct SendGridContent<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

fn sendgrid_addresses(addresses: &[String]) -> Vec<SendGridAddress<'_>> {
    addresses
        .iter()
        .map(|email| SendGridAddress { email })
        .collect()
}

impl WireFormat for SendGridFormat {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn encode(&self, request: &MailRequest) -> Result<Vec<u8>> {
        let mail = SendGridMail {
            personalizations: [SendGridPersonalization {
                to: sendgrid_addresses(&request.to),
                cc: sendgrid_addresses(&request.cc),
                bcc: sendgrid_addresses(&request.bcc),
            }],
            from: SendGridAddress {
                email: &request.from,
            },
            subject: &request.subject,
            content: [SendGridContent {
                kind: request.content.mime_type(),
                value: &request.text,
            }],
        };

        Ok(serde_json::to_vec(&mail)?)
    }
}

// ============================================================================
// Mailgun
// ============================================================================

/// Mailgun form-encoded format
#[derive(Debug, Clone, Copy, Default)]
pub struct MailgunFormat;

impl WireFormat for MailgunFormat {
    fn content_type(&self) -> &'static str {
        "application/x-www-form-urlencoded"
    }

    fn encode(&self, request: &MailRequest) -> Result<Vec<u8>> {
        let mut fields: Vec<(&str, &str)> = Vec::with_capacity(request.recipient_count() + 3);

        fields.push(("from", request.from.as_str()));
        fields.extend(request.to.iter().map(|a| ("to", a.as_str())));
        fields.extend(request.cc.iter().map(|a| ("cc", a.as_str())));
        fields.extend(request.bcc.iter().map(|a| ("bcc", a.as_str())));
        fields.push(("subject", request.subject.as_str()));

        let body_field = match request.content {
            ContentKind::Plain => "text",
            ContentKind::Html => "html",
        };
        fields.push((body_field, request.text.as_str()));

        let encoded = fields
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        Ok(encoded.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn request() -> MailRequest {
        MailRequest::new("a@x.com", "Hello there", "Line one & two")
            .to("b@x.com")
            .to("c@x.com")
            .bcc("d@x.com")
    }

    #[test]
    fn test_sendgrid_json() {
        let payload = build_payload(&request(), ProviderId::Primary).unwrap();
        assert_eq!(payload.content_type(), "application/json");

        let body: Value = serde_json::from_slice(payload.as_bytes()).unwrap();
        assert_eq!(
            body,
            json!({
                "personalizations": [{
                    "to": [{"email": "b@x.com"}, {"email": "c@x.com"}],
                    "bcc": [{"email": "d@x.com"}]
                }],
                "from": {"email": "a@x.com"},
                "subject": "Hello there",
                "content": [{"type": "text/plain", "value": "Line one & two"}]
            })
        );
    }

    #[test]
    fn test_sendgrid_html_content() {
        let request = MailRequest::new("a@x.com", "S", "<p>Hi</p>")
            .cc("b@x.com")
            .html();
        let payload = build_payload(&request, ProviderId::Primary).unwrap();

        let body: Value = serde_json::from_slice(payload.as_bytes()).unwrap();
        assert_eq!(body["content"][0]["type"], "text/html");
        assert_eq!(body["personalizations"][0]["cc"][0]["email"], "b@x.com");
        assert!(body["personalizations"][0].get("to").is_none());
    }

    #[test]
    fn test_mailgun_form() {
        let payload = build_payload(&request(), ProviderId::Secondary).unwrap();
        assert_eq!(payload.content_type(), "application/x-www-form-urlencoded");

        let body = String::from_utf8(payload.as_bytes().to_vec()).unwrap();
        assert_eq!(
            body,
            "from=a%40x.com&to=b%40x.com&to=c%40x.com&bcc=d%40x.com\
             &subject=Hello%20there&text=Line%20one%20%26%20two"
        );
    }

    #[test]
    fn test_mailgun_html_field() {
        let request = MailRequest::new("a@x.com", "S", "<b>x</b>").to("b@x.com").html();
        let payload = build_payload(&request, ProviderId::Secondary).unwrap();

        let body = String::from_utf8(payload.as_bytes().to_vec()).unwrap();
        assert!(body.ends_with("&html=%3Cb%3Ex%3C%2Fb%3E"));
        assert!(!body.contains("text="));
    }

    #[test]
    fn test_payload_len() {
        let payload = WirePayload::new(b"abc".to_vec(), "text/plain");
        assert_eq!(payload.len(), 3);
        assert!(!payload.is_empty());
    }
}
