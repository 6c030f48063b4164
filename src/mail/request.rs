//! Outbound mail request types
//!
//! [`MailSubmission`] is the loosely-typed shape accepted at the inbound
//! boundary (every list may be absent). [`MailRequest`] is the normalized form
//! the delivery pipeline works on.

use serde::{Deserialize, Serialize};

/// Body content kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    #[default]
    Plain,
    Html,
}

impl ContentKind {
    /// Parse the submission `type` tag
    ///
    /// `html` and `text/html` (any case) select HTML; anything else is plain text.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(|t| t.trim().to_ascii_lowercase()) {
            Some(t) if t == "html" || t == "text/html" => ContentKind::Html,
            _ => ContentKind::Plain,
        }
    }

    /// MIME type of the body
    pub fn mime_type(self) -> &'static str {
        match self {
            ContentKind::Plain => "text/plain",
            ContentKind::Html => "text/html",
        }
    }
}

/// A mail submission as received from a client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MailSubmission {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<Vec<String>>,
    #[serde(default)]
    pub cc: Option<Vec<String>>,
    #[serde(default)]
    pub bcc: Option<Vec<String>>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "type")]
    pub content_type: Option<String>,
}

/// An outbound mail request
///
/// Immutable for the duration of one delivery attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailRequest {
    pub from: String,
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default)]
    pub cc: Vec<String>,
    #[serde(default)]
    pub bcc: Vec<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub content: ContentKind,
}

impl MailRequest {
    /// Create a new request with a sender, subject and body
    pub fn new(
        from: impl Into<String>,
        subject: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            subject: subject.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    /// Add a primary recipient
    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.to.push(address.into());
        self
    }

    /// Add a carbon-copy recipient
    pub fn cc(mut self, address: impl Into<String>) -> Self {
        self.cc.push(address.into());
        self
    }

    /// Add a blind carbon-copy recipient
    pub fn bcc(mut self, address: impl Into<String>) -> Self {
        self.bcc.push(address.into());
        self
    }

    /// Mark the body as HTML
    pub fn html(mut self) -> Self {
        self.content = ContentKind::Html;
        self
    }

    /// Whether any of to, cc or bcc has a recipient
    pub fn has_recipients(&self) -> bool {
        !(self.to.is_empty() && self.cc.is_empty() && self.bcc.is_empty())
    }

    /// Total number of recipients across to, cc and bcc
    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }
}

impl From<MailSubmission> for MailRequest {
    fn from(submission: MailSubmission) -> Self {
        Self {
            content: ContentKind::from_tag(submission.content_type.as_deref()),
            from: submission.from.unwrap_or_default(),
            to: submission.to.unwrap_or_default(),
            cc: submission.cc.unwrap_or_default(),
            bcc: submission.bcc.unwrap_or_default(),
            subject: submission.subject.unwrap_or_default(),
            text: submission.text.unwrap_or_default(),
        }
    }
}
