//! Transport boundary.
//!
//! Every model SDK or wire variant is wrapped by one [`ChatTransport`]
//! adapter that returns a [`RawReply`]. Adapters only translate shapes; deciding
//! what a reply means (text, blocked, unusable) happens once, in
//! [`crate::normalize`].

use std::time::Duration;

use advisor_core::ChatRequest;
use async_trait::async_trait;
use thiserror::Error;

/// Reply as the transport returned it, before normalization.
///
/// Each field mirrors one response shape seen across SDK variants; an
/// adapter fills whichever fields its wire format carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawReply {
    /// A direct text field on the response object.
    pub text: Option<String>,
    /// Candidate list, each with a finish status and content fragments.
    pub candidates: Vec<RawCandidate>,
    /// Output item list, each with an optional content field.
    pub output: Vec<RawOutputItem>,
    /// Prompt-level block signal (e.g. `promptFeedback.blockReason`).
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCandidate {
    pub finish_reason: Option<String>,
    /// Text of each content part; non-text parts appear as empty strings.
    pub fragments: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutputItem {
    pub content: Option<String>,
}

impl RawReply {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn blocked(reason: impl Into<String>) -> Self {
        Self {
            block_reason: Some(reason.into()),
            ..Self::default()
        }
    }
}

/// Failure reported by a transport.
///
/// A content block is not an error: it arrives as a [`RawReply`] carrying a
/// block signal. Messages never contain the credential.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Too many requests; the caller backs off and retries.
    #[error("rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    /// The credential was rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Any other non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never got a response.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be understood.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

impl TransportError {
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

/// A remote chat model.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Short adapter name for logs.
    fn name(&self) -> &str;

    /// Sends one request and returns the raw reply.
    async fn send_conversation(&self, request: &ChatRequest) -> Result<RawReply, TransportError>;
}

/// Replaces every occurrence of `secret` in `message`.
pub fn redact(message: &str, secret: &str) -> String {
    if secret.is_empty() {
        return message.to_string();
    }
    message.replace(secret, "***")
}
