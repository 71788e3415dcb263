//! Outcome of one resilient call.

use serde::{Deserialize, Serialize};

/// Prefix that marks diagnostics so they read differently from model answers.
pub const WARNING_MARKER: &str = "⚠️";

pub const MAX_RETRIES_EXCEEDED: &str = "max retries exceeded";
pub const NO_USABLE_RESPONSE: &str = "no usable response";

/// Tagged outcome produced once per user turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CallResult {
    /// The model answered with non-empty text.
    Success { text: String },
    /// The reply was withheld by the provider's safety filter.
    ///
    /// `rephrased_text` holds the answer to the single neutral rephrase
    /// attempt, when that attempt produced text.
    Blocked {
        reason: String,
        rephrased_text: Option<String>,
    },
    /// The call failed; `error_detail` never contains the credential.
    Failure { error_detail: String },
}

impl CallResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self::Success { text: text.into() }
    }

    pub fn blocked(reason: impl Into<String>, rephrased_text: Option<String>) -> Self {
        Self::Blocked {
            reason: reason.into(),
            rephrased_text,
        }
    }

    pub fn failure(error_detail: impl Into<String>) -> Self {
        Self::Failure {
            error_detail: error_detail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// Text recorded as the assistant turn and shown to the user.
    ///
    /// Never empty. Anything other than a plain success starts with
    /// [`WARNING_MARKER`].
    pub fn display_text(&self) -> String {
        match self {
            Self::Success { text } => text.clone(),
            Self::Blocked {
                reason,
                rephrased_text: Some(text),
            } => format!(
                "{WARNING_MARKER} The original answer was withheld by the safety filter ({reason}). \
                 Here is a neutral restatement:\n\n{text}"
            ),
            Self::Blocked {
                reason,
                rephrased_text: None,
            } => format!(
                "{WARNING_MARKER} The response was blocked by the safety filter ({reason}). \
                 Please try rephrasing your question."
            ),
            Self::Failure { error_detail } => {
                format!("{WARNING_MARKER} Error calling the model: {error_detail}")
            }
        }
    }
}
