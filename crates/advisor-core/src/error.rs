//! Error types for the watch advisor.

use thiserror::Error;

/// A shared error type for the advisor domain.
///
/// Remote-call failures never surface here: the resilient caller converts
/// them into a [`crate::result::CallResult`]. This type covers programmer
/// errors (bad roles, empty input) and local plumbing (config, secrets, I/O).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdvisorError {
    /// A turn role that the conversation model does not recognize,
    /// or an attempt to append an instruction turn directly.
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    /// The UI handed over an empty user message.
    #[error("User message must not be empty")]
    EmptyInput,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential loading error (message never contains the credential)
    #[error("Secret error: {0}")]
    Secret(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },
}

impl AdvisorError {
    /// Creates an InvalidRole error
    pub fn invalid_role(role: impl Into<String>) -> Self {
        Self::InvalidRole(role.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Secret error
    pub fn secret(message: impl Into<String>) -> Self {
        Self::Secret(message.into())
    }

    /// Check if this is an InvalidRole error
    pub fn is_invalid_role(&self) -> bool {
        matches!(self, Self::InvalidRole(_))
    }
}

impl From<std::io::Error> for AdvisorError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for AdvisorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for AdvisorError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, AdvisorError>`.
pub type Result<T> = std::result::Result<T, AdvisorError>;
