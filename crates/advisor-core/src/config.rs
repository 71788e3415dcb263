//! Configuration domain types.
//!
//! `config.toml` carries application settings; `secret.json` carries the
//! provider credential. Every settings field is optional and falls back to
//! its default.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::conversation::TransportConvention;
use crate::request::DEFAULT_MODEL;

/// Which wire adapter talks to the model.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TransportKind {
    /// Multi-turn `generateContent` endpoint.
    #[default]
    Gemini,
    /// Single flattened prompt with role markers.
    Flattened,
}

/// Retry settings for rate-limited calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts, the first one included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// One backoff time unit, in milliseconds. The n-th retry waits `2^n` units.
    #[serde(default = "default_backoff_unit_ms")]
    pub backoff_unit_ms: u64,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_backoff_unit_ms() -> u64 {
    1_000
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_unit_ms: default_backoff_unit_ms(),
        }
    }
}

/// Root of `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub transport: TransportKind,
    #[serde(default)]
    pub convention: TransportConvention,
    #[serde(default)]
    pub grounding: bool,
    /// Seed new sessions with an assistant greeting.
    #[serde(default = "default_greeting")]
    pub greeting: bool,
    #[serde(default)]
    pub retry: RetrySettings,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_greeting() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            transport: TransportKind::default(),
            convention: TransportConvention::default(),
            grounding: false,
            greeting: default_greeting(),
            retry: RetrySettings::default(),
        }
    }
}

/// A provider credential.
///
/// `Debug` and `Display` never print the value; use [`ApiKey::expose`] at the
/// one place the key goes on the wire.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Gemini API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: ApiKey,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Root of `secret.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}
