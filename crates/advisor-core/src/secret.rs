//! Secret management service trait.
//!
//! Defines the interface for loading the provider credential.

use crate::config::{ApiKey, SecretConfig};
use crate::error::{AdvisorError, Result};

/// Service for managing secret configuration.
///
/// # Security Note
///
/// Implementations should ensure that:
/// - Secret files have appropriate permissions (e.g., 600 on Unix)
/// - Secrets are never logged or exposed in error messages
/// - Hard-coded keys are never used as a fallback
#[async_trait::async_trait]
pub trait SecretService: Send + Sync {
    /// Loads the secret configuration.
    async fn load_secrets(&self) -> Result<SecretConfig>;

    /// Checks if a secret source is available.
    async fn secret_file_exists(&self) -> bool;

    /// Returns the Gemini API key, failing when none is configured.
    async fn gemini_api_key(&self) -> Result<ApiKey> {
        let secrets = self.load_secrets().await?;
        secrets
            .gemini
            .map(|gemini| gemini.api_key)
            .filter(|key| !key.is_blank())
            .ok_or_else(|| {
                AdvisorError::secret(
                    "Missing Google API key. Set GOOGLE_API_KEY or add it to secret.json",
                )
            })
    }
}
