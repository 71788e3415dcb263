//! Secret service implementation.
//!
//! Resolves the Gemini credential from the process environment first and
//! `secret.json` second, caching the result for the life of the process.

use std::sync::Arc;

use advisor_core::config::{ApiKey, GeminiConfig, SecretConfig};
use advisor_core::error::Result;
use advisor_core::secret::SecretService;
use tokio::sync::RwLock;

use crate::storage::SecretStorage;

/// Environment variable consulted before `secret.json`.
pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// Service for loading secret configuration.
#[derive(Clone)]
pub struct SecretServiceImpl {
    /// Cached secret config loaded from storage.
    secrets: Arc<RwLock<Option<SecretConfig>>>,
    storage: Arc<SecretStorage>,
    env_key: Option<ApiKey>,
}

impl SecretServiceImpl {
    /// Uses the default `secret.json` path and the `GOOGLE_API_KEY` variable.
    pub fn from_env() -> Result<Self> {
        let storage = SecretStorage::new()?;
        let env_key = std::env::var(GOOGLE_API_KEY_VAR).ok().map(ApiKey::new);
        Ok(Self::new(storage).with_env_key(env_key))
    }

    /// Uses the given storage and no environment override.
    pub fn new(storage: SecretStorage) -> Self {
        Self {
            secrets: Arc::new(RwLock::new(None)),
            storage: Arc::new(storage),
            env_key: None,
        }
    }

    /// Sets the credential that takes precedence over the file.
    pub fn with_env_key(mut self, key: Option<ApiKey>) -> Self {
        self.env_key = key.filter(|key| !key.is_blank());
        self
    }

    fn load_secrets_internal(&self) -> Result<SecretConfig> {
        let mut loaded = if self.storage.exists() {
            self.storage.load()?
        } else {
            SecretConfig::default()
        };

        if let Some(key) = &self.env_key {
            tracing::debug!(source = GOOGLE_API_KEY_VAR, "Using API key from environment");
            let model_name = loaded.gemini.and_then(|gemini| gemini.model_name);
            loaded.gemini = Some(GeminiConfig {
                api_key: key.clone(),
                model_name,
            });
        }

        Ok(loaded)
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig> {
        {
            let cached = self.secrets.read().await;
            if let Some(ref secrets) = *cached {
                return Ok(secrets.clone());
            }
        }

        let loaded = self.load_secrets_internal()?;
        *self.secrets.write().await = Some(loaded.clone());
        Ok(loaded)
    }

    async fn secret_file_exists(&self) -> bool {
        self.env_key.is_some() || self.storage.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::AdvisorError;
    use tempfile::TempDir;

    fn storage_with(content: Option<&str>) -> (TempDir, SecretStorage) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        if let Some(content) = content {
            std::fs::write(&path, content).unwrap();
        }
        (temp_dir, SecretStorage::with_path(path))
    }

    #[tokio::test]
    async fn test_key_from_file() {
        let (_dir, storage) = storage_with(Some(r#"{"gemini":{"api_key":"file-key"}}"#));
        let service = SecretServiceImpl::new(storage);

        assert!(service.secret_file_exists().await);
        assert_eq!(service.gemini_api_key().await.unwrap().expose(), "file-key");
    }

    #[tokio::test]
    async fn test_env_key_takes_precedence() {
        let (_dir, storage) = storage_with(Some(
            r#"{"gemini":{"api_key":"file-key","model_name":"gemini-2.5-pro"}}"#,
        ));
        let service =
            SecretServiceImpl::new(storage).with_env_key(Some(ApiKey::new("env-key")));

        let secrets = service.load_secrets().await.unwrap();
        let gemini = secrets.gemini.unwrap();
        assert_eq!(gemini.api_key.expose(), "env-key");
        assert_eq!(gemini.model_name.as_deref(), Some("gemini-2.5-pro"));
    }

    #[tokio::test]
    async fn test_env_key_without_file() {
        let (_dir, storage) = storage_with(None);
        let service =
            SecretServiceImpl::new(storage).with_env_key(Some(ApiKey::new("env-key")));

        assert!(service.secret_file_exists().await);
        assert_eq!(service.gemini_api_key().await.unwrap().expose(), "env-key");
    }

    #[tokio::test]
    async fn test_missing_key_is_secret_error() {
        let (_dir, storage) = storage_with(Some(r#"{"gemini":{"api_key":"  "}}"#));
        let service = SecretServiceImpl::new(storage).with_env_key(Some(ApiKey::new("")));

        let err = service.gemini_api_key().await.unwrap_err();
        assert!(matches!(err, AdvisorError::Secret(_)));
    }

    #[tokio::test]
    async fn test_secrets_are_cached() {
        let (dir, storage) = storage_with(Some(r#"{"gemini":{"api_key":"first"}}"#));
        let service = SecretServiceImpl::new(storage);
        assert_eq!(service.gemini_api_key().await.unwrap().expose(), "first");

        std::fs::write(
            dir.path().join("secret.json"),
            r#"{"gemini":{"api_key":"second"}}"#,
        )
        .unwrap();
        assert_eq!(service.gemini_api_key().await.unwrap().expose(), "first");
    }
}
