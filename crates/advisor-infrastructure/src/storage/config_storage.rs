//! Application configuration file storage.
//!
//! Loads `config.toml`. A missing file means defaults; a malformed one is an
//! error rather than a silent fallback.

use std::path::{Path, PathBuf};

use advisor_core::AdvisorError;
use advisor_core::config::AppConfig;
use advisor_core::error::Result;

use crate::paths::AdvisorPaths;

pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    /// Creates a ConfigStorage with the default path.
    pub fn new() -> Result<Self> {
        let path = AdvisorPaths::config_file().map_err(|e| AdvisorError::config(e.to_string()))?;
        Ok(Self { path })
    }

    /// Creates a ConfigStorage with a custom path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<AppConfig> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No config file, using defaults");
                return Ok(AppConfig::default());
            }
            Err(e) => return Err(e.into()),
        };

        let config: AppConfig = toml::from_str(&content)?;
        if config.retry.max_attempts == 0 {
            return Err(AdvisorError::config("retry.max_attempts must be at least 1"));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::config::TransportKind;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let storage = ConfigStorage::with_path(temp_dir.path().join("config.toml"));
        assert_eq!(storage.load().await.unwrap(), AppConfig::default());
    }

    #[tokio::test]
    async fn test_loads_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "model = \"gemini-2.5-pro\"\ntransport = \"flattened\"\n").unwrap();

        let config = ConfigStorage::with_path(path).load().await.unwrap();
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.transport, TransportKind::Flattened);
    }

    #[tokio::test]
    async fn test_malformed_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "model = [unterminated").unwrap();

        let err = ConfigStorage::with_path(path).load().await.unwrap_err();
        assert!(matches!(err, AdvisorError::Serialization { .. }));
    }

    #[tokio::test]
    async fn test_zero_attempts_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[retry]\nmax_attempts = 0\n").unwrap();

        let err = ConfigStorage::with_path(path).load().await.unwrap_err();
        assert!(matches!(err, AdvisorError::Config(_)));
    }
}
