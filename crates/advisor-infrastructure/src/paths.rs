//! Path management for watch-advisor configuration files.
//!
//! ```text
//! ~/.config/watch-advisor/
//! ├── config.toml    # Application configuration
//! └── secret.json    # API keys
//! ```

use std::path::{Path, PathBuf};

use advisor_core::config::{ApiKey, GeminiConfig, SecretConfig};

const APP_DIR_NAME: &str = "watch-advisor";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for watch-advisor.
pub struct AdvisorPaths;

impl AdvisorPaths {
    /// Returns the configuration directory: `~/.config/watch-advisor`.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        let home = dirs::home_dir().ok_or(PathError::HomeDirNotFound)?;
        Ok(home.join(".config").join(APP_DIR_NAME))
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600) to prevent
    /// unauthorized access.
    pub fn secret_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("secret.json"))
    }

    /// Ensures the secret file exists, creating an empty template if it doesn't.
    ///
    /// On Unix the file is created with mode 600.
    pub fn ensure_secret_file() -> Result<PathBuf, std::io::Error> {
        let secret_path = Self::secret_file()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()))?;
        Self::write_secret_template(&secret_path)?;
        Ok(secret_path)
    }

    pub(crate) fn write_secret_template(secret_path: &Path) -> Result<(), std::io::Error> {
        if secret_path.exists() {
            return Ok(());
        }

        if let Some(parent) = secret_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template_config = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: ApiKey::new(String::new()),
                model_name: None,
            }),
        };

        let template_json =
            serde_json::to_string_pretty(&template_config).map_err(std::io::Error::other)?;
        std::fs::write(secret_path, template_json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(secret_path, permissions)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_live_under_config_dir() {
        let config_dir = AdvisorPaths::config_dir().unwrap();
        assert!(config_dir.ends_with(APP_DIR_NAME));

        let config_file = AdvisorPaths::config_file().unwrap();
        assert!(config_file.ends_with("config.toml"));
        assert!(config_file.starts_with(&config_dir));

        let secret_file = AdvisorPaths::secret_file().unwrap();
        assert!(secret_file.ends_with("secret.json"));
        assert!(secret_file.starts_with(&config_dir));
    }

    #[test]
    fn test_secret_template_has_blank_key() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("secret.json");
        AdvisorPaths::write_secret_template(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let config: SecretConfig = serde_json::from_str(&content).unwrap();
        assert!(config.gemini.unwrap().api_key.is_blank());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_secret_template_keeps_existing_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        std::fs::write(&path, r#"{"gemini":{"api_key":"kept"}}"#).unwrap();

        AdvisorPaths::write_secret_template(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("kept"));
    }
}
