//! Configuration service implementation.
//!
//! Loads [`AppConfig`] from `~/.config/alexi/config.toml` and applies
//! environment overrides on top.
//!
//! Priority (highest first):
//! 1. Environment variables (`ALEXI_API_KEY`, `ALEXI_API_BASE_URL`, ...)
//! 2. `config.toml`
//! 3. Built-in defaults

use crate::paths::AlexiPaths;
use alexi_core::config::AppConfig;
use alexi_core::error::{AlexiError, Result};
use std::path::{Path, PathBuf};

pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    /// Creates a service reading the default config path.
    pub fn new() -> Result<Self> {
        let path = AlexiPaths::config_file().map_err(|e| AlexiError::config(e.to_string()))?;
        Ok(Self { path })
    }

    /// Creates a service with a custom config path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the file only, without environment overrides.
    ///
    /// A missing file yields defaults; an unreadable or malformed file is an error.
    pub fn load_file(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            tracing::debug!("[Config] No config file at {:?}, using defaults", self.path);
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let config: AppConfig = toml::from_str(&content).map_err(|e| {
            AlexiError::config(format!("Invalid config file {:?}: {}", self.path, e))
        })?;
        Ok(config)
    }

    /// Loads the file and applies process environment overrides.
    pub fn load(&self) -> Result<AppConfig> {
        let mut config = self.load_file()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));
        assert_eq!(service.load_file().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_loads_sections_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            [completion]
            api_key = "secret"
            max_attempts = 5

            [store]
            base_url = "https://store.example/api"
            "#,
        )
        .unwrap();

        let config = ConfigService::with_path(path).load_file().unwrap();
        assert_eq!(config.completion.api_key.as_deref(), Some("secret"));
        assert_eq!(config.completion.max_attempts, 5);
        assert_eq!(config.store.base_url, "https://store.example/api");
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[completion\nbroken").unwrap();

        let err = ConfigService::with_path(path).load_file().unwrap_err();
        assert!(matches!(err, AlexiError::Config(_)));
    }
}
