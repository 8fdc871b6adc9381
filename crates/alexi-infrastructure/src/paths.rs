//! Unified path management for alexi configuration and cache files.
//!
//! Paths are resolved through the `dirs` crate so they follow platform
//! conventions (XDG on Linux, Application Support on macOS, AppData on Windows).

use std::path::PathBuf;

const APP_DIR: &str = "alexi";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Config directory could not be determined.
    ConfigDirNotFound,
    /// Data directory could not be determined.
    DataDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
            PathError::DataDirNotFound => write!(f, "Cannot find data directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for alexi.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/alexi/             # Config directory
/// └── config.toml              # Application configuration
///
/// ~/.local/share/alexi/        # Data directory
/// └── cache/                   # LocalCache entries (one JSON file per key)
/// ```
pub struct AlexiPaths;

impl AlexiPaths {
    /// Returns the alexi configuration directory (e.g. `~/.config/alexi/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the alexi data directory (e.g. `~/.local/share/alexi/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::DataDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the directory backing the on-device LocalCache.
    pub fn cache_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("cache"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_namespaced() {
        if let Ok(config_file) = AlexiPaths::config_file() {
            assert!(config_file.ends_with("alexi/config.toml"));
        }
        if let Ok(cache_dir) = AlexiPaths::cache_dir() {
            assert!(cache_dir.ends_with("alexi/cache"));
        }
    }
}
