//! Application configuration model.
//!
//! Loaded from `config.toml` by the infrastructure layer; every field has a
//! default so a missing or partial file is valid. Environment variables are
//! applied on top (see [`AppConfig::apply_overrides`]).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_API_KEY: &str = "ALEXI_API_KEY";
pub const ENV_API_BASE_URL: &str = "ALEXI_API_BASE_URL";
pub const ENV_MODEL: &str = "ALEXI_MODEL";
pub const ENV_STORE_URL: &str = "ALEXI_STORE_URL";
pub const ENV_CACHE_DIR: &str = "ALEXI_CACHE_DIR";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub completion: CompletionConfig,
    pub store: StoreConfig,
    pub share: ShareConfig,
    pub cache: CacheConfig,
}

/// Completion endpoint settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CompletionConfig {
    /// Base URL of the completion proxy (without `/v1/...`)
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001/api/albert".to_string(),
            api_key: None,
            model: "albert-large".to_string(),
            max_tokens: 2000,
            temperature: 0.7,
            max_attempts: 3,
            retry_delay_ms: 1000,
            request_timeout_secs: 60,
        }
    }
}

/// Remote persona store settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub base_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001/api".to_string(),
        }
    }
}

/// Share-link backends.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ShareConfig {
    /// JSON-hosting backend collection endpoint
    pub bin_base_url: String,
    /// Cloud-drive direct download endpoint
    pub drive_download_url: String,
    /// Origin used to build `?import=<id>` links
    pub app_origin: String,
    pub bin_name: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            bin_base_url: "https://api.jsonbin.io/v3/b".to_string(),
            drive_download_url: "https://drive.google.com/uc".to_string(),
            app_origin: "http://localhost:5173".to_string(),
            bin_name: "alexi-personas-backup".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Overrides the platform cache directory
    pub dir: Option<PathBuf>,
}

impl AppConfig {
    /// Applies environment overrides through `lookup`.
    ///
    /// Takes a lookup function instead of reading `std::env` directly so the
    /// precedence can be tested without mutating the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = lookup(ENV_API_KEY) {
            self.completion.api_key = Some(key);
        }
        if let Some(url) = lookup(ENV_API_BASE_URL) {
            self.completion.base_url = url;
        }
        if let Some(model) = lookup(ENV_MODEL) {
            self.completion.model = model;
        }
        if let Some(url) = lookup(ENV_STORE_URL) {
            self.store.base_url = url;
        }
        if let Some(dir) = lookup(ENV_CACHE_DIR) {
            self.cache.dir = Some(PathBuf::from(dir));
        }
    }
}
