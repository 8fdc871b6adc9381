//! Composition root: config, stores, transport and the coordinator.

use alexi_application::PersonaSyncCoordinator;
use alexi_core::config::AppConfig;
use alexi_core::transport::HttpTransport;
use alexi_infrastructure::{
    ConfigService, FileLocalCache, HttpRemotePersonaStore, LinkResolver, ReqwestTransport,
};
use alexi_interaction::ChatCompletionClient;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub struct App {
    pub config: AppConfig,
    pub personas: Arc<PersonaSyncCoordinator>,
    transport: Arc<dyn HttpTransport>,
}

impl App {
    /// Loads configuration, wires the adapters and runs the initial sync.
    pub async fn bootstrap(config_path: Option<PathBuf>) -> Result<Self> {
        let config_service = match config_path {
            Some(path) => ConfigService::with_path(path),
            None => ConfigService::new()?,
        };
        let config = config_service
            .load()
            .with_context(|| format!("Failed to load {:?}", config_service.path()))?;

        let cache = match &config.cache.dir {
            Some(dir) => FileLocalCache::new(dir.clone()),
            None => FileLocalCache::default_location()?,
        };
        tracing::debug!("[App] LocalCache at {:?}", cache.dir());

        let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::with_timeout(
            Duration::from_secs(config.completion.request_timeout_secs),
        )?);
        let remote = HttpRemotePersonaStore::new(&config.store.base_url, Arc::clone(&transport));

        let personas = Arc::new(PersonaSyncCoordinator::new(Arc::new(cache), Arc::new(remote)));
        personas.load().await;

        Ok(Self {
            config,
            personas,
            transport,
        })
    }

    pub fn link_resolver(&self) -> LinkResolver {
        LinkResolver::new(self.config.share.clone(), Arc::clone(&self.transport))
    }

    pub fn completion_client(&self) -> Result<ChatCompletionClient> {
        Ok(ChatCompletionClient::from_config(
            &self.config.completion,
            Arc::clone(&self.transport),
        )?)
    }

    /// Lets background remote pushes finish before the process exits.
    pub async fn shutdown(&self) {
        self.personas.flush_remote().await;
    }
}
