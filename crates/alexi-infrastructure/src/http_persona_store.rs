//! HTTP client for the remote persona store.
//!
//! `GET {base}/personas` returns the stored collection (or an empty shape),
//! `POST {base}/personas` replaces it. The store answers HTTP 400 for
//! collections that break the field limits, so the same limits are checked
//! locally before anything leaves the device.

use alexi_core::error::{AlexiError, Result};
use alexi_core::persona::limits::validate_collection;
use alexi_core::persona::{PersonaCollection, RemotePersonaStore};
use alexi_core::transport::{HttpResponse, HttpTransport};
use serde::Deserialize;
use std::sync::Arc;

pub struct HttpRemotePersonaStore {
    transport: Arc<dyn HttpTransport>,
    endpoint: String,
}

impl HttpRemotePersonaStore {
    pub fn new(base_url: &str, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            endpoint: format!("{}/personas", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Deserialize)]
struct StoreError {
    error: String,
}

fn error_message(response: &HttpResponse) -> String {
    serde_json::from_str::<StoreError>(&response.body)
        .map(|e| e.error)
        .unwrap_or_else(|_| response.body.clone())
}

#[async_trait::async_trait]
impl RemotePersonaStore for HttpRemotePersonaStore {
    async fn fetch(&self) -> Result<PersonaCollection> {
        let response = self.transport.get(&self.endpoint, &[]).await?;
        if !response.is_success() {
            return Err(AlexiError::upstream(response.status, error_message(&response), 1));
        }

        if response.body.trim().is_empty() {
            return Ok(PersonaCollection::empty());
        }

        let collection: PersonaCollection = serde_json::from_str(&response.body)
            .map_err(|e| AlexiError::malformed(format!("Persona store returned invalid JSON: {}", e)))?;
        tracing::debug!(
            "[RemoteStore] Fetched {} personas",
            collection.personas.len()
        );
        Ok(collection)
    }

    async fn push(&self, collection: &PersonaCollection) -> Result<()> {
        validate_collection(collection)
            .map_err(|e| AlexiError::invalid_format(e.to_string()))?;

        let body = serde_json::to_value(collection)?;
        let response = self.transport.post_json(&self.endpoint, &[], &body).await?;

        match response.status {
            status if (200..300).contains(&status) => {
                tracing::debug!(
                    "[RemoteStore] Pushed {} personas",
                    collection.personas.len()
                );
                Ok(())
            }
            400 => Err(AlexiError::invalid_format(error_message(&response))),
            status => Err(AlexiError::upstream(status, error_message(&response), 1)),
        }
    }
}
