//! reqwest-backed HttpTransport.

use alexi_core::error::{AlexiError, Result};
use alexi_core::transport::{Header, HttpResponse, HttpTransport};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Creates a transport whose requests time out after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AlexiError::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    async fn execute(&self, request: RequestBuilder, url: &str) -> Result<HttpResponse> {
        let response = request
            .send()
            .await
            .map_err(|err| AlexiError::network(format!("Request to {} failed: {}", url, err)))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|err| {
            AlexiError::network(format!("Failed to read response body from {}: {}", url, err))
        })?;

        Ok(HttpResponse { status, body })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn with_headers(mut request: RequestBuilder, headers: &[Header]) -> RequestBuilder {
    for (name, value) in headers {
        request = request.header(name.as_str(), value.as_str());
    }
    request
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &[Header]) -> Result<HttpResponse> {
        let request = with_headers(self.client.get(url), headers);
        self.execute(request, url).await
    }

    async fn post_json(&self, url: &str, headers: &[Header], body: &Value) -> Result<HttpResponse> {
        let request = with_headers(self.client.post(url), headers)
            .header("content-type", "application/json")
            .json(body);
        self.execute(request, url).await
    }
}
