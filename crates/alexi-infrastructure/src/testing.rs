//! Scripted HttpTransport for tests across the workspace.
//!
//! Responses are replayed in order, one per request, and every request is
//! recorded so tests can assert on how many were issued and with what body.

use alexi_core::error::{AlexiError, Result};
use alexi_core::transport::{Header, HttpResponse, HttpTransport};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub headers: Vec<Header>,
    pub body: Option<Value>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<Result<HttpResponse>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response with the given status and body.
    pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.push(Ok(HttpResponse::new(status, body)));
        self
    }

    /// Queues a JSON response.
    pub fn respond_json(self, status: u16, body: Value) -> Self {
        self.respond(status, body.to_string())
    }

    /// Queues a transport failure (no status).
    pub fn fail(self, message: &str) -> Self {
        self.push(Err(AlexiError::network(message)));
        self
    }

    pub fn push(&self, response: Result<HttpResponse>) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(response);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn next(&self, request: RecordedRequest) -> Result<HttpResponse> {
        let url = request.url.clone();
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| Err(AlexiError::network(format!("no scripted response for {}", url))))
    }
}

#[async_trait::async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, url: &str, headers: &[Header]) -> Result<HttpResponse> {
        self.next(RecordedRequest {
            method: "GET",
            url: url.to_string(),
            headers: headers.to_vec(),
            body: None,
        })
    }

    async fn post_json(&self, url: &str, headers: &[Header], body: &Value) -> Result<HttpResponse> {
        self.next(RecordedRequest {
            method: "POST",
            url: url.to_string(),
            headers: headers.to_vec(),
            body: Some(body.clone()),
        })
    }
}
