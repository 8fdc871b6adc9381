//! HTTP transport port.
//!
//! Every outbound HTTP exchange (remote store, share links, completions) goes
//! through [`HttpTransport`]. Implementations report any answered request as
//! an [`HttpResponse`], whatever its status; only failures without a status
//! (DNS, connection refused, timeouts) are errors.

use serde_json::Value;

use crate::error::Result;

/// A header name/value pair.
pub type Header = (String, String);

/// A fully read HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issues a GET request and reads the body as text.
    ///
    /// Transport failures map to `AlexiError::Network`.
    async fn get(&self, url: &str, headers: &[Header]) -> Result<HttpResponse>;

    /// Issues a POST request with a JSON body and reads the body as text.
    ///
    /// Transport failures map to `AlexiError::Network`.
    async fn post_json(&self, url: &str, headers: &[Header], body: &Value) -> Result<HttpResponse>;
}

/// Builds an `Authorization: Bearer` header.
pub fn bearer(token: &str) -> Header {
    ("Authorization".to_string(), format!("Bearer {}", token))
}

/// Returns true when `body` is an HTML document rather than a JSON payload.
///
/// Sign-in and permission pages come back with a 200 status and an HTML body.
pub fn looks_like_html(body: &str) -> bool {
    let head: String = body.trim_start().chars().take(16).collect::<String>().to_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_html() {
        assert!(looks_like_html("<!DOCTYPE html><html></html>"));
        assert!(looks_like_html("\n  <html lang=\"en\">"));
        assert!(!looks_like_html("[{\"name\":\"a\"}]"));
        assert!(!looks_like_html("<persona/>"));
    }

    #[test]
    fn test_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
        assert!(!HttpResponse::new(302, "").is_success());
    }
}
