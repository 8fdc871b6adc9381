//! Share-link resolution.
//!
//! A user-supplied string is classified into one of three hosting shapes,
//! checked in this order:
//!
//! 1. An import token (`...?import=<id>`) or a hosted-bin URL
//!    (`.../b/<id>/latest`), fetched from the JSON-hosting backend.
//! 2. A cloud-drive file link (`/file/d/<id>`), fetched through the drive's
//!    direct-download endpoint.
//! 3. Any other http(s) URL, fetched as raw JSON.
//!
//! The resolver returns untyped persona-like records. Assigning ids and
//! custom flags is left to the importer.

use alexi_core::config::ShareConfig;
use alexi_core::error::{AlexiError, Result};
use alexi_core::persona::{BUNDLE_VERSION, Persona};
use alexi_core::transport::{HttpResponse, HttpTransport, looks_like_html};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use serde_json::{Value, json};
use std::sync::Arc;

static DRIVE_FILE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/file/d/([a-zA-Z0-9_-]+)").expect("drive file pattern is valid")
});

const PRIVATE_LINK_HINT: &str =
    "The linked file is not publicly accessible. Check its sharing settings and make the link public.";

/// A classified share link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareLink {
    HostedBin { bin_id: String },
    DriveFile { file_id: String },
    Direct { url: String },
}

impl ShareLink {
    /// Classifies `input`, failing with `InvalidFormat` when no shape matches.
    pub fn classify(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AlexiError::invalid_format("Share link is empty"));
        }

        if let Some(bin_id) = import_token(input).or_else(|| hosted_bin_id(input)) {
            return Ok(ShareLink::HostedBin { bin_id });
        }

        if let Some(captures) = DRIVE_FILE_PATTERN.captures(input) {
            return Ok(ShareLink::DriveFile {
                file_id: captures[1].to_string(),
            });
        }

        match Url::parse(input) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(ShareLink::Direct {
                url: input.to_string(),
            }),
            _ => Err(AlexiError::invalid_format(format!(
                "Unsupported share link '{}'. Use an import link, a cloud-drive file link or a JSON URL",
                input
            ))),
        }
    }
}

fn import_token(input: &str) -> Option<String> {
    let (_, query) = input.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "import")
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn hosted_bin_id(input: &str) -> Option<String> {
    let url = Url::parse(input).ok()?;
    if !url.host_str()?.ends_with("jsonbin.io") {
        return None;
    }
    let segments: Vec<&str> = url.path_segments()?.collect();
    let position = segments.iter().position(|s| *s == "b")?;
    segments
        .get(position + 1)
        .filter(|id| !id.is_empty())
        .map(|id| id.to_string())
}

/// Fetches persona records behind share links and publishes new ones.
pub struct LinkResolver {
    transport: Arc<dyn HttpTransport>,
    config: ShareConfig,
}

impl LinkResolver {
    pub fn new(config: ShareConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport, config }
    }

    /// URL the payload of `link` is downloaded from.
    pub fn fetch_url(&self, link: &ShareLink) -> String {
        match link {
            ShareLink::HostedBin { bin_id } => format!(
                "{}/{}/latest",
                self.config.bin_base_url.trim_end_matches('/'),
                bin_id
            ),
            ShareLink::DriveFile { file_id } => format!(
                "{}?export=download&id={}",
                self.config.drive_download_url, file_id
            ),
            ShareLink::Direct { url } => url.clone(),
        }
    }

    /// Resolves `input` into the raw persona records it points at.
    pub async fn resolve(&self, input: &str) -> Result<Vec<Value>> {
        let link = ShareLink::classify(input)?;
        let url = self.fetch_url(&link);
        tracing::info!("[LinkResolver] Resolving {:?} via {}", link, url);

        let response = self.transport.get(&url, &[]).await?;
        let payload = parse_payload(&response)?;

        let records = match link {
            ShareLink::HostedBin { .. } => bin_records(payload)?,
            ShareLink::DriveFile { .. } | ShareLink::Direct { .. } => match payload {
                Value::Array(records) => records,
                _ => {
                    return Err(AlexiError::invalid_format(
                        "Linked file must contain a JSON array of personas",
                    ));
                }
            },
        };

        tracing::info!("[LinkResolver] Resolved {} records", records.len());
        Ok(records)
    }

    /// Uploads `personas` to the JSON-hosting backend and returns an import link.
    ///
    /// Returns `None` on any failure; sharing is a convenience action.
    pub async fn create_shareable_link(&self, personas: &[Persona]) -> Option<String> {
        match self.upload(personas).await {
            Ok(bin_id) => {
                let link = format!(
                    "{}?import={}",
                    self.config.app_origin.trim_end_matches('/'),
                    bin_id
                );
                tracing::info!("[LinkResolver] Created share link {}", link);
                Some(link)
            }
            Err(e) => {
                tracing::warn!("[LinkResolver] Failed to create share link: {}", e);
                None
            }
        }
    }

    async fn upload(&self, personas: &[Persona]) -> Result<String> {
        let body = json!({
            "personas": personas,
            "timestamp": Utc::now().timestamp_millis(),
            "version": BUNDLE_VERSION,
        });
        let headers = [("X-Bin-Name".to_string(), self.config.bin_name.clone())];

        let response = self
            .transport
            .post_json(&self.config.bin_base_url, &headers, &body)
            .await?;
        if !response.is_success() {
            return Err(AlexiError::upstream(response.status, response.body, 1));
        }

        let value: Value = serde_json::from_str(&response.body)
            .map_err(|e| AlexiError::malformed(format!("Upload response is not JSON: {}", e)))?;
        value
            .pointer("/metadata/id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AlexiError::malformed("Upload response has no metadata.id"))
    }
}

/// Classifies the HTTP answer and parses its body as JSON.
fn parse_payload(response: &HttpResponse) -> Result<Value> {
    match response.status {
        401 | 403 => return Err(AlexiError::permission_denied(PRIVATE_LINK_HINT)),
        404 => return Err(AlexiError::not_found("share link", "linked file")),
        status if !(200..300).contains(&status) => {
            return Err(AlexiError::upstream(status, response.body.clone(), 1));
        }
        _ => {}
    }

    if looks_like_html(&response.body) {
        return Err(AlexiError::permission_denied(PRIVATE_LINK_HINT));
    }

    serde_json::from_str(&response.body)
        .map_err(|e| AlexiError::invalid_format(format!("Linked file is not valid JSON: {}", e)))
}

/// Unwraps the hosted-bin envelope down to its `personas` array.
fn bin_records(mut payload: Value) -> Result<Vec<Value>> {
    if let Some(record) = payload.get_mut("record") {
        payload = record.take();
    }
    match payload.get_mut("personas").map(Value::take) {
        Some(Value::Array(records)) => Ok(records),
        _ => Err(AlexiError::invalid_format(
            "Shared bundle does not contain a personas array",
        )),
    }
}
