//! Pass-through calls the BFF makes on behalf of the browser

use crate::config::BackendConfig;
use crate::types::LeadRequest;
use crate::upload::{build_form, normalize_upload_error, UploadItem};
use crate::{DocbotError, Result};
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{debug, warn};

/// Deadline for lead submissions
pub const LEAD_TIMEOUT: Duration = Duration::from_secs(10);
/// Deadline for multi-file uploads
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);
/// Deadline for document downloads
pub const DOCUMENT_TIMEOUT: Duration = Duration::from_secs(30);
/// Error text for any failed document download
pub const DOCUMENT_FETCH_FAILED: &str = "Failed to fetch document";

/// A document downloaded from the document backend
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// File contents
    pub bytes: Bytes,
    /// Upstream content type, `application/octet-stream` when absent
    pub content_type: String,
    /// Last segment of the requested path
    pub file_name: String,
}

/// Client for the chatbot, lead, upload and document backends
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    config: BackendConfig,
}

impl BackendClient {
    /// Create a client on the shared connection pool
    pub fn new(config: BackendConfig) -> Self {
        Self::with_http(super::shared_http_client(), config)
    }

    /// Create a client on a caller supplied `reqwest::Client`
    pub fn with_http(http: Client, config: BackendConfig) -> Self {
        Self { http, config }
    }

    /// Active configuration
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Forward a chat request body verbatim and return the backend JSON
    pub async fn forward_chat(&self, body: &JsonValue) -> Result<JsonValue> {
        let resp = self
            .http
            .post(&self.config.chatbot_url)
            .json(body)
            .timeout(self.config.chatbot_timeout)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            warn!("CHATBOT_PROXY_ERROR status={}", status.as_u16());
            return Err(DocbotError::upstream(
                status.as_u16(),
                format!("API error: {}", status.as_u16()),
            ));
        }
        Ok(resp.json().await?)
    }

    /// Submit a lead and return the backend JSON
    pub async fn submit_lead(&self, lead: &LeadRequest) -> Result<JsonValue> {
        let resp = self
            .http
            .post(&self.config.lead_url)
            .json(lead)
            .timeout(LEAD_TIMEOUT)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            warn!("LEAD_PROXY_ERROR status={}", status.as_u16());
            return Err(DocbotError::upstream(
                status.as_u16(),
                format!("Lead API error: {}", status.as_u16()),
            ));
        }
        Ok(resp.json().await?)
    }

    /// Upload endpoint derived from the configured base
    pub fn upload_url(&self) -> String {
        format!("{}/upload", self.config.upload_base_url.trim_end_matches('/'))
    }

    /// Send files with their descriptions as one multipart request
    pub async fn upload(&self, items: Vec<UploadItem>) -> Result<JsonValue> {
        let count = items.len();
        let form = build_form(items)?;
        debug!("Uploading {} file(s) to {}", count, self.upload_url());
        let resp = self
            .http
            .post(self.upload_url())
            .multipart(form)
            .timeout(UPLOAD_TIMEOUT)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = normalize_upload_error(&text);
            warn!(
                "UPLOAD_PROXY_ERROR status={} message={}",
                status.as_u16(),
                message
            );
            return Err(DocbotError::upstream(status.as_u16(), message));
        }
        Ok(resp.json().await?)
    }

    /// Absolute URL for a document path.
    ///
    /// Absolute URLs pointing at the legacy document backend are rewritten to
    /// the current one; relative paths are joined onto the current base with
    /// exactly one `/`.
    pub fn resolve_document_url(&self, path: &str) -> String {
        let base = self.config.document_base_url.trim_end_matches('/');
        if path.starts_with("http://") || path.starts_with("https://") {
            let legacy = self.config.legacy_document_base_url.trim_end_matches('/');
            match path.strip_prefix(legacy) {
                Some(rest) if !legacy.is_empty() => format!("{}{}", base, rest),
                _ => path.to_string(),
            }
        } else if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    /// Download a document through the document backend
    pub async fn fetch_document(&self, path: &str) -> Result<FetchedDocument> {
        let url = self.resolve_document_url(path);
        debug!("Fetching document {}", url);
        let resp = self
            .http
            .get(&url)
            .timeout(DOCUMENT_TIMEOUT)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            warn!("DOCUMENT_PROXY_ERROR status={} url={}", status.as_u16(), url);
            return Err(DocbotError::upstream(status.as_u16(), DOCUMENT_FETCH_FAILED));
        }
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = resp.bytes().await?;
        Ok(FetchedDocument {
            bytes,
            content_type,
            file_name: path.rsplit('/').next().unwrap_or(path).to_string(),
        })
    }
}
