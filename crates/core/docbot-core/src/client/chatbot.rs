//! Chatbot query client

use super::store::{KeyValueStore, USER_ID_KEY};
use crate::config::{BackendConfig, ContactInfo};
use crate::documents::references_from_urls;
use crate::fallback::{fallback_reply, FailureKind};
use crate::types::{ChatbotReply, ChatbotRequest, DocumentReference, Message};
use crate::{DocbotError, Result};
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Text used when the backend answers without any text
pub const NO_RESPONSE: &str = "No response received";
/// Error text for an elapsed query deadline
pub const TIMEOUT_MESSAGE: &str = "Request timeout. Please try again.";
/// Query sent by the connection probe
pub const CONNECTION_TEST_QUERY: &str = "test connection";

/// Where and how long to wait for the chatbot backend
#[derive(Debug, Clone)]
pub struct ChatbotClientConfig {
    /// Query endpoint
    pub api_url: String,
    /// Deadline for a query
    pub timeout: Duration,
    /// Deadline for the connection probe
    pub connection_test_timeout: Duration,
}

impl Default for ChatbotClientConfig {
    fn default() -> Self {
        Self::from(&BackendConfig::default())
    }
}

impl From<&BackendConfig> for ChatbotClientConfig {
    fn from(config: &BackendConfig) -> Self {
        Self {
            api_url: config.chatbot_url.clone(),
            timeout: config.chatbot_timeout,
            connection_test_timeout: config.connection_test_timeout,
        }
    }
}

/// Sends user questions to the chatbot backend.
///
/// The conversation owner id handed out by the backend is kept in the
/// injected [`KeyValueStore`] and sent back with every later query.
pub struct ChatbotClient {
    http: Client,
    config: ChatbotClientConfig,
    store: Arc<dyn KeyValueStore>,
}

impl ChatbotClient {
    /// Create a client on the shared connection pool
    pub fn new(config: ChatbotClientConfig, store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_http(super::shared_http_client(), config, store)
    }

    /// Create a client on a caller supplied `reqwest::Client`
    pub fn with_http(
        http: Client,
        config: ChatbotClientConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            http,
            config,
            store,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ChatbotClientConfig {
        &self.config
    }

    /// Ask the backend and normalize its answer
    pub async fn send_query(&self, query: &str) -> Result<ChatbotReply> {
        let request = ChatbotRequest {
            user_query: query.to_string(),
            user_id: self.store.get(USER_ID_KEY),
        };
        debug!(
            "Sending chatbot query ({} chars, user_id={:?})",
            query.len(),
            request.user_id
        );

        match self.query(&request).await {
            Ok(reply) => {
                if let Some(id) = reply.user_id.as_deref() {
                    self.store.set(USER_ID_KEY, id);
                }
                Ok(reply)
            }
            Err(e) => {
                error!("Chatbot query failed: {}", e);
                Err(e)
            }
        }
    }

    async fn query(&self, request: &ChatbotRequest) -> Result<ChatbotReply> {
        let resp = self
            .http
            .post(&self.config.api_url)
            .json(request)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(request_failure)?;

        let status = resp.status();
        if !status.is_success() {
            let message = format!(
                "API error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            );
            return Err(DocbotError::upstream(
                status.as_u16(),
                message.trim_end(),
            ));
        }

        let body: JsonValue = resp.json().await.map_err(request_failure)?;
        Ok(normalize_reply(&body))
    }

    /// Probe the backend; `true` only for a 2xx answer
    pub async fn test_connection(&self) -> bool {
        let request = ChatbotRequest {
            user_query: CONNECTION_TEST_QUERY.to_string(),
            user_id: None,
        };
        match self
            .http
            .post(&self.config.api_url)
            .json(&request)
            .timeout(self.config.connection_test_timeout)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!("Connection test failed: {}", e);
                false
            }
        }
    }

    /// Assistant message for `query`; failures produce an offline reply
    /// built from `contact` instead of an error
    pub async fn ask(&self, query: &str, contact: &ContactInfo) -> Message {
        match self.send_query(query).await {
            Ok(reply) => {
                let mut docs: Vec<DocumentReference> = reply.related_documents;
                docs.extend(references_from_urls(&reply.doc_urls));
                let mut message = Message::assistant(reply.response);
                if !docs.is_empty() {
                    message.related_documents = Some(docs);
                }
                message
            }
            Err(e) => {
                let kind = FailureKind::of(&e);
                debug!("Using {:?} fallback reply", kind);
                Message::assistant(fallback_reply(kind, query, contact))
            }
        }
    }
}

fn request_failure(e: reqwest::Error) -> DocbotError {
    if e.is_timeout() {
        DocbotError::timeout(TIMEOUT_MESSAGE)
    } else {
        DocbotError::Network(e)
    }
}

/// User facing text for a failed query
pub fn failure_message(err: &DocbotError) -> String {
    match err {
        DocbotError::Timeout(msg) => msg.clone(),
        DocbotError::Upstream { message, .. } => format!("Failed to get response: {}", message),
        other => format!("Failed to get response: {}", other),
    }
}

/// Map a raw backend answer onto [`ChatbotReply`].
///
/// Accepts both field spellings the backend has used over time
/// (`related_documents`/`documents`, `document_id`/`id` and so on).
pub fn normalize_reply(body: &JsonValue) -> ChatbotReply {
    let response = ["response", "answer"]
        .iter()
        .filter_map(|k| body.get(*k).and_then(JsonValue::as_str))
        .find(|s| !s.is_empty())
        .unwrap_or(NO_RESPONSE)
        .to_string();

    let related_documents = ["related_documents", "documents"]
        .iter()
        .find_map(|k| body.get(*k).and_then(JsonValue::as_array))
        .map(|docs| docs.iter().map(document_reference).collect())
        .unwrap_or_default();

    let doc_urls = body
        .get("doc_urls")
        .and_then(JsonValue::as_array)
        .map(|urls| {
            urls.iter()
                .filter_map(JsonValue::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    ChatbotReply {
        response,
        related_documents,
        doc_urls,
        lead_flag: body
            .get("lead_flag")
            .and_then(JsonValue::as_bool)
            .unwrap_or(false),
        user_id: body.get("user_id").and_then(scalar_text),
    }
}

fn document_reference(doc: &JsonValue) -> DocumentReference {
    let field = |keys: [&str; 2]| {
        keys.iter()
            .find_map(|k| doc.get(*k).and_then(scalar_text))
            .unwrap_or_default()
    };
    DocumentReference {
        document_id: field(["document_id", "id"]),
        document_name: field(["document_name", "name"]),
        download_url: field(["download_url", "url"]),
    }
}

fn scalar_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
