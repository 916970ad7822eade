//! Configuration management and environment variable loading

use crate::{DocbotError, Result};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Load environment variables from .env file
///
/// Looks in the current directory and its parents. A missing file is not an
/// error; a malformed one is.
///
/// # Example
///
/// ```no_run
/// use docbot_core::load_env;
///
/// load_env().ok();
/// let url = std::env::var("CHATBOT_API_URL").unwrap_or_default();
/// ```
pub fn load_env() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::info!("Loaded environment from: {}", path.display());
            Ok(())
        }
        Err(dotenvy::Error::LineParse(line, pos)) => Err(DocbotError::config(format!(
            "Failed to parse .env file at line {}, position {}",
            line, pos
        ))),
        Err(dotenvy::Error::Io(_)) => {
            tracing::warn!("No .env file found - using system environment variables only");
            Ok(())
        }
        Err(e) => Err(DocbotError::config(format!(
            "Failed to load .env file: {}",
            e
        ))),
    }
}

/// Load environment variables from a specific file
pub fn load_env_from_path<P: AsRef<Path>>(path: P) -> Result<()> {
    match dotenvy::from_path(path.as_ref()) {
        Ok(_) => {
            tracing::info!("Loaded environment from: {}", path.as_ref().display());
            Ok(())
        }
        Err(e) => Err(DocbotError::config(format!(
            "Failed to load {} environment file: {}",
            path.as_ref().display(),
            e
        ))),
    }
}

/// Get optional environment variable with default
pub fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get environment variable as boolean
pub fn get_env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|v| match v.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

/// Get environment variable as integer
pub fn get_env_int<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Contact details appended to offline fallback replies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactInfo {
    /// Phone number shown to users
    pub phone: String,
    /// Support email address
    pub email: String,
    /// Organisation name / postal address line
    pub address: String,
}

impl Default for ContactInfo {
    fn default() -> Self {
        Self {
            phone: "+1-555-0100".to_string(),
            email: "support@example.com".to_string(),
            address: "Docbot Support".to_string(),
        }
    }
}

/// Addresses and timeouts of the external backends the BFF talks to
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Chatbot query endpoint (full URL)
    pub chatbot_url: String,
    /// Timeout for chatbot queries
    pub chatbot_timeout: Duration,
    /// Timeout for the connection probe
    pub connection_test_timeout: Duration,
    /// Lead capture endpoint (full URL)
    pub lead_url: String,
    /// Upload service base URL; `/upload` is appended
    pub upload_base_url: String,
    /// Document service base URL
    pub document_base_url: String,
    /// Former document service base URL still found in stored links
    pub legacy_document_base_url: String,
    /// Contact details for fallback replies
    pub contact: ContactInfo,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            chatbot_url: "http://127.0.0.1:8080/query_response".to_string(),
            chatbot_timeout: Duration::from_millis(10_000),
            connection_test_timeout: Duration::from_millis(5_000),
            lead_url: "http://127.0.0.1:8080/generate_lead".to_string(),
            upload_base_url: "http://127.0.0.1:8000".to_string(),
            document_base_url: "http://127.0.0.1:8080".to_string(),
            legacy_document_base_url: "http://127.0.0.1:6000".to_string(),
            contact: ContactInfo::default(),
        }
    }
}

impl BackendConfig {
    /// Build from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            chatbot_url: get_env_or("CHATBOT_API_URL", &d.chatbot_url),
            chatbot_timeout: Duration::from_millis(get_env_int(
                "CHATBOT_API_TIMEOUT",
                d.chatbot_timeout.as_millis() as u64,
            )),
            connection_test_timeout: Duration::from_millis(get_env_int(
                "CHATBOT_CONNECTION_TEST_TIMEOUT",
                d.connection_test_timeout.as_millis() as u64,
            )),
            lead_url: get_env_or("LEAD_API_URL", &d.lead_url),
            upload_base_url: get_env_or("UPLOAD_BACKEND_URL", &d.upload_base_url),
            document_base_url: get_env_or("DOCUMENT_BACKEND_URL", &d.document_base_url),
            legacy_document_base_url: get_env_or(
                "LEGACY_DOCUMENT_BACKEND_URL",
                &d.legacy_document_base_url,
            ),
            contact: ContactInfo {
                phone: get_env_or("CONTACT_PHONE", &d.contact.phone),
                email: get_env_or("CONTACT_EMAIL", &d.contact.email),
                address: get_env_or("CONTACT_ADDRESS", &d.contact.address),
            },
        }
    }
}
