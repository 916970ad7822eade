//! HTTP clients for the chatbot and its companion backends

pub mod backend;
pub mod chatbot;
pub mod store;

pub use backend::{BackendClient, FetchedDocument};
pub use chatbot::{failure_message, normalize_reply, ChatbotClient, ChatbotClientConfig};
pub use store::{KeyValueStore, MemoryStore, USER_ID_KEY};

use reqwest::Client;
use std::sync::OnceLock;
use std::time::Duration;

/// Shared HTTP client for connection pooling
static HTTP_CLIENT: OnceLock<Client> = OnceLock::new();

/// Get or initialize the shared HTTP client.
///
/// No client-wide timeout is set; every call applies its own deadline.
pub fn shared_http_client() -> Client {
    HTTP_CLIENT
        .get_or_init(|| {
            Client::builder()
                .pool_max_idle_per_host(50)
                .pool_idle_timeout(Duration::from_secs(300))
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .expect("Failed to create HTTP client")
        })
        .clone()
}
