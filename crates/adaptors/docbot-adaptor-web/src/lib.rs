//! Docbot web adaptor
//!
//! Backend-for-frontend HTTP layer for the docbot chat UI. It proxies the
//! chatbot, lead, upload and document backends, serves the document library
//! and exposes the response formatter.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod handlers;
pub mod state;

pub use handlers::ApiError;
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use docbot_core::config::{get_env_bool, get_env_int, get_env_or};
use docbot_core::upload::PROXY_FILE_LIMIT_MB;
use docbot_core::{BackendConfig, DocbotError, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Web adaptor configuration
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Enable permissive CORS
    pub enable_cors: bool,

    /// Per-file limit for `/api/upload`, in MB
    pub max_upload_mb: u64,

    /// Limit for any request body, in MB
    pub max_body_mb: u64,

    /// JSON file used to seed the document library
    pub catalog_path: Option<PathBuf>,

    /// Backend addresses
    pub backend: BackendConfig,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            enable_cors: true,
            max_upload_mb: PROXY_FILE_LIMIT_MB,
            max_body_mb: 128,
            catalog_path: None,
            backend: BackendConfig::default(),
        }
    }
}

impl WebConfig {
    /// Build from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            host: get_env_or("DOCBOT_WEB_HOST", &d.host),
            port: get_env_int("DOCBOT_WEB_PORT", d.port),
            enable_cors: get_env_bool("DOCBOT_CORS_ENABLED", d.enable_cors),
            max_upload_mb: get_env_int("DOCBOT_UPLOAD_LIMIT_MB", d.max_upload_mb),
            max_body_mb: get_env_int("DOCBOT_MAX_BODY_MB", d.max_body_mb),
            catalog_path: std::env::var("DOCUMENT_CATALOG_PATH")
                .ok()
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            backend: BackendConfig::from_env(),
        }
    }

    /// Address the server binds to
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Build the BFF router
pub fn build_router(state: AppState) -> Router {
    let body_limit = (state.config.max_body_mb * 1024 * 1024) as usize;
    let enable_cors = state.config.enable_cors;

    let mut router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/format", post(handlers::format_handler))
        .route("/api/chatbot", post(handlers::chatbot_proxy))
        .route("/api/lead", post(handlers::lead_proxy))
        .route("/api/upload", post(handlers::upload_proxy))
        .route("/api/document", get(handlers::document_proxy))
        .route("/api/documents", get(handlers::documents_list))
        .route("/api/admin/documents", post(handlers::admin_document_upload))
        .route(
            "/api/admin/documents/:id",
            delete(handlers::admin_document_delete),
        )
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http());

    // Add CORS if enabled (outermost layer)
    if enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router = router.layer(cors);
    }

    router
}

/// BFF server service
pub struct WebServer {
    state: AppState,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    local_addr: Option<SocketAddr>,
}

impl WebServer {
    /// Create the server, loading the document library if configured
    pub fn new(config: WebConfig) -> Result<Self> {
        Ok(Self::with_state(AppState::new(config)?))
    }

    /// Create the server around prepared state
    pub fn with_state(state: AppState) -> Self {
        Self {
            state,
            shutdown_tx: None,
            local_addr: None,
        }
    }

    /// Router serving this server's state
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Bind and serve in the background; returns the bound address
    pub async fn start(&mut self) -> Result<SocketAddr> {
        if self.is_running() {
            return Err(DocbotError::config("Server already running"));
        }

        let addr = self.state.config.addr();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| DocbotError::config(format!("Failed to bind to {}: {}", addr, e)))?;
        let local_addr = listener.local_addr()?;
        info!("Starting docbot web server on {}", local_addr);

        let (tx, rx) = tokio::sync::oneshot::channel();
        let router = self.router();
        tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async {
                let _ = rx.await;
            });
            if let Err(e) = server.await {
                error!("Server error: {}", e);
            }
        });

        self.shutdown_tx = Some(tx);
        self.local_addr = Some(local_addr);
        Ok(local_addr)
    }

    /// Stop the server
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            info!("Docbot web server stopped");
        }
        self.local_addr = None;
        Ok(())
    }

    /// Check if server is running
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }

    /// Address bound by [`WebServer::start`]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_config_from_env() {
        std::env::set_var("DOCBOT_WEB_PORT", "4321");
        std::env::set_var("DOCBOT_CORS_ENABLED", "off");
        let config = WebConfig::from_env();
        assert_eq!(config.port, 4321);
        assert!(!config.enable_cors);
        assert_eq!(config.max_upload_mb, 15);
        assert_eq!(config.addr(), "127.0.0.1:4321");
        std::env::remove_var("DOCBOT_WEB_PORT");
        std::env::remove_var("DOCBOT_CORS_ENABLED");
    }

    #[tokio::test]
    async fn test_server_start_stop() {
        let mut server = WebServer::new(WebConfig {
            port: 0,
            ..Default::default()
        })
        .unwrap();
        let addr = server.start().await.unwrap();
        assert!(server.is_running());
        assert!(server.start().await.is_err());

        let health: serde_json::Value = docbot_core::client::shared_http_client()
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["status"], "ok");

        server.stop().await.unwrap();
        assert!(!server.is_running());
        assert_eq!(server.local_addr(), None);
    }
}
