//! Shared state for the BFF handlers

use crate::WebConfig;
use docbot_core::{BackendClient, DocumentCatalog, ResponseFormatter, Result};
use std::sync::Arc;
use std::time::Instant;

/// State cloned into every handler
#[derive(Clone)]
pub struct AppState {
    /// Backend pass-through client
    pub backend: BackendClient,

    /// Document library
    pub catalog: Arc<DocumentCatalog>,

    /// Formatter for `response_html` and `/api/format`
    pub formatter: Arc<ResponseFormatter>,

    /// Configuration
    pub config: Arc<WebConfig>,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Build state from configuration, seeding the catalog when a path is set
    pub fn new(config: WebConfig) -> Result<Self> {
        let catalog = match config.catalog_path.as_ref() {
            Some(path) => DocumentCatalog::from_json_file(path)?,
            None => DocumentCatalog::new(),
        };
        Ok(Self::with_catalog(config, catalog))
    }

    /// Build state around an existing catalog
    pub fn with_catalog(config: WebConfig, catalog: DocumentCatalog) -> Self {
        Self {
            backend: BackendClient::new(config.backend.clone()),
            catalog: Arc::new(catalog),
            formatter: Arc::new(ResponseFormatter::default()),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_state_seeds_catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"d1","name":"Brochure","originalFileName":"brochure.pdf","type":"pdf",
                "size":2048,"uploadDate":"2024-05-01T10:00:00Z","downloadUrl":"/files/brochure.pdf"}}]"#
        )
        .unwrap();

        let state = AppState::new(WebConfig {
            catalog_path: Some(file.path().to_path_buf()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(state.catalog.len(), 1);
        assert_eq!(state.catalog.get("d1").unwrap().name, "Brochure");
    }

    #[test]
    fn test_state_rejects_missing_catalog() {
        let result = AppState::new(WebConfig {
            catalog_path: Some("/nonexistent/docbot/catalog.json".into()),
            ..Default::default()
        });
        assert!(result.is_err());
    }
}
