//! Common test utilities and mock backends for E2E testing

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, Request, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use docbot_core::{BackendConfig, Document, DocumentCatalog, DocumentType};
use docbot_adaptor_web::{AppState, WebConfig};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;

// ============================================================================
// Test Configuration
// ============================================================================

/// Legacy document base used in rewrite tests; never contacted
pub const LEGACY_BASE: &str = "http://legacy.docbot.invalid:6000";

/// Multipart boundary used by [`multipart_body`]
pub const BOUNDARY: &str = "docbot-test-boundary";

/// Backend config pointing every service at `addr`
pub fn backend_config(addr: SocketAddr) -> BackendConfig {
    BackendConfig {
        chatbot_url: format!("http://{}/query_response", addr),
        lead_url: format!("http://{}/generate_lead", addr),
        upload_base_url: format!("http://{}", addr),
        document_base_url: format!("http://{}", addr),
        legacy_document_base_url: LEGACY_BASE.to_string(),
        ..Default::default()
    }
}

/// App state around a catalog, backends at `addr`
pub fn test_state(addr: SocketAddr, catalog: DocumentCatalog) -> AppState {
    test_state_with(addr, catalog, |_| {})
}

/// App state with a config tweak applied
pub fn test_state_with(
    addr: SocketAddr,
    catalog: DocumentCatalog,
    tweak: impl FnOnce(&mut WebConfig),
) -> AppState {
    let mut config = WebConfig {
        port: 0,
        backend: backend_config(addr),
        ..Default::default()
    };
    tweak(&mut config);
    AppState::with_catalog(config, catalog)
}

/// Address with nothing listening on it
pub async fn unreachable_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Library document fixture
pub fn sample_document(id: &str, name: &str, doc_type: DocumentType, keywords: &[&str]) -> Document {
    Document {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{} for customers", name),
        original_file_name: format!("{}.{}", id, doc_type),
        doc_type,
        size: 4096,
        upload_date: Utc::now(),
        download_url: format!("/files/{}.{}", id, doc_type),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        uploaded_by: None,
    }
}

/// Catalog with three documents
pub fn sample_catalog() -> DocumentCatalog {
    DocumentCatalog::with_documents(vec![
        sample_document("overview", "Product Overview", DocumentType::Pdf, &["intro"]),
        sample_document("deck", "Sales Deck", DocumentType::Pptx, &["pricing"]),
        sample_document("guide", "Installation Guide", DocumentType::Pdf, &["setup"]),
    ])
}

// ============================================================================
// Request helpers
// ============================================================================

/// One multipart part
pub enum Part<'a> {
    /// Plain text field
    Text(&'a str, &'a str),
    /// File field: name, file name, content type, bytes
    File(&'a str, &'a str, &'a str, Vec<u8>),
}

/// Encode parts as a `multipart/form-data` body using [`BOUNDARY`]
pub fn multipart_body(parts: Vec<Part<'_>>) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, content_type, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(&data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// POST multipart request
pub fn multipart_request(uri: &str, parts: Vec<Part<'_>>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

/// POST JSON request
pub fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

/// GET request
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Read a response body as JSON
pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// Mock backend (chatbot, lead, upload, documents)
// ============================================================================

/// A file received by the mock upload endpoint
#[derive(Debug, Clone)]
pub struct ReceivedFile {
    /// File name
    pub name: String,
    /// Byte count
    pub size: usize,
}

/// State for the mock backend
#[derive(Default)]
pub struct MockBackendState {
    /// Chat request bodies
    pub chat_requests: RwLock<Vec<Value>>,
    /// Lead request bodies
    pub leads: RwLock<Vec<Value>>,
    /// Uploaded files
    pub files: RwLock<Vec<ReceivedFile>>,
    /// Upload descriptions
    pub descriptions: RwLock<Vec<String>>,
}

/// Start a healthy mock backend
pub async fn start_mock_backend() -> (SocketAddr, Arc<MockBackendState>) {
    let state = Arc::new(MockBackendState::default());

    let app = Router::new()
        .route("/query_response", post(mock_query))
        .route("/generate_lead", post(mock_lead))
        .route("/upload", post(mock_upload))
        .route("/files/:name", get(mock_file))
        .with_state(state.clone());

    (serve(app).await, state)
}

/// Start a backend answering 503 with a JSON `detail` on every route
pub async fn start_failing_backend() -> SocketAddr {
    async fn unavailable() -> impl IntoResponse {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "detail": "Service down for maintenance" })),
        )
    }

    let app = Router::new()
        .route("/query_response", post(unavailable))
        .route("/generate_lead", post(unavailable))
        .route("/upload", post(unavailable))
        .route("/files/:name", get(unavailable));

    serve(app).await
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give server time to start
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    addr
}

async fn mock_query(
    State(state): State<Arc<MockBackendState>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.chat_requests.write().await.push(body.clone());
    let query = body["user_query"].as_str().unwrap_or_default().to_string();
    Json(json!({
        "response": format!("**Echo:** {}", query),
        "doc_urls": ["/files/guide.pdf"],
        "user_id": "user-123",
    }))
}

async fn mock_lead(
    State(state): State<Arc<MockBackendState>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.leads.write().await.push(body.clone());
    if body["name"] == "Quiet" {
        Json(json!({ "id": 7 }))
    } else {
        Json(json!({ "id": 7, "message": format!("Thanks {}", body["name"].as_str().unwrap_or("")) }))
    }
}

async fn mock_upload(
    State(state): State<Arc<MockBackendState>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut urls = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        match field.name().map(str::to_string).as_deref() {
            Some("files") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.unwrap();
                urls.push(json!({ "file_url": format!("/files/{}", name) }));
                state.files.write().await.push(ReceivedFile {
                    name,
                    size: data.len(),
                });
            }
            Some("descriptions") => {
                let text = field.text().await.unwrap();
                state.descriptions.write().await.push(text);
            }
            _ => {}
        }
    }
    Json(Value::Array(urls))
}

async fn mock_file(Path(name): Path<String>) -> impl IntoResponse {
    if name == "guide.pdf" {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/pdf")],
            b"%PDF-1.4 guide".to_vec(),
        )
            .into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}
