//! HTTP handlers for the BFF routes
//!
//! Proxy routes keep the `{ "error": .. }` body and status the browser code
//! already understands for backend failures. Failures that originate here
//! use the `{ success, error, code }` envelope of [`ApiError`].

use crate::state::AppState;
use axum::{
    extract::{
        multipart::{Multipart, MultipartError},
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use docbot_core::client::backend::DOCUMENT_FETCH_FAILED;
use docbot_core::upload::{check_upload_limits, parse_upload_response, FileInfo, UploadItem};
use docbot_core::validation::{
    document_type_of, validate_document_upload, validate_lead, validate_search,
    DocumentUploadForm, SearchParams,
};
use docbot_core::{
    ApiResponse, DocbotError, Document, LeadRequest, PaginatedResponse, ValidationErrors,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, error, info, warn};

/// Default success text for lead submissions
pub const LEAD_SUBMITTED: &str = "Lead submitted successfully";

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"`
    pub status: String,
    /// Seconds since start
    pub uptime: u64,
    /// RFC 3339 time of the check
    pub timestamp: String,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Body of `POST /api/format`
#[derive(Debug, Deserialize)]
pub struct FormatRequest {
    /// Text to format; non-string values are coerced
    #[serde(default)]
    pub text: JsonValue,
}

/// Body returned by `POST /api/format`
#[derive(Debug, Serialize, Deserialize)]
pub struct FormatResponse {
    /// Rendered markup
    pub html: String,
}

/// Render assistant text to HTML
pub async fn format_handler(
    State(state): State<AppState>,
    payload: Result<Json<FormatRequest>, JsonRejection>,
) -> Result<Json<FormatResponse>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(FormatResponse {
        html: state.formatter.format_value(&request.text),
    }))
}

/// Forward a chat request and attach the formatted answer as `response_html`
pub async fn chatbot_proxy(
    State(state): State<AppState>,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> Result<Json<JsonValue>, ApiError> {
    let Json(body) = payload?;
    let mut data = state.backend.forward_chat(&body).await?;
    if let Some(text) = data.get("response").cloned() {
        let html = state.formatter.format_value(&text);
        if let Some(obj) = data.as_object_mut() {
            obj.insert("response_html".to_string(), JsonValue::String(html));
        }
    }
    Ok(Json(data))
}

/// Validate and forward a lead
pub async fn lead_proxy(
    State(state): State<AppState>,
    payload: Result<Json<LeadRequest>, JsonRejection>,
) -> Result<Json<JsonValue>, ApiError> {
    let Json(lead) = payload?;
    validate_lead(&lead)?;

    let data = state.backend.submit_lead(&lead).await?;
    let message = data
        .get("message")
        .and_then(JsonValue::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or(LEAD_SUBMITTED)
        .to_string();
    info!("LEAD_SUBMITTED subject={:?}", lead.subject);
    Ok(Json(json!({
        "success": true,
        "message": message,
        "data": data,
    })))
}

/// Forward a multi-file upload (`files` + `descriptions` parts)
pub async fn upload_proxy(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<JsonValue>, ApiError> {
    let mut items: Vec<UploadItem> = Vec::new();
    let mut descriptions: Vec<String> = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let part = field.name().map(str::to_string);
        match part.as_deref() {
            Some("files") => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                let mut info = FileInfo::new(name, data.len() as u64);
                info.content_type = content_type;
                items.push(UploadItem {
                    info,
                    data: data.to_vec(),
                    description: String::new(),
                });
            }
            Some("descriptions") => descriptions.push(field.text().await?),
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    for (item, description) in items.iter_mut().zip(descriptions) {
        item.description = description;
    }
    check_upload_limits(&items, state.config.max_upload_mb).map_err(ApiError::BadRequest)?;

    info!("UPLOAD_PROXY files={}", items.len());
    let data = state.backend.upload(items).await?;
    Ok(Json(data))
}

/// Query string of `GET /api/document`
#[derive(Debug, Deserialize)]
pub struct DocumentQuery {
    /// Absolute URL or backend-relative path
    pub path: Option<String>,
}

/// Stream a document from the document backend
pub async fn document_proxy(
    State(state): State<AppState>,
    Query(query): Query<DocumentQuery>,
) -> Result<Response, ApiError> {
    let path = query
        .path
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Document path is required".to_string()))?;

    let doc = match state.backend.fetch_document(&path).await {
        Ok(doc) => doc,
        Err(DocbotError::Upstream { status, message }) => {
            return Err(ApiError::Upstream { status, message })
        }
        Err(e) => {
            error!("DOCUMENT_PROXY_ERROR path={} error={}", path, e);
            return Err(ApiError::Upstream {
                status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                message: DOCUMENT_FETCH_FAILED.to_string(),
            });
        }
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, doc.content_type),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", doc.file_name),
            ),
            (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
        ],
        doc.bytes,
    )
        .into_response())
}

/// Search the document library
pub async fn documents_list(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<PaginatedResponse<Document>>, ApiError> {
    let Query(params) = params?;
    let filters = validate_search(&params)?;
    Ok(Json(state.catalog.search(&filters)))
}

/// Upload one document through the admin form and add it to the library
pub async fn admin_document_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<Document>>), ApiError> {
    let mut form = DocumentUploadForm::default();
    let mut data: Vec<u8> = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let part = field.name().map(str::to_string);
        match part.as_deref() {
            Some("file") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                data = field.bytes().await?.to_vec();
                let mut info = FileInfo::new(name, data.len() as u64);
                info.content_type = content_type;
                form.file = Some(info);
            }
            Some("documentName") => {
                form.document_name = field.text().await?.trim().to_string();
            }
            Some("description") => {
                let text = field.text().await?;
                form.description = Some(text).filter(|t| !t.is_empty());
            }
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    validate_document_upload(&form)?;
    let (info, doc_type) = match form.file {
        Some(info) => match document_type_of(&info) {
            Some(ty) => (info, ty),
            None => return Err(ApiError::BadRequest("Only PDF and PPTX files are accepted".into())),
        },
        None => return Err(ApiError::BadRequest("File is required".into())),
    };

    let description = form.description.unwrap_or_default();
    let file_name = info.name.clone();
    let size = info.size;
    let uploaded = state
        .backend
        .upload(vec![UploadItem {
            info,
            data,
            description: description.clone(),
        }])
        .await?;

    let download_url = parse_upload_response(&uploaded, std::slice::from_ref(&file_name))
        .into_iter()
        .next()
        .map(|f| f.url)
        .ok_or_else(|| ApiError::BadGateway("Upload backend returned no file URL".to_string()))?;

    let document = Document {
        id: uuid::Uuid::new_v4().to_string(),
        name: form.document_name,
        description,
        original_file_name: file_name,
        doc_type,
        size,
        upload_date: chrono::Utc::now(),
        download_url,
        keywords: Vec::new(),
        uploaded_by: None,
    };
    state.catalog.add(document.clone());
    info!("DOCUMENT_ADDED id={} name={}", document.id, document.name);

    let mut body = ApiResponse::ok(document);
    body.message = Some("Document uploaded successfully".to_string());
    Ok((StatusCode::CREATED, Json(body)))
}

/// Remove a document from the library
pub async fn admin_document_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Document>>, ApiError> {
    let removed = state.catalog.remove(&id)?;
    info!("DOCUMENT_REMOVED id={}", id);
    let mut body = ApiResponse::ok(removed);
    body.message = Some("Document deleted".to_string());
    Ok(Json(body))
}

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request
    BadRequest(String),
    /// Field-level validation failures
    Validation(ValidationErrors),
    /// Unknown resource
    NotFound(String),
    /// Request body over the configured limit
    PayloadTooLarge(String),
    /// Backend answered with something unusable
    BadGateway(String),
    /// Backend failure passed through with its status
    Upstream {
        /// Status to answer with
        status: u16,
        /// Error text
        message: String,
    },
    /// Anything else
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            ApiError::Upstream { status, message } => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                return (status, Json(json!({ "error": message }))).into_response();
            }
            ApiError::Validation(errors) => {
                let first = errors
                    .errors()
                    .first()
                    .map(|e| e.message.clone())
                    .unwrap_or_else(|| "Invalid request".to_string());
                (StatusCode::BAD_REQUEST, first, Some(errors))
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg, None),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg, None),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
        };

        let mut body = json!({
            "success": false,
            "error": message,
            "code": status.as_u16(),
        });
        if let Some(errors) = errors {
            body["errors"] = json!(errors);
        }

        (status, Json(body)).into_response()
    }
}

impl From<DocbotError> for ApiError {
    fn from(err: DocbotError) -> Self {
        match err {
            DocbotError::Upstream { status, message } => ApiError::Upstream { status, message },
            DocbotError::Validation(msg) => ApiError::BadRequest(msg),
            DocbotError::NotFound(msg) => ApiError::NotFound(msg),
            DocbotError::Network(e) if e.is_decode() => {
                warn!("Undecodable backend response: {}", e);
                ApiError::BadGateway(e.to_string())
            }
            other => {
                error!("DocbotError: {}", other);
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::BadRequest(err.body_text())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> JsonValue {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_api_error_envelope() {
        let response = ApiError::BadRequest("test error".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body, json!({ "success": false, "error": "test error", "code": 400 }));
    }

    #[tokio::test]
    async fn test_upstream_error_keeps_status_and_shape() {
        let response = ApiError::Upstream {
            status: 503,
            message: "API error: 503".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await, json!({ "error": "API error: 503" }));
    }

    #[tokio::test]
    async fn test_validation_error_lists_fields() {
        let mut errors = ValidationErrors::default();
        errors.add("documentName", "Document name is required");
        errors.add("file", "File is required");
        let response = ApiError::from(errors).into_response();
        let body = body_json(response).await;
        assert_eq!(body["error"], "Document name is required");
        assert_eq!(body["errors"][1]["field"], "file");
    }

    #[test]
    fn test_from_docbot_error() {
        assert!(matches!(
            ApiError::from(DocbotError::not_found("x")),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(DocbotError::upstream(404, "Lead API error: 404")),
            ApiError::Upstream { status: 404, .. }
        ));
        assert!(matches!(
            ApiError::from(DocbotError::timeout("slow")),
            ApiError::Internal(_)
        ));
    }
}
