//! Form validation for uploads, library searches and leads
//!
//! Each validator collects at most one message per field, in field order, so
//! callers can show them next to the matching inputs.

use crate::types::{DocumentFilters, DocumentType, LeadRequest, TypeFilter};
use crate::upload::FileInfo;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest document accepted by the admin upload form
pub const MAX_DOCUMENT_SIZE: u64 = 50 * 1024 * 1024;
/// MIME types accepted by the admin upload form
pub const ACCEPTED_DOCUMENT_MIME_TYPES: [&str; 3] = [
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "application/vnd.ms-powerpoint",
];
/// Longest accepted search query
pub const MAX_SEARCH_QUERY_LEN: usize = 200;
/// Largest accepted page size
pub const MAX_PAGE_SIZE: u32 = 100;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));
static EXTENSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.[^/.]+$").expect("valid regex"));

/// A single field failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Form field name as the front end knows it
    pub field: String,
    /// Human readable message
    pub message: String,
}

/// Ordered collection of field failures
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Record a failure; later failures for an already failed field are ignored
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        if self.0.iter().any(|e| e.field == field) {
            return;
        }
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// No failures recorded
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Failures in insertion order
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Message recorded for `field`, if any
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Admin upload form contents
#[derive(Debug, Clone, Default)]
pub struct DocumentUploadForm {
    /// Display name
    pub document_name: String,
    /// Optional description
    pub description: Option<String>,
    /// Selected file
    pub file: Option<FileInfo>,
}

/// Check the admin upload form
pub fn validate_document_upload(form: &DocumentUploadForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name_len = form.document_name.trim().chars().count();
    if name_len == 0 {
        errors.add("documentName", "Document name is required");
    } else if name_len < 3 {
        errors.add("documentName", "Document name must be at least 3 characters");
    } else if name_len > 100 {
        errors.add("documentName", "Document name must not exceed 100 characters");
    }

    if let Some(description) = &form.description {
        if description.chars().count() > 500 {
            errors.add("description", "Description must not exceed 500 characters");
        }
    }

    match &form.file {
        None => errors.add("file", "File is required"),
        Some(file) if file.size > MAX_DOCUMENT_SIZE => {
            errors.add("file", "File size must be less than 50MB")
        }
        Some(file) if !is_accepted_document(file) => {
            errors.add("file", "Only PDF and PPTX files are accepted")
        }
        Some(_) => {}
    }

    errors.into_result()
}

fn is_accepted_document(file: &FileInfo) -> bool {
    let mime_ok = file
        .content_type
        .as_deref()
        .map(|m| ACCEPTED_DOCUMENT_MIME_TYPES.contains(&m))
        .unwrap_or(false);
    mime_ok || file.name.ends_with(".pdf") || file.name.ends_with(".pptx")
}

/// Document type for an accepted upload, by MIME first and extension second
pub fn document_type_of(file: &FileInfo) -> Option<DocumentType> {
    file.content_type
        .as_deref()
        .and_then(DocumentType::from_mime)
        .or_else(|| DocumentType::from_filename(&file.name))
}

/// Default document name for a selected file: the name without its extension
pub fn default_document_name(file_name: &str) -> String {
    EXTENSION.replace(file_name, "").into_owned()
}

/// Raw library search parameters as they arrive in a query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Free-text query
    #[serde(default)]
    pub query: Option<String>,
    /// `all`, `pdf` or `pptx`
    #[serde(default, rename = "type")]
    pub doc_type: Option<String>,
    /// 1-based page
    #[serde(default)]
    pub page: Option<i64>,
    /// Items per page
    #[serde(default)]
    pub page_size: Option<i64>,
}

/// Check search parameters and fill in defaults
pub fn validate_search(params: &SearchParams) -> Result<DocumentFilters, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let mut filters = DocumentFilters::default();

    if let Some(query) = &params.query {
        if query.chars().count() > MAX_SEARCH_QUERY_LEN {
            errors.add("query", "Search query too long");
        } else if !query.is_empty() {
            filters.search = Some(query.clone());
        }
    }

    if let Some(ty) = &params.doc_type {
        match ty.parse::<TypeFilter>() {
            Ok(t) => filters.doc_type = t,
            Err(_) => errors.add("type", "Type must be one of: all, pdf, pptx"),
        }
    }

    if let Some(page) = params.page {
        match u32::try_from(page) {
            Ok(p) if p > 0 => filters.page = p,
            _ => errors.add("page", "Page must be a positive integer"),
        }
    }

    if let Some(size) = params.page_size {
        match u32::try_from(size) {
            Ok(s) if s > MAX_PAGE_SIZE => {
                errors.add("pageSize", "Page size must not exceed 100")
            }
            Ok(s) if s > 0 => filters.page_size = s,
            _ => errors.add("pageSize", "Page size must be a positive integer"),
        }
    }

    errors.into_result().map(|_| filters)
}

/// Check a lead submission
pub fn validate_lead(lead: &LeadRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let fields = [
        &lead.name,
        &lead.email,
        &lead.phone,
        &lead.subject,
        &lead.message,
    ];
    if fields.iter().any(|f| f.trim().is_empty()) {
        errors.add("form", "All fields are required");
    } else if !EMAIL.is_match(lead.email.trim()) {
        errors.add("email", "Invalid email address");
    }
    errors.into_result()
}
