//! API envelope types

use serde::{Deserialize, Serialize};

/// Generic response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Payload on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error text on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Informational message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful envelope
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            message: None,
        }
    }

    /// Failed envelope
    pub fn error(error: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(error.into()),
            message: None,
        }
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    /// Items on this page
    pub data: Vec<T>,
    /// Matching items across all pages
    pub total: usize,
    /// 1-based page number
    pub page: u32,
    /// Requested page size
    pub page_size: u32,
    /// Number of pages
    pub total_pages: u32,
}

/// A file accepted by the upload backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Location returned by the backend
    pub url: String,
    /// Original file name
    pub name: String,
}
