//! Multi-file upload pipeline
//!
//! Selection checks run before anything is sent, the multipart form pairs
//! every `files` part with a `descriptions` part, and backend answers (both
//! success and failure) are normalized here so every caller reports them the
//! same way.

use crate::types::UploadedFile;
use crate::Result;
use reqwest::multipart::{Form, Part};
use serde_json::Value as JsonValue;

const MIB: u64 = 1024 * 1024;

/// Default per-file limit for the chat upload widget
pub const DEFAULT_SELECTION_LIMIT_MB: u64 = 10;
/// Per-file limit enforced by the BFF before forwarding
pub const PROXY_FILE_LIMIT_MB: u64 = 15;
/// Extensions offered by the chat upload widget
pub const DEFAULT_ACCEPTED_EXTENSIONS: [&str; 7] =
    [".pdf", ".doc", ".docx", ".txt", ".csv", ".xlsx", ".xls"];

/// What is known about a file before its bytes are read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// File name including extension
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// MIME type reported by the client, if any
    pub content_type: Option<String>,
}

impl FileInfo {
    /// New file description without a MIME type
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            content_type: None,
        }
    }

    /// Attach a MIME type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    fn has_extension(&self, extensions: &[String]) -> bool {
        let lower = self.name.to_ascii_lowercase();
        extensions.iter().any(|ext| lower.ends_with(ext.as_str()))
    }
}

/// Limits applied when the user picks files
#[derive(Debug, Clone)]
pub struct SelectionLimits {
    /// Per-file size limit in MB
    pub max_size_mb: u64,
    /// Accepted extensions, lowercase with leading dot; empty accepts all
    pub accepted_extensions: Vec<String>,
}

impl Default for SelectionLimits {
    fn default() -> Self {
        Self {
            max_size_mb: DEFAULT_SELECTION_LIMIT_MB,
            accepted_extensions: DEFAULT_ACCEPTED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

/// Outcome of checking a batch of picked files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Files that may be uploaded
    pub accepted: Vec<FileInfo>,
    /// One message per rejected file
    pub errors: Vec<String>,
}

impl Selection {
    /// Rejection messages joined for display, `None` when nothing was rejected
    pub fn error_message(&self) -> Option<String> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.join(", "))
        }
    }
}

/// Split picked files into accepted ones and rejection messages
pub fn select_files(files: Vec<FileInfo>, limits: &SelectionLimits) -> Selection {
    let max = limits.max_size_mb.saturating_mul(MIB);
    let mut selection = Selection::default();
    for file in files {
        if file.size > max {
            selection
                .errors
                .push(format!("{} exceeds {}MB limit", file.name, limits.max_size_mb));
        } else if !limits.accepted_extensions.is_empty()
            && !file.has_extension(&limits.accepted_extensions)
        {
            selection
                .errors
                .push(format!("{} is not a supported file type", file.name));
        } else {
            selection.accepted.push(file);
        }
    }
    selection
}

/// A file ready to be sent, with its description
#[derive(Debug, Clone)]
pub struct UploadItem {
    /// File metadata
    pub info: FileInfo,
    /// File contents
    pub data: Vec<u8>,
    /// User supplied description, possibly empty
    pub description: String,
}

impl UploadItem {
    /// Description sent to the backend; blank ones become `"{name} document"`
    pub fn effective_description(&self) -> String {
        if self.description.trim().is_empty() {
            format!("{} document", self.info.name)
        } else {
            self.description.clone()
        }
    }
}

/// Reject an empty batch or any file over `max_mb`
pub fn check_upload_limits(items: &[UploadItem], max_mb: u64) -> std::result::Result<(), String> {
    if items.is_empty() {
        return Err("No files provided".to_string());
    }
    let max = max_mb.saturating_mul(MIB);
    match items.iter().find(|i| i.data.len() as u64 > max) {
        Some(item) => Err(format!("File {} exceeds {}MB limit", item.info.name, max_mb)),
        None => Ok(()),
    }
}

/// Build the backend multipart form: `files` and `descriptions` in lockstep
pub fn build_form(items: Vec<UploadItem>) -> Result<Form> {
    let mut form = Form::new();
    for item in items {
        let description = item.effective_description();
        let mut part = Part::bytes(item.data).file_name(item.info.name);
        if let Some(ct) = item.info.content_type.as_deref() {
            part = part.mime_str(ct)?;
        }
        form = form.part("files", part).text("descriptions", description);
    }
    Ok(form)
}

/// Pair backend upload results with the submitted file names.
///
/// The backend answers either with one object per file or with a single
/// object shared by the whole batch; each carries `file_url` or `url`.
/// Entries without a URL are skipped.
pub fn parse_upload_response(body: &JsonValue, names: &[String]) -> Vec<UploadedFile> {
    match body {
        JsonValue::Array(items) => items
            .iter()
            .zip(names)
            .filter_map(|(item, name)| {
                file_url(item).map(|url| UploadedFile {
                    url,
                    name: name.clone(),
                })
            })
            .collect(),
        single => match file_url(single) {
            Some(url) => names
                .iter()
                .map(|name| UploadedFile {
                    url: url.clone(),
                    name: name.clone(),
                })
                .collect(),
            None => Vec::new(),
        },
    }
}

fn file_url(item: &JsonValue) -> Option<String> {
    ["file_url", "url"]
        .iter()
        .filter_map(|k| item.get(*k).and_then(|v| v.as_str()))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Error text for a failed upload: `detail`, then `message`, then the JSON
/// itself; non-JSON bodies are used verbatim.
pub fn normalize_upload_error(body: &str) -> String {
    match serde_json::from_str::<JsonValue>(body) {
        Ok(json) => ["detail", "message"]
            .iter()
            .filter_map(|k| json.get(*k))
            .find(|v| is_truthy(v))
            .map(|v| match v {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| json.to_string()),
        Err(_) if body.trim().is_empty() => "Upload failed".to_string(),
        Err(_) => body.to_string(),
    }
}

fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Number(n) => n.as_f64() != Some(0.0),
        _ => true,
    }
}
