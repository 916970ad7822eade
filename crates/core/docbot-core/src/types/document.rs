//! Document library types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of document held in the library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Portable Document Format
    Pdf,
    /// PowerPoint presentation
    Pptx,
}

impl DocumentType {
    /// Infer the type from a file name extension (case-insensitive)
    pub fn from_filename(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".pdf") {
            Some(DocumentType::Pdf)
        } else if lower.ends_with(".pptx") || lower.ends_with(".ppt") {
            Some(DocumentType::Pptx)
        } else {
            None
        }
    }

    /// Infer the type from a MIME type
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "application/pdf" => Some(DocumentType::Pdf),
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            | "application/vnd.ms-powerpoint" => Some(DocumentType::Pptx),
            _ => None,
        }
    }

    /// Lowercase name as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Pdf => "pdf",
            DocumentType::Pptx => "pptx",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type filter for library searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    /// Any type
    #[default]
    All,
    /// PDF only
    Pdf,
    /// PPTX only
    Pptx,
}

impl TypeFilter {
    /// Whether a document of type `ty` passes this filter
    pub fn matches(&self, ty: DocumentType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Pdf => ty == DocumentType::Pdf,
            TypeFilter::Pptx => ty == DocumentType::Pptx,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(TypeFilter::All),
            "pdf" => Ok(TypeFilter::Pdf),
            "pptx" => Ok(TypeFilter::Pptx),
            other => Err(format!("Unknown document type '{}'", other)),
        }
    }
}

/// A document in the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// File name as uploaded
    pub original_file_name: String,
    /// Document kind
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    /// Size in bytes
    pub size: u64,
    /// When the document was added
    pub upload_date: DateTime<Utc>,
    /// Where the file can be fetched
    pub download_url: String,
    /// Search keywords
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Uploader, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_by: Option<String>,
}

/// Pointer from a chat answer to a library document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReference {
    /// Document identifier
    pub document_id: String,
    /// Display name
    pub document_name: String,
    /// Download location
    pub download_url: String,
}

/// Search and paging parameters for the document library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFilters {
    /// Free-text query matched against name, description and keywords
    #[serde(default, alias = "query")]
    pub search: Option<String>,
    /// Type filter
    #[serde(default, rename = "type")]
    pub doc_type: TypeFilter,
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: u32,
    /// Page size
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    12
}

impl Default for DocumentFilters {
    fn default() -> Self {
        Self {
            search: None,
            doc_type: TypeFilter::All,
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_inference() {
        assert_eq!(DocumentType::from_filename("deck.PPTX"), Some(DocumentType::Pptx));
        assert_eq!(DocumentType::from_filename("manual.pdf"), Some(DocumentType::Pdf));
        assert_eq!(DocumentType::from_filename("notes.txt"), None);
        assert_eq!(
            DocumentType::from_mime("application/vnd.ms-powerpoint"),
            Some(DocumentType::Pptx)
        );
    }

    #[test]
    fn test_document_wire_format() {
        let json = serde_json::json!({
            "id": "1",
            "name": "Manual",
            "originalFileName": "manual.pdf",
            "type": "pdf",
            "size": 1024,
            "uploadDate": "2024-01-20T00:00:00Z",
            "downloadUrl": "/files/manual.pdf",
        });
        let doc: Document = serde_json::from_value(json).unwrap();
        assert_eq!(doc.doc_type, DocumentType::Pdf);
        assert!(doc.keywords.is_empty());
        let back = serde_json::to_value(&doc).unwrap();
        assert_eq!(back["originalFileName"], "manual.pdf");
        assert!(back.get("uploadedBy").is_none());
    }

    #[test]
    fn test_filters_defaults() {
        let filters: DocumentFilters = serde_json::from_str("{}").unwrap();
        assert_eq!(filters, DocumentFilters::default());
        assert_eq!(filters.page_size, 12);
        assert_eq!("pptx".parse::<TypeFilter>(), Ok(TypeFilter::Pptx));
        assert!("doc".parse::<TypeFilter>().is_err());
    }
}
