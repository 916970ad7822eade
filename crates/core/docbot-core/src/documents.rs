//! In-memory document library and related-document helpers

use crate::types::{Document, DocumentFilters, DocumentReference, PaginatedResponse};
use crate::{DocbotError, Result};
use std::path::Path;
use std::sync::RwLock;
use tracing::{debug, info};

/// Path of the BFF document proxy route
pub const DOCUMENT_PROXY_PATH: &str = "/api/document";

/// Searchable list of library documents, newest first
#[derive(Debug, Default)]
pub struct DocumentCatalog {
    documents: RwLock<Vec<Document>>,
}

impl DocumentCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog seeded with `documents` in the given order
    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            documents: RwLock::new(documents),
        }
    }

    /// Load a JSON array of documents
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let documents: Vec<Document> = serde_json::from_str(&raw)?;
        info!(
            "Loaded {} documents from {}",
            documents.len(),
            path.as_ref().display()
        );
        Ok(Self::with_documents(documents))
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add a document in front of the existing ones
    pub fn add(&self, document: Document) {
        debug!("Adding document {} ({})", document.id, document.name);
        self.write().insert(0, document);
    }

    /// Look up a document by id
    pub fn get(&self, id: &str) -> Option<Document> {
        self.read().iter().find(|d| d.id == id).cloned()
    }

    /// Remove a document by id
    pub fn remove(&self, id: &str) -> Result<Document> {
        let mut docs = self.write();
        let idx = docs
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| DocbotError::not_found(format!("Document {} not found", id)))?;
        Ok(docs.remove(idx))
    }

    /// Filter and paginate
    pub fn search(&self, filters: &DocumentFilters) -> PaginatedResponse<Document> {
        let matching: Vec<Document> = self
            .read()
            .iter()
            .filter(|d| matches_filters(d, filters))
            .cloned()
            .collect();
        paginate(matching, filters.page, filters.page_size)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Document>> {
        self.documents.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Document>> {
        self.documents.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Whether `doc` passes both the text search and the type filter.
///
/// The search is a case-insensitive substring match against the name, the
/// description, and each keyword. A missing or blank search matches everything.
pub fn matches_filters(doc: &Document, filters: &DocumentFilters) -> bool {
    let matches_search = match filters.search.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(query) => {
            let q = query.to_lowercase();
            doc.name.to_lowercase().contains(&q)
                || doc.description.to_lowercase().contains(&q)
                || doc.keywords.iter().any(|k| k.to_lowercase().contains(&q))
        }
    };
    matches_search && filters.doc_type.matches(doc.doc_type)
}

/// Slice one 1-based page out of `items`
pub fn paginate<T>(items: Vec<T>, page: u32, page_size: u32) -> PaginatedResponse<T> {
    let total = items.len();
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total_pages = total.div_ceil(page_size as usize) as u32;
    let start = (page as usize - 1).saturating_mul(page_size as usize);
    let data = items
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .collect();
    PaginatedResponse {
        data,
        total,
        page,
        page_size,
        total_pages,
    }
}

/// Human readable size: `"512 B"`, `"1.5 KB"`, `"2.0 MB"`
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

/// Display name for the `index`-th (0-based) document link of an answer
pub fn document_file_name(url: &str, index: usize) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    path.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(|s| {
            urlencoding::decode(s)
                .map(|d| d.into_owned())
                .unwrap_or_else(|_| s.to_string())
        })
        .unwrap_or_else(|| format!("Document {}", index + 1))
}

/// Link that fetches `url` through the BFF document proxy
pub fn document_proxy_url(url: &str) -> String {
    format!("{}?path={}", DOCUMENT_PROXY_PATH, urlencoding::encode(url))
}

/// Turn raw answer links into references that go through the proxy
pub fn references_from_urls(urls: &[String]) -> Vec<DocumentReference> {
    urls.iter()
        .enumerate()
        .map(|(i, url)| DocumentReference {
            document_id: format!("doc-{}", i + 1),
            document_name: document_file_name(url, i),
            download_url: document_proxy_url(url),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DocumentType, TypeFilter};
    use chrono::Utc;
    use std::io::Write;

    fn doc(id: &str, name: &str, ty: DocumentType, keywords: &[&str]) -> Document {
        Document {
            id: id.into(),
            name: name.into(),
            description: format!("About {}", name),
            original_file_name: format!("{}.{}", id, ty),
            doc_type: ty,
            size: 2048,
            upload_date: Utc::now(),
            download_url: format!("/files/{}", id),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            uploaded_by: None,
        }
    }

    fn catalog() -> DocumentCatalog {
        DocumentCatalog::with_documents(vec![
            doc("1", "Product Overview", DocumentType::Pdf, &["overview"]),
            doc("2", "Sales Deck", DocumentType::Pptx, &["pricing", "Q3"]),
            doc("3", "Installation Guide", DocumentType::Pdf, &["setup"]),
        ])
    }

    fn filters(search: Option<&str>, ty: TypeFilter) -> DocumentFilters {
        DocumentFilters {
            search: search.map(str::to_string),
            doc_type: ty,
            ..Default::default()
        }
    }

    #[test]
    fn test_search_matches_name_description_and_keywords() {
        let c = catalog();
        assert_eq!(c.search(&filters(Some("DECK"), TypeFilter::All)).total, 1);
        assert_eq!(c.search(&filters(Some("about"), TypeFilter::All)).total, 3);
        let hit = c.search(&filters(Some("q3"), TypeFilter::All));
        assert_eq!(hit.data[0].id, "2");
        assert_eq!(c.search(&filters(Some("  "), TypeFilter::All)).total, 3);
    }

    #[test]
    fn test_search_combines_type_filter() {
        let c = catalog();
        assert_eq!(c.search(&filters(None, TypeFilter::Pdf)).total, 2);
        assert_eq!(c.search(&filters(Some("guide"), TypeFilter::Pptx)).total, 0);
    }

    #[test]
    fn test_paginate() {
        let page = paginate((1..=25).collect::<Vec<_>>(), 3, 12);
        assert_eq!(page.data, vec![25]);
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);

        let past_end = paginate((1..=5).collect::<Vec<_>>(), 4, 12);
        assert!(past_end.data.is_empty());
        assert_eq!(past_end.total_pages, 1);

        assert_eq!(paginate(Vec::<u8>::new(), 1, 12).total_pages, 0);
    }

    #[test]
    fn test_add_remove_get() {
        let c = catalog();
        c.add(doc("4", "New", DocumentType::Pdf, &[]));
        assert_eq!(c.search(&DocumentFilters::default()).data[0].id, "4");
        assert_eq!(c.len(), 4);
        assert_eq!(c.remove("2").unwrap().name, "Sales Deck");
        assert!(c.get("2").is_none());
        assert!(matches!(c.remove("2"), Err(DocbotError::NotFound(_))));
    }

    #[test]
    fn test_from_json_file() {
        let docs = vec![doc("1", "Manual", DocumentType::Pdf, &[])];
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&docs).unwrap()).unwrap();
        let c = DocumentCatalog::from_json_file(file.path()).unwrap();
        assert_eq!(c.get("1").unwrap().name, "Manual");

        assert!(DocumentCatalog::from_json_file("/nonexistent/catalog.json").is_err());
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_document_file_name() {
        assert_eq!(
            document_file_name("http://host/files/Q3%20Report.pdf", 0),
            "Q3 Report.pdf"
        );
        assert_eq!(document_file_name("/docs/a.pdf?download=1", 0), "a.pdf");
        assert_eq!(document_file_name("http://host/files/", 1), "Document 2");
        assert_eq!(document_file_name("", 0), "Document 1");
    }

    #[test]
    fn test_document_proxy_url() {
        assert_eq!(
            document_proxy_url("http://host/a b.pdf"),
            "/api/document?path=http%3A%2F%2Fhost%2Fa%20b.pdf"
        );
        let refs = references_from_urls(&["/files/x.pdf".to_string()]);
        assert_eq!(refs[0].document_name, "x.pdf");
        assert_eq!(refs[0].download_url, "/api/document?path=%2Ffiles%2Fx.pdf");
    }
}
