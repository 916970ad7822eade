//! Docbot Core
//!
//! Building blocks for the document-aware chatbot front end:
//!
//! - Response formatter turning bot replies into HTML
//! - Domain types for messages, documents and leads
//! - Form and query validation
//! - Upload pipeline and document library
//! - Backend clients with offline fallback replies
//!
//! # Example
//!
//! ```
//! let html = docbot_core::format("Read **this**: https://example.com");
//! assert!(html.contains("<strong>this</strong>"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod documents;
pub mod error;
pub mod fallback;
pub mod formatter;
pub mod types;
pub mod upload;
pub mod utils;
pub mod validation;

// Re-export main types
pub use client::{BackendClient, ChatbotClient, ChatbotClientConfig, KeyValueStore, MemoryStore};
pub use config::{
    get_env_bool, get_env_int, get_env_or, load_env, load_env_from_path,
    BackendConfig, ContactInfo,
};
pub use documents::DocumentCatalog;
pub use error::{DocbotError, Result};
pub use fallback::{fallback_reply, FailureKind};
pub use formatter::{format, format_value, FormatterOptions, ResponseFormatter};
pub use types::*;
pub use validation::{FieldError, ValidationErrors};
