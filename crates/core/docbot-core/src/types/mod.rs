//! Core type definitions for docbot

pub mod api;
pub mod chat;
pub mod document;

// Re-export commonly used types
pub use api::*;
pub use chat::*;
pub use document::*;
