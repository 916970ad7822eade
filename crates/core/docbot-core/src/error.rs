//! Error types for docbot core

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Main error type for docbot operations
#[derive(Debug, Error)]
pub enum DocbotError {
    /// Network/HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Timeout error
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Not found error (generic)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend answered with a non-success status
    #[error("Upstream error ({status}): {message}")]
    Upstream {
        /// HTTP status returned by the backend
        status: u16,
        /// Normalized error text
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Convenient Result type using DocbotError
pub type Result<T> = std::result::Result<T, DocbotError>;

impl DocbotError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        DocbotError::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DocbotError::Validation(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        DocbotError::Timeout(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        DocbotError::NotFound(msg.into())
    }

    /// Create an upstream error
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        DocbotError::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        DocbotError::Other(msg.into())
    }

    /// True when the error came from an elapsed request deadline
    pub fn is_timeout(&self) -> bool {
        match self {
            DocbotError::Timeout(_) => true,
            DocbotError::Network(e) => e.is_timeout(),
            _ => false,
        }
    }
}

impl From<ValidationErrors> for DocbotError {
    fn from(errors: ValidationErrors) -> Self {
        DocbotError::validation(errors.to_string())
    }
}
