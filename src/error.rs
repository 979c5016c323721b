//! Error types for the qkb application.

use thiserror::Error;

/// Main error type for qkb operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum KbError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid glob pattern.
    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Document not found.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Category not found.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Malformed search query.
    #[error("Bad query: {0}")]
    BadQuery(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for qkb operations.
pub type Result<T> = std::result::Result<T, KbError>;
