//! Error types for context resolution, scoring, and ref normalization.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SemanticError {
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reference resolution failed: {0}")]
    Resolution(String),

    #[error("No #/components/schemas models provided")]
    NoSchemas,

    #[error("Invalid JSON-LD keyword '{keyword}' for '{term}'")]
    InvalidKeyword { term: String, keyword: String },

    #[error("No results provided")]
    NoResults,

    #[error("JSON-LD expansion failed for '{term}': {message}")]
    Expansion { term: String, message: String },

    #[error("Missing local origin for ref normalization")]
    MissingOrigin,

    #[error("OpenAPI document error: {0}")]
    Document(String),
}
