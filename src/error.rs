//! Error types for Shiftlens

use thiserror::Error;

/// Errors that can occur during an analysis run
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Classifier model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Malformed classifier model: {0}")]
    MalformedModel(String),

    #[error("Classification failed: {0}")]
    ClassificationError(String),

    #[error("Data source error: {0}")]
    SourceError(String),
}
