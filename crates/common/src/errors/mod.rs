//! Error types for CineGraph crates
//!
//! Provides a single error enum shared across the workspace with:
//! - Distinct error types for different failure modes
//! - Conversions from io / csv / serde / http errors
//! - A recoverability marker used at branch boundaries
//!
//! Resolution misses, empty query results, and unsupported questions
//! are NOT errors: the pipeline models those as `None` / `""` /
//! `NoMatch` values. `AppError` covers genuine faults (bad data
//! files, unreachable embedding endpoint, closed channels).

use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Data loading errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record in {file}: {message}")]
    MalformedRecord { file: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // External service errors
    #[error("Embedding service error: {message}")]
    Embedding { message: String },

    #[error("Description fetch failed for {code}: {message}")]
    DescriptionFetch { code: String, message: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    // Semantic index errors
    #[error("Semantic index error: {message}")]
    Index { message: String },

    // Write-path errors
    #[error("Insert channel closed: {message}")]
    ChannelClosed { message: String },

    // Internal errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// True when the resolution/query/scoring chain may swallow this
    /// error into an empty result and keep serving the request.
    /// Configuration and data-loading faults are not recoverable:
    /// they only occur at startup and should abort the process.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Embedding { .. }
                | AppError::DescriptionFetch { .. }
                | AppError::HttpClient(_)
                | AppError::Index { .. }
        )
    }
}
