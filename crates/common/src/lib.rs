//! CineGraph Common Library
//!
//! Shared code for all CineGraph crates including:
//! - Core record types (entities, relations, index records)
//! - Embedding client abstraction
//! - Error types and handling
//! - Configuration management

pub mod config;
pub mod embeddings;
pub mod errors;
pub mod types;

// Re-export commonly used types
pub use config::AppConfig;
pub use embeddings::Embedder;
pub use errors::{AppError, Result};
pub use types::{EntityKind, IndexRecord, ScoredRecord};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default embedding dimension
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 384;
