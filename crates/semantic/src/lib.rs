//! CineGraph Semantic Crate
//!
//! Resolves surface text to canonical graph identifiers:
//! - Lexicon index (exact label -> uri, with synonym aliases)
//! - Semantic vector index with metadata filtering and re-ranking
//! - The two-stage resolver used by the question pipeline

pub mod index;
pub mod lexicon;
pub mod rerank;
pub mod resolver;

pub use index::{InMemoryIndex, SearchFilter, SemanticIndex};
pub use lexicon::Lexicon;
pub use rerank::{Reranker, TermOverlapReranker};
pub use resolver::EntityResolver;
