//! CineGraph Graph Crate
//!
//! Owns the read-only knowledge graph loaded at startup:
//! - N-Triples store with subject+predicate and label indexes
//! - Graph query engine (entity/relation lookups with label COALESCE)
//! - Per-movie property table for suggestion scoring

pub mod properties;
pub mod query;
pub mod store;

pub use properties::{MovieRecord, MovieTable};
pub use query::GraphQueryEngine;
pub use store::{Term, Triple, TripleStore};
