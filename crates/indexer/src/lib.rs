//! CineGraph Indexer
//!
//! Offline write path for the semantic index:
//! 1. Reads the lexicon and movie table
//! 2. Fetches missing entity descriptions concurrently
//! 3. Streams records through a bounded batch inserter

pub mod builder;
pub mod fetch;
pub mod inserter;

pub use builder::IndexBuilder;
pub use fetch::{DescriptionFetcher, WikidataFetcher};
pub use inserter::BatchInserter;
