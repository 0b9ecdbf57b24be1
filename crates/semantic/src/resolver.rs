//! Two-stage surface-text resolution
//!
//! 1. Exact lexicon lookup (synonym-aware).
//! 2. Semantic index search filtered by record kind; for entities,
//!    further restricted to records whose description mentions the
//!    movie domain (keeps "Alien" from resolving to the concept
//!    instead of the film).
//!
//! Resolution failure is a value, not an error: callers get `None`
//! and decide the downstream degradation. Index faults are logged
//! and swallowed the same way.

use crate::index::{SearchFilter, SemanticIndex};
use crate::lexicon::Lexicon;
use std::sync::Arc;
use tracing::{debug, warn};

/// Blended score below which a semantic match is treated as a miss
/// rather than a resolution.
const MIN_RESOLUTION_SCORE: f32 = 0.1;

/// Resolves cleaned surface strings to canonical identifiers
pub struct EntityResolver {
    lexicon: Arc<Lexicon>,
    index: Arc<dyn SemanticIndex>,
}

impl EntityResolver {
    pub fn new(lexicon: Arc<Lexicon>, index: Arc<dyn SemanticIndex>) -> Self {
        Self { lexicon, index }
    }

    /// Resolve an entity mention to its uri
    pub async fn resolve_entity(&self, surface: &str) -> Option<String> {
        self.resolve(surface, SearchFilter::movie_entities()).await
    }

    /// Resolve a relation mention to its uri
    pub async fn resolve_relation(&self, surface: &str) -> Option<String> {
        self.resolve(surface, SearchFilter::relations()).await
    }

    async fn resolve(&self, surface: &str, filter: SearchFilter) -> Option<String> {
        let surface = surface.trim();
        if surface.is_empty() {
            return None;
        }

        if let Some(uri) = self.lexicon.resolve(surface) {
            debug!(surface, uri, "Lexicon hit");
            return Some(uri.to_string());
        }

        match self.index.search(surface, &filter, 1).await {
            Ok(results) => {
                let top = results.into_iter().next()?;
                if top.score < MIN_RESOLUTION_SCORE {
                    debug!(surface, score = top.score, "Best match below confidence floor");
                    return None;
                }
                debug!(
                    surface,
                    uri = %top.record.uri,
                    score = top.score,
                    "Semantic resolution"
                );
                Some(top.record.uri)
            }
            Err(e) => {
                warn!(surface, error = %e, "Semantic index search failed");
                None
            }
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::InMemoryIndex;
    use crate::rerank::TermOverlapReranker;
    use cinegraph_common::embeddings::MockEmbedder;
    use cinegraph_common::types::{EntityKind, IndexRecord};

    async fn resolver() -> EntityResolver {
        let mut lexicon = Lexicon::empty();
        lexicon.add_entry("wdt:P57", "director");
        lexicon.add_entry("wd:Q25188", "Inception");
        let lexicon = Arc::new(lexicon);

        let index = InMemoryIndex::new(
            Arc::new(MockEmbedder::new(128)),
            Arc::new(TermOverlapReranker::default()),
            10,
        );
        index
            .insert_batch(vec![
                IndexRecord::new("wd:Q172241", "The Godfather", "1972 crime movie", EntityKind::Entity),
                IndexRecord::new("wdt:P577", "publication date", "date a work was first published", EntityKind::Relation),
            ])
            .await
            .unwrap();

        EntityResolver::new(lexicon, Arc::new(index))
    }

    #[tokio::test]
    async fn test_lexicon_hit_skips_index() {
        let resolver = resolver().await;
        // "Inception" is only in the lexicon, not the index
        assert_eq!(
            resolver.resolve_entity("Inception").await,
            Some("wd:Q25188".to_string())
        );
    }

    #[tokio::test]
    async fn test_synonym_hit() {
        let resolver = resolver().await;
        assert_eq!(
            resolver.resolve_relation("directed").await,
            Some("wdt:P57".to_string())
        );
    }

    #[tokio::test]
    async fn test_semantic_fallback() {
        let resolver = resolver().await;
        assert_eq!(
            resolver.resolve_entity("the Godfather").await,
            Some("wd:Q172241".to_string())
        );
    }

    #[tokio::test]
    async fn test_low_confidence_is_none() {
        let resolver = resolver().await;
        assert_eq!(resolver.resolve_entity("zzzz qqqq").await, None);
    }

    #[tokio::test]
    async fn test_empty_surface_is_none() {
        let resolver = resolver().await;
        assert_eq!(resolver.resolve_entity("  ").await, None);
    }
}
