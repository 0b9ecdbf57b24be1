//! Semantic vector index
//!
//! Nearest-neighbor search over entity/relation description
//! embeddings with metadata filtering and re-ranking. `SemanticIndex`
//! is the service boundary; `InMemoryIndex` is the embedded
//! implementation used in-process. The read path takes a shared
//! lock only; inserts happen on the offline write path.

use crate::rerank::Reranker;
use async_trait::async_trait;
use cinegraph_common::embeddings::Embedder;
use cinegraph_common::errors::Result;
use cinegraph_common::types::{EntityKind, IndexRecord, ScoredRecord};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Metadata filter applied before ranking
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    /// Restrict to one record kind
    pub kind: Option<EntityKind>,

    /// Keep only records whose description contains at least one of
    /// these keywords (case-insensitive). Empty means no restriction.
    pub description_any: Vec<String>,

    /// Drop records with these labels (case-insensitive); used to
    /// keep suggestion seeds out of their own result list.
    pub exclude_labels: Vec<String>,
}

impl SearchFilter {
    /// Filter for graph-entity resolution: entities whose
    /// description mentions the movie domain.
    pub fn movie_entities() -> Self {
        Self {
            kind: Some(EntityKind::Entity),
            description_any: vec!["movie".to_string(), "film".to_string()],
            exclude_labels: Vec::new(),
        }
    }

    /// Filter for relation resolution
    pub fn relations() -> Self {
        Self {
            kind: Some(EntityKind::Relation),
            description_any: Vec::new(),
            exclude_labels: Vec::new(),
        }
    }

    fn matches(&self, record: &IndexRecord) -> bool {
        if let Some(kind) = self.kind {
            if record.kind != kind {
                return false;
            }
        }
        if !self.description_any.is_empty() {
            let description = record.description.to_lowercase();
            if !self
                .description_any
                .iter()
                .any(|kw| description.contains(&kw.to_lowercase()))
            {
                return false;
            }
        }
        if !self.exclude_labels.is_empty() {
            let label = record.label.to_lowercase();
            if self
                .exclude_labels
                .iter()
                .any(|ex| ex.to_lowercase() == label)
            {
                return false;
            }
        }
        true
    }
}

/// Query interface of the semantic index
#[async_trait]
pub trait SemanticIndex: Send + Sync {
    /// Ranked nearest neighbors for a query string
    async fn search(
        &self,
        query: &str,
        filter: &SearchFilter,
        limit: usize,
    ) -> Result<Vec<ScoredRecord>>;

    /// Insert a batch of records (write path only)
    async fn insert_batch(&self, records: Vec<IndexRecord>) -> Result<()>;

    /// Number of indexed records
    async fn record_count(&self) -> usize;
}

/// Embedded vector index over in-memory records
pub struct InMemoryIndex {
    embedder: Arc<dyn Embedder>,
    reranker: Arc<dyn Reranker>,
    /// Candidates pulled from the vector stage before re-ranking
    rerank_candidates: usize,
    records: RwLock<Vec<(IndexRecord, Vec<f32>)>>,
}

impl InMemoryIndex {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        reranker: Arc<dyn Reranker>,
        rerank_candidates: usize,
    ) -> Self {
        Self {
            embedder,
            reranker,
            rerank_candidates,
            records: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SemanticIndex for InMemoryIndex {
    async fn search(
        &self,
        query: &str,
        filter: &SearchFilter,
        limit: usize,
    ) -> Result<Vec<ScoredRecord>> {
        let query_vector = self.embedder.embed(query).await?;

        let records = self.records.read().await;
        let mut candidates: Vec<ScoredRecord> = records
            .iter()
            .filter(|(record, _)| filter.matches(record))
            .map(|(record, vector)| ScoredRecord {
                record: record.clone(),
                score: cosine_similarity(&query_vector, vector),
            })
            .collect();
        drop(records);

        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(self.rerank_candidates.max(limit));

        let mut ranked = self.reranker.rerank(query, candidates);
        ranked.truncate(limit);

        debug!(query, results = ranked.len(), "Semantic search");
        Ok(ranked)
    }

    async fn insert_batch(&self, batch: Vec<IndexRecord>) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let texts: Vec<String> = batch.iter().map(|r| r.index_text()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        let mut records = self.records.write().await;
        records.extend(batch.into_iter().zip(vectors));
        debug!(total = records.len(), "Inserted index batch");
        Ok(())
    }

    async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }
}

/// Cosine similarity between two vectors; 0.0 when either is zero
/// or lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
