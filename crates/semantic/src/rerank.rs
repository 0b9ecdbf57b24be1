//! Candidate re-ranking after the vector stage
//!
//! The vector stage is recall-oriented; a `Reranker` rescores its
//! top candidates against the query before the best match is taken.
//! The trait is the seam for a cross-encoder relevance model served
//! elsewhere; the embedded default is a term-overlap scorer that is
//! deterministic and dependency-free.

use cinegraph_common::types::ScoredRecord;

/// Rescores search candidates against the original query
pub trait Reranker: Send + Sync {
    /// Return candidates reordered best-first with updated scores.
    /// Must be deterministic for a fixed query and candidate list.
    fn rerank(&self, query: &str, candidates: Vec<ScoredRecord>) -> Vec<ScoredRecord>;
}

/// Term-overlap reranker: scores a candidate by the fraction of
/// query tokens present in its label and description, blended with
/// the vector score as a tiebreaker.
pub struct TermOverlapReranker {
    /// Weight of the overlap score against the vector score
    pub overlap_weight: f32,
}

impl Default for TermOverlapReranker {
    fn default() -> Self {
        Self {
            overlap_weight: 0.7,
        }
    }
}

impl TermOverlapReranker {
    fn overlap(query: &str, text: &str) -> f32 {
        let text = text.to_lowercase();
        let tokens: Vec<&str> = query
            .split_whitespace()
            .filter(|t| t.len() > 2)
            .collect();
        if tokens.is_empty() {
            return 0.0;
        }
        let hits = tokens
            .iter()
            .filter(|t| text.contains(&t.to_lowercase()))
            .count();
        hits as f32 / tokens.len() as f32
    }
}

impl Reranker for TermOverlapReranker {
    fn rerank(&self, query: &str, mut candidates: Vec<ScoredRecord>) -> Vec<ScoredRecord> {
        for candidate in &mut candidates {
            let text = format!("{} {}", candidate.record.label, candidate.record.description);
            let overlap = Self::overlap(query, &text);
            candidate.score =
                self.overlap_weight * overlap + (1.0 - self.overlap_weight) * candidate.score;
        }

        // Stable sort keeps vector order for equal scores
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinegraph_common::types::{EntityKind, IndexRecord};

    fn scored(label: &str, description: &str, score: f32) -> ScoredRecord {
        ScoredRecord {
            record: IndexRecord::new("wd:Q0", label, description, EntityKind::Entity),
            score,
        }
    }

    #[test]
    fn test_overlap_promotes_matching_label() {
        let reranker = TermOverlapReranker::default();
        let results = reranker.rerank(
            "the godfather",
            vec![
                scored("The Godmother", "1991 film", 0.9),
                scored("The Godfather", "1972 crime film", 0.8),
            ],
        );
        assert_eq!(results[0].record.label, "The Godfather");
    }

    #[test]
    fn test_deterministic() {
        let reranker = TermOverlapReranker::default();
        let candidates = vec![
            scored("Heat", "1995 crime film", 0.5),
            scored("Heat", "2006 documentary", 0.5),
        ];
        let a = reranker.rerank("heat crime", candidates.clone());
        let b = reranker.rerank("heat crime", candidates);
        assert_eq!(a[0].record.description, b[0].record.description);
    }
}
