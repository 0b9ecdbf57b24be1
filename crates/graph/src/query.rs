//! Graph query engine
//!
//! Answers a resolved (entity, relation) pair by selecting the
//! objects of `<entity> <relation> ?obj`, preferring each object's
//! display label and falling back to its raw string (COALESCE
//! semantics). An empty result is the empty string, which callers
//! read as "no factual answer" rather than an error.

use crate::store::{Term, TripleStore};
use std::sync::Arc;
use tracing::debug;

/// Read-only query interface over the triple store
pub struct GraphQueryEngine {
    store: Arc<TripleStore>,
    /// Separator between multiple result rows
    row_separator: String,
}

impl GraphQueryEngine {
    pub fn new(store: Arc<TripleStore>, row_separator: String) -> Self {
        Self {
            store,
            row_separator,
        }
    }

    /// Answer `<entity> <relation> ?obj` as one concatenated string.
    /// Rows are joined with the configured separator; empty result
    /// sets yield `""`.
    pub fn answer(&self, entity_uri: &str, relation_uri: &str) -> String {
        let rows = self.answer_rows(entity_uri, relation_uri);
        debug!(
            entity = entity_uri,
            relation = relation_uri,
            rows = rows.len(),
            "Graph query executed"
        );
        rows.join(&self.row_separator)
    }

    /// Same query, one string per result row
    pub fn answer_rows(&self, entity_uri: &str, relation_uri: &str) -> Vec<String> {
        self.store
            .objects(entity_uri, relation_uri)
            .iter()
            .map(|term| self.display(term))
            .collect()
    }

    /// COALESCE(?objLabel, STR(?obj))
    fn display(&self, term: &Term) -> String {
        match term {
            Term::Uri(uri) => self
                .store
                .label_of(uri)
                .map(str::to_string)
                .unwrap_or_else(|| uri.clone()),
            Term::Literal { value, .. } => value.clone(),
        }
    }

    pub fn store(&self) -> &TripleStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Triple, RDFS_LABEL};

    fn engine(triples: Vec<Triple>) -> GraphQueryEngine {
        GraphQueryEngine::new(Arc::new(TripleStore::from_triples(triples)), "\n".to_string())
    }

    fn triple(s: &str, p: &str, o: Term) -> Triple {
        Triple {
            subject: s.to_string(),
            predicate: p.to_string(),
            object: o,
        }
    }

    #[test]
    fn test_label_preferred_over_uri() {
        let engine = engine(vec![
            triple("wd:Q1", "wdt:P57", Term::Uri("wd:Q2".to_string())),
            triple(
                "wd:Q2",
                RDFS_LABEL,
                Term::literal("Christopher Nolan"),
            ),
        ]);

        assert_eq!(engine.answer("wd:Q1", "wdt:P57"), "Christopher Nolan");
    }

    #[test]
    fn test_coalesce_falls_back_to_raw_string() {
        let engine = engine(vec![triple(
            "wd:Q1",
            "wdt:P57",
            Term::Uri("wd:Q2".to_string()),
        )]);

        // No label triple for Q2: raw uri comes through
        assert_eq!(engine.answer("wd:Q1", "wdt:P57"), "wd:Q2");
    }

    #[test]
    fn test_literal_object_passes_through() {
        let engine = engine(vec![triple(
            "wd:Q1",
            "wdt:P577",
            Term::literal("2010-07-16"),
        )]);

        assert_eq!(engine.answer("wd:Q1", "wdt:P577"), "2010-07-16");
    }

    #[test]
    fn test_no_triples_yields_empty_string() {
        let engine = engine(vec![]);
        assert_eq!(engine.answer("wd:Q1", "wdt:P57"), "");
    }

    #[test]
    fn test_multiple_rows_joined_by_separator() {
        let engine = engine(vec![
            triple("wd:Q1", "wdt:P136", Term::Uri("wd:Q3".to_string())),
            triple("wd:Q1", "wdt:P136", Term::Uri("wd:Q4".to_string())),
            triple("wd:Q3", RDFS_LABEL, Term::literal("Action")),
            triple("wd:Q4", RDFS_LABEL, Term::literal("Thriller")),
        ]);

        assert_eq!(engine.answer("wd:Q1", "wdt:P136"), "Action\nThriller");
    }
}
