//! Multi-entity suggestion scoring
//!
//! Aggregates the structured properties shared by the seed movies
//! into a descriptive query string, then asks the movie semantic
//! index for the closest non-seed titles. All aggregation failures
//! collapse to an empty suggestion list.

use cinegraph_graph::{MovieRecord, MovieTable};
use cinegraph_semantic::index::{SearchFilter, SemanticIndex};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Properties considered when aggregating seed commonalities, in
/// ranking-tiebreak order.
pub const RELEVANT_PROPERTIES: &[&str] = &[
    "instance_of",
    "genre",
    "award_received",
    "main_subject",
    "production_company",
    "after_a_work_by",
];

/// Values kept per property
const VALUES_PER_PROPERTY: usize = 3;

/// Property groups kept in the descriptive string
const MAX_PROPERTY_GROUPS: usize = 5;

/// Publication-year window for the date pseudo-property
const YEAR_WINDOW: i32 = 10;

/// Scores seed movies into ranked suggestions
pub struct SuggestionScorer {
    movies: Arc<MovieTable>,
    movie_index: Arc<dyn SemanticIndex>,
    /// Genre-derived domain keywords, lowercased
    keywords: Vec<String>,
    limit: usize,
}

impl SuggestionScorer {
    pub fn new(
        movies: Arc<MovieTable>,
        movie_index: Arc<dyn SemanticIndex>,
        limit: usize,
    ) -> Self {
        let keywords = genre_keywords(&movies);
        Self {
            movies,
            movie_index,
            keywords,
            limit,
        }
    }

    /// Produce up to `limit` suggested movie labels for the resolved
    /// seeds. `seeds` keeps the question's encounter order: (surface
    /// label, uri). Never fails; misses and index faults yield an
    /// empty list.
    pub async fn suggest(&self, seeds: &[(String, String)], question: &str) -> Vec<String> {
        if seeds.is_empty() {
            return Vec::new();
        }

        let records: Vec<&MovieRecord> = seeds
            .iter()
            .filter_map(|(label, uri)| {
                let record = self.movies.record(uri);
                if record.is_none() {
                    warn!(label, uri, "Seed not in movie table");
                }
                record
            })
            .collect();
        if records.is_empty() {
            return Vec::new();
        }

        let mut query = self.descriptive_string(&records);
        for keyword in self.find_keywords(question) {
            if !query.is_empty() {
                query.push_str(", ");
            }
            query.push_str(&keyword);
        }
        if query.is_empty() {
            debug!("No common properties among seeds");
            return Vec::new();
        }
        info!(query = %query, seeds = seeds.len(), "Suggestion search");

        let filter = SearchFilter {
            kind: None,
            description_any: Vec::new(),
            exclude_labels: seeds.iter().map(|(label, _)| label.clone()).collect(),
        };
        match self.movie_index.search(&query, &filter, self.limit).await {
            Ok(results) => results
                .into_iter()
                .map(|scored| scored.record.label)
                .collect(),
            Err(e) => {
                warn!(error = %e, "Suggestion search failed");
                Vec::new()
            }
        }
    }

    /// Build the ranked descriptive string from seed commonalities
    fn descriptive_string(&self, records: &[&MovieRecord]) -> String {
        // (property order, group frequency, joined values)
        let mut groups: Vec<(usize, usize)> = Vec::new();
        let mut group_texts: Vec<String> = Vec::new();

        for (order, property) in RELEVANT_PROPERTIES.iter().enumerate() {
            let values = common_values(records, property);
            if values.is_empty() {
                continue;
            }
            let frequency = values[0].1;
            let text = values
                .iter()
                .map(|(value, _)| value.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            groups.push((order, frequency));
            group_texts.push(text);
        }

        // Rank by frequency, ties by property order; stable sort
        let mut ranked: Vec<usize> = (0..groups.len()).collect();
        ranked.sort_by(|&a, &b| {
            groups[b]
                .1
                .cmp(&groups[a].1)
                .then(groups[a].0.cmp(&groups[b].0))
        });
        ranked.truncate(MAX_PROPERTY_GROUPS);

        let mut parts: Vec<String> = ranked
            .into_iter()
            .map(|i| group_texts[i].clone())
            .collect();

        if let Some(year) = average_year(records) {
            parts.push(year.to_string());
        }

        parts.join(", ")
    }

    /// Domain keywords literally present in the question, with
    /// plural forms normalized against the keyword list.
    fn find_keywords(&self, question: &str) -> Vec<String> {
        let question = question.to_lowercase();
        let tokens: Vec<&str> = question
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        let mut found = Vec::new();
        for keyword in &self.keywords {
            let direct = question.contains(keyword.as_str());
            let singular = tokens
                .iter()
                .any(|t| singular_forms(t).iter().any(|form| form == keyword));
            if (direct || singular) && !found.contains(keyword) {
                found.push(keyword.clone());
            }
        }
        found
    }
}

/// Candidate singular forms of a question token ("comedies" ->
/// "comedy", "thrillers" -> "thriller").
fn singular_forms(token: &str) -> Vec<String> {
    let mut forms = vec![token.to_string()];
    if let Some(stem) = token.strip_suffix("ies") {
        forms.push(format!("{}y", stem));
    }
    if let Some(stem) = token.strip_suffix("es") {
        forms.push(stem.to_string());
    }
    if let Some(stem) = token.strip_suffix('s') {
        forms.push(stem.to_string());
    }
    forms
}

/// Values of one property that qualify as "common": frequency > 1
/// across the seeds, or every value when there is a single seed.
/// Returns at most three (value, frequency) pairs, most frequent
/// first, ties in encounter order.
fn common_values(records: &[&MovieRecord], property: &str) -> Vec<(String, usize)> {
    let single_seed = records.len() == 1;

    // Encounter-ordered frequency table
    let mut counts: Vec<(String, usize)> = Vec::new();
    for record in records {
        for value in record.values(property) {
            match counts.iter_mut().find(|(v, _)| v == value) {
                Some((_, count)) => *count += 1,
                None => counts.push((value.clone(), 1)),
            }
        }
    }

    counts.retain(|(_, count)| *count > 1 || single_seed);
    // Stable sort keeps encounter order among equal frequencies
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(VALUES_PER_PROPERTY);
    counts
}

/// Arithmetic mean publication year over the dated seeds, only when
/// there is more than one seed and all dates fall within the year
/// window.
fn average_year(records: &[&MovieRecord]) -> Option<i32> {
    if records.len() < 2 {
        return None;
    }
    let years: Vec<i32> = records
        .iter()
        .filter_map(|record| record.publication_year)
        .collect();
    if years.is_empty() {
        return None;
    }
    let min = *years.iter().min()?;
    let max = *years.iter().max()?;
    if max - min > YEAR_WINDOW {
        return None;
    }
    Some(years.iter().sum::<i32>() / years.len() as i32)
}

/// Distinct lowercase genre values, used as domain keywords
fn genre_keywords(movies: &MovieTable) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keywords = Vec::new();
    for record in movies.records() {
        for value in record.values("genre") {
            let keyword = value.to_lowercase();
            if seen.insert(keyword.clone()) {
                keywords.push(keyword);
            }
        }
    }
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinegraph_common::embeddings::MockEmbedder;
    use cinegraph_common::types::{EntityKind, IndexRecord};
    use cinegraph_semantic::rerank::TermOverlapReranker;
    use cinegraph_semantic::InMemoryIndex;
    use std::collections::HashMap;

    fn movie(label: &str, uri: &str, year: Option<i32>, genres: &[&str]) -> MovieRecord {
        let mut properties = HashMap::new();
        if !genres.is_empty() {
            properties.insert(
                "genre".to_string(),
                genres.iter().map(|g| g.to_string()).collect(),
            );
        }
        MovieRecord {
            label: label.to_string(),
            uri: uri.to_string(),
            publication_year: year,
            properties,
        }
    }

    fn refs(records: &[MovieRecord]) -> Vec<&MovieRecord> {
        records.iter().collect()
    }

    #[test]
    fn test_shared_value_qualifies() {
        let records = vec![
            movie("A", "wd:Q1", None, &["Action", "Drama"]),
            movie("B", "wd:Q2", None, &["Action", "Comedy"]),
        ];
        let values = common_values(&refs(&records), "genre");
        assert_eq!(values, vec![("Action".to_string(), 2)]);
    }

    #[test]
    fn test_single_seed_keeps_own_values() {
        let records = vec![movie("A", "wd:Q1", None, &["Action", "Drama"])];
        let values = common_values(&refs(&records), "genre");
        assert_eq!(
            values,
            vec![("Action".to_string(), 1), ("Drama".to_string(), 1)]
        );
    }

    #[test]
    fn test_value_cap_and_tie_order() {
        let records = vec![
            movie("A", "wd:Q1", None, &["Action", "Drama", "Crime", "War"]),
            movie("B", "wd:Q2", None, &["Action", "Drama", "Crime", "War"]),
        ];
        let values = common_values(&refs(&records), "genre");
        assert_eq!(values.len(), 3);
        // All tied at 2: encounter order decides
        assert_eq!(values[0].0, "Action");
        assert_eq!(values[2].0, "Crime");
    }

    #[tokio::test]
    async fn test_frequent_group_outranks_earlier_property() {
        // instance_of precedes genre in the property list, but the
        // genre value is shared by all three seeds and must lead.
        let mut a = movie("A", "wd:Q1", None, &["Action"]);
        a.properties
            .insert("instance_of".to_string(), vec!["film".to_string()]);
        let mut b = movie("B", "wd:Q2", None, &["Action"]);
        b.properties
            .insert("instance_of".to_string(), vec!["film".to_string()]);
        let c = movie("C", "wd:Q3", None, &["Action"]);

        let scorer = scorer(Vec::new()).await;
        let records = vec![a, b, c];
        let text = scorer.descriptive_string(&refs(&records));
        assert_eq!(text, "Action, film");
    }

    #[test]
    fn test_average_year_within_window() {
        let records = vec![
            movie("A", "wd:Q1", Some(1994), &[]),
            movie("B", "wd:Q2", Some(1996), &[]),
        ];
        assert_eq!(average_year(&refs(&records)), Some(1995));
    }

    #[test]
    fn test_wide_year_span_omits_date() {
        let records = vec![
            movie("A", "wd:Q1", Some(1972), &[]),
            movie("B", "wd:Q2", Some(1999), &[]),
        ];
        assert_eq!(average_year(&refs(&records)), None);
    }

    #[test]
    fn test_undated_seed_does_not_block_year() {
        let records = vec![
            movie("A", "wd:Q1", Some(1994), &[]),
            movie("B", "wd:Q2", None, &[]),
        ];
        assert_eq!(average_year(&refs(&records)), Some(1994));
    }

    #[test]
    fn test_single_seed_omits_date() {
        let records = vec![movie("A", "wd:Q1", Some(1994), &[])];
        assert_eq!(average_year(&refs(&records)), None);
    }

    async fn scorer(table_records: Vec<MovieRecord>) -> SuggestionScorer {
        let table = Arc::new(MovieTable::from_records(
            table_records,
            vec!["genre".to_string()],
        ));
        let index = InMemoryIndex::new(
            Arc::new(MockEmbedder::new(128)),
            Arc::new(TermOverlapReranker::default()),
            10,
        );
        for record in table.records() {
            let description = record
                .values("genre")
                .join(", ");
            index
                .insert_batch(vec![IndexRecord::new(
                    &record.uri,
                    &record.label,
                    &description,
                    EntityKind::Entity,
                )])
                .await
                .unwrap();
        }
        SuggestionScorer::new(table, Arc::new(index), 5)
    }

    #[tokio::test]
    async fn test_shared_genre_drives_suggestions() {
        let scorer = scorer(vec![
            movie("Movie A", "wd:Q1", None, &["Action"]),
            movie("Movie B", "wd:Q2", None, &["Action"]),
            movie("Movie C", "wd:Q3", None, &["Action"]),
            movie("Quiet Drama", "wd:Q4", None, &["Drama"]),
        ])
        .await;

        let seeds = vec![
            ("Movie A".to_string(), "wd:Q1".to_string()),
            ("Movie B".to_string(), "wd:Q2".to_string()),
        ];
        let suggestions = scorer.suggest(&seeds, "recommend something").await;

        // Seeds are excluded; the shared genre pulls in Movie C first
        assert!(suggestions.contains(&"Movie C".to_string()));
        assert!(!suggestions.contains(&"Movie A".to_string()));
        assert!(!suggestions.contains(&"Movie B".to_string()));
    }

    #[tokio::test]
    async fn test_unresolvable_seeds_yield_empty() {
        let scorer = scorer(vec![movie("Movie A", "wd:Q1", None, &["Action"])]).await;
        let seeds = vec![("Ghost".to_string(), "wd:Q404".to_string())];
        assert!(scorer.suggest(&seeds, "anything").await.is_empty());
    }

    #[tokio::test]
    async fn test_keyword_normalization() {
        let scorer = scorer(vec![movie("Movie A", "wd:Q1", None, &["comedy"])]).await;
        // Plural in the question matches the singular keyword
        let found = scorer.find_keywords("recommend some comedies please");
        assert_eq!(found, vec!["comedy".to_string()]);
    }
}
