//! Index record assembly
//!
//! Turns the lexicon and movie table into `IndexRecord`s ready for
//! insertion. Entries without a description get one fetched
//! concurrently; fetch failures degrade to an empty description
//! rather than failing the build.

use crate::fetch::DescriptionFetcher;
use cinegraph_common::types::{EntityKind, IndexRecord};
use cinegraph_graph::MovieTable;
use cinegraph_semantic::lexicon::Lexicon;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{info, warn};

pub struct IndexBuilder {
    fetcher: Arc<dyn DescriptionFetcher>,
    /// Concurrent in-flight description fetches
    worker_count: usize,
}

impl IndexBuilder {
    pub fn new(fetcher: Arc<dyn DescriptionFetcher>, worker_count: usize) -> Self {
        Self {
            fetcher,
            worker_count: worker_count.max(1),
        }
    }

    /// Records for the resolution index: one per lexicon entry,
    /// classified entity/relation by uri code, descriptions filled
    /// from the lexicon or fetched when missing.
    pub async fn lexicon_records(&self, lexicon: &Lexicon) -> Vec<IndexRecord> {
        let entries: Vec<(String, String, String)> = lexicon
            .entries()
            .map(|(uri, label)| {
                (
                    uri.to_string(),
                    label.to_string(),
                    lexicon.description_of(uri).to_string(),
                )
            })
            .collect();
        let total = entries.len();

        let records: Vec<IndexRecord> = stream::iter(entries)
            .map(|(uri, label, description)| {
                let fetcher = self.fetcher.clone();
                async move {
                    let description = if description.is_empty() {
                        match fetcher.fetch(&uri).await {
                            Ok(Some(fetched)) => fetched,
                            Ok(None) => String::new(),
                            Err(e) => {
                                warn!(uri, error = %e, "Description fetch failed");
                                String::new()
                            }
                        }
                    } else {
                        description
                    };
                    IndexRecord::new(&uri, &label, &description, EntityKind::from_uri(&uri))
                }
            })
            .buffer_unordered(self.worker_count)
            .collect()
            .await;

        info!(total, "Assembled lexicon records");
        records
    }

    /// Records for the movie suggestion index, described by their
    /// property values.
    pub fn movie_records(&self, movies: &MovieTable) -> Vec<IndexRecord> {
        movies
            .records()
            .map(|record| {
                IndexRecord::new(
                    &record.uri,
                    &record.label,
                    &record.descriptive_text(movies.property_names()),
                    EntityKind::Entity,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cinegraph_common::errors::Result;
    use std::collections::HashMap;

    struct MapFetcher(HashMap<String, String>);

    #[async_trait]
    impl DescriptionFetcher for MapFetcher {
        async fn fetch(&self, uri: &str) -> Result<Option<String>> {
            Ok(self.0.get(uri).cloned())
        }
    }

    #[tokio::test]
    async fn test_missing_descriptions_are_fetched() {
        let mut lexicon = Lexicon::empty();
        lexicon.add_entry("http://www.wikidata.org/entity/Q47703", "The Godfather");
        lexicon.add_entry("http://www.wikidata.org/prop/direct/P57", "director");

        let fetcher = MapFetcher(HashMap::from([(
            "http://www.wikidata.org/entity/Q47703".to_string(),
            "1972 film".to_string(),
        )]));
        let builder = IndexBuilder::new(Arc::new(fetcher), 4);

        let mut records = builder.lexicon_records(&lexicon).await;
        records.sort_by(|a, b| a.label.cmp(&b.label));

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].label, "The Godfather");
        assert_eq!(records[0].description, "1972 film");
        assert_eq!(records[0].kind, EntityKind::Entity);
        assert_eq!(records[1].label, "director");
        assert_eq!(records[1].description, "");
        assert_eq!(records[1].kind, EntityKind::Relation);
    }

    #[tokio::test]
    async fn test_existing_descriptions_skip_fetch() {
        struct PanicFetcher;

        #[async_trait]
        impl DescriptionFetcher for PanicFetcher {
            async fn fetch(&self, uri: &str) -> Result<Option<String>> {
                panic!("unexpected fetch for {uri}");
            }
        }

        let mut lexicon = Lexicon::empty();
        lexicon.add_entry("http://www.wikidata.org/entity/Q47703", "The Godfather");
        lexicon.set_description("http://www.wikidata.org/entity/Q47703", "1972 film");

        let builder = IndexBuilder::new(Arc::new(PanicFetcher), 4);
        let records = builder.lexicon_records(&lexicon).await;
        assert_eq!(records[0].description, "1972 film");
    }
}
