//! Lexicon index: surface labels <-> canonical identifiers
//!
//! Loaded from two flat CSV tables (`uri,label` and
//! `uri,description`) at startup. Lookups are case-insensitive exact
//! matches, extended by a configured synonym table so that e.g.
//! "directed" and "directs" resolve like "director". Many labels may
//! map to one uri; the file's first mapping wins per label.

use cinegraph_common::errors::Result;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Built-in relation synonyms. Extend through `add_synonyms`.
const DEFAULT_SYNONYMS: &[(&str, &[&str])] = &[
    ("director", &["directed", "directs"]),
    ("screenwriter", &["writer", "wrote", "screenplay"]),
    ("cast member", &["actor", "actress", "starred", "stars"]),
    ("publication date", &["released", "release date", "premiered"]),
    ("genre", &["kind", "category"]),
];

/// In-memory label/description lexicon
pub struct Lexicon {
    label_to_uri: HashMap<String, String>,
    uri_to_label: HashMap<String, String>,
    descriptions: HashMap<String, String>,
    /// alias (lowercased) -> canonical label (lowercased)
    synonyms: HashMap<String, String>,
}

impl Lexicon {
    /// Load label and description tables from CSV files. The
    /// description table is optional; pass `None` to skip it.
    pub fn load(labels_path: &Path, descriptions_path: Option<&Path>) -> Result<Self> {
        let mut lexicon = Self::empty();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(labels_path)?;
        for (row_no, row) in reader.records().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    warn!(row = row_no + 1, error = %e, "Skipping unreadable lexicon row");
                    continue;
                }
            };
            let (Some(uri), Some(label)) = (row.get(0), row.get(1)) else {
                warn!(row = row_no + 1, "Skipping short lexicon row");
                continue;
            };
            lexicon.add_entry(uri.trim(), label.trim());
        }

        if let Some(path) = descriptions_path {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .from_path(path)?;
            for row in reader.records() {
                let Ok(row) = row else { continue };
                if let (Some(uri), Some(description)) = (row.get(0), row.get(1)) {
                    lexicon
                        .descriptions
                        .insert(uri.trim().to_string(), description.trim().to_string());
                }
            }
        }

        info!(
            labels = lexicon.label_to_uri.len(),
            descriptions = lexicon.descriptions.len(),
            "Loaded lexicon"
        );
        Ok(lexicon)
    }

    /// Empty lexicon with the default synonym table
    pub fn empty() -> Self {
        let mut lexicon = Self {
            label_to_uri: HashMap::new(),
            uri_to_label: HashMap::new(),
            descriptions: HashMap::new(),
            synonyms: HashMap::new(),
        };
        for (canonical, aliases) in DEFAULT_SYNONYMS {
            lexicon.add_synonyms(canonical, aliases);
        }
        lexicon
    }

    /// Register one label <-> uri pair. The first label for a uri
    /// becomes its display label; the first uri for a label wins
    /// lookups.
    pub fn add_entry(&mut self, uri: &str, label: &str) {
        if uri.is_empty() || label.is_empty() {
            return;
        }
        self.label_to_uri
            .entry(label.to_lowercase())
            .or_insert_with(|| uri.to_string());
        self.uri_to_label
            .entry(uri.to_string())
            .or_insert_with(|| label.to_string());
    }

    /// Attach or replace the description of a uri
    pub fn set_description(&mut self, uri: &str, description: &str) {
        self.descriptions
            .insert(uri.to_string(), description.to_string());
    }

    /// Register aliases that resolve like `canonical`
    pub fn add_synonyms(&mut self, canonical: &str, aliases: &[&str]) {
        for alias in aliases {
            self.synonyms
                .insert(alias.to_lowercase(), canonical.to_lowercase());
        }
    }

    /// Exact-match resolution of a surface label, synonym-aware
    pub fn resolve(&self, surface: &str) -> Option<&str> {
        let key = surface.trim().to_lowercase();
        if let Some(uri) = self.label_to_uri.get(&key) {
            return Some(uri);
        }
        let canonical = self.synonyms.get(&key)?;
        self.label_to_uri.get(canonical).map(|s| s.as_str())
    }

    /// Display label for a uri
    pub fn label_of(&self, uri: &str) -> Option<&str> {
        self.uri_to_label.get(uri).map(|s| s.as_str())
    }

    /// Description for a uri, empty string when unknown
    pub fn description_of(&self, uri: &str) -> &str {
        self.descriptions.get(uri).map(|s| s.as_str()).unwrap_or("")
    }

    /// All (uri, label) pairs, for index building
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.uri_to_label
            .iter()
            .map(|(uri, label)| (uri.as_str(), label.as_str()))
    }

    pub fn len(&self) -> usize {
        self.uri_to_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uri_to_label.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample() -> Lexicon {
        let mut lexicon = Lexicon::empty();
        lexicon.add_entry("http://www.wikidata.org/prop/direct/P57", "director");
        lexicon.add_entry("http://www.wikidata.org/entity/Q25188", "Inception");
        lexicon
    }

    #[test]
    fn test_exact_resolution() {
        let lexicon = sample();
        assert_eq!(
            lexicon.resolve("director"),
            Some("http://www.wikidata.org/prop/direct/P57")
        );
        // Case-insensitive
        assert_eq!(
            lexicon.resolve("inception"),
            Some("http://www.wikidata.org/entity/Q25188")
        );
    }

    #[test]
    fn test_synonym_resolution() {
        let lexicon = sample();
        assert_eq!(
            lexicon.resolve("directed"),
            Some("http://www.wikidata.org/prop/direct/P57")
        );
        assert_eq!(
            lexicon.resolve("directs"),
            Some("http://www.wikidata.org/prop/direct/P57")
        );
    }

    #[test]
    fn test_miss_is_none() {
        let lexicon = sample();
        assert_eq!(lexicon.resolve("cinematographer"), None);
    }

    #[test]
    fn test_first_mapping_wins() {
        let mut lexicon = Lexicon::empty();
        lexicon.add_entry("wd:Q1", "Alien");
        lexicon.add_entry("wd:Q2", "Alien");
        assert_eq!(lexicon.resolve("Alien"), Some("wd:Q1"));
    }

    #[test]
    fn test_load_from_csv() {
        let mut labels = tempfile::NamedTempFile::new().unwrap();
        writeln!(labels, "wd:Q25188,Inception").unwrap();
        writeln!(labels, "wdt:P57,director").unwrap();
        labels.flush().unwrap();

        let mut descs = tempfile::NamedTempFile::new().unwrap();
        writeln!(descs, "wd:Q25188,2010 science fiction film").unwrap();
        descs.flush().unwrap();

        let lexicon = Lexicon::load(labels.path(), Some(descs.path())).unwrap();
        assert_eq!(lexicon.len(), 2);
        assert_eq!(lexicon.resolve("Inception"), Some("wd:Q25188"));
        assert_eq!(
            lexicon.description_of("wd:Q25188"),
            "2010 science fiction film"
        );
        assert_eq!(lexicon.description_of("wd:Q404"), "");
    }
}
