//! Append-only triple store loaded once at startup
//!
//! Parses an N-Triples subset:
//! - `<s> <p> <o> .`
//! - `<s> <p> "literal" .` with optional `@lang` or `^^<datatype>`
//!
//! Malformed lines are skipped with a warning; the load never fails
//! on individual records. The store is read-only after load and
//! shared by all requests without locking.

use cinegraph_common::errors::Result;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

/// rdfs:label predicate used for display-label joins
pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";

/// Object position of a triple
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// A graph node reference
    Uri(String),
    /// A literal with its language tag, if any. Datatype suffixes
    /// are dropped at parse time.
    Literal {
        value: String,
        lang: Option<String>,
    },
}

impl Term {
    /// An untagged literal
    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            lang: None,
        }
    }

    /// Raw string form used when no label join is possible
    pub fn as_str(&self) -> &str {
        match self {
            Term::Uri(s) => s,
            Term::Literal { value, .. } => value,
        }
    }
}

/// One parsed statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: Term,
}

/// In-memory triple store with subject+predicate and label indexes
pub struct TripleStore {
    /// (subject, predicate) -> objects, in file order
    spo: HashMap<(String, String), Vec<Term>>,
    /// uri -> (display label, label was tagged `@en`)
    labels: HashMap<String, (String, bool)>,
    triple_count: usize,
}

impl TripleStore {
    /// Load a store from an N-Triples file
    pub fn load(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "Loading graph...");
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut store = Self {
            spo: HashMap::new(),
            labels: HashMap::new(),
            triple_count: 0,
        };

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            match parse_line(trimmed) {
                Some(triple) => store.insert(triple),
                None => {
                    warn!(line = line_no + 1, "Skipping malformed triple");
                }
            }
        }

        info!(
            triples = store.triple_count,
            labels = store.labels.len(),
            "Successfully loaded graph"
        );
        Ok(store)
    }

    /// Build a store from already-parsed triples (tests, fixtures)
    pub fn from_triples(triples: Vec<Triple>) -> Self {
        let mut store = Self {
            spo: HashMap::new(),
            labels: HashMap::new(),
            triple_count: 0,
        };
        for triple in triples {
            store.insert(triple);
        }
        store
    }

    fn insert(&mut self, triple: Triple) {
        if triple.predicate == RDFS_LABEL {
            if let Term::Literal {
                ref value,
                ref lang,
            } = triple.object
            {
                // An @en label wins over any untagged or foreign
                // label; otherwise the first label in file order
                // stays.
                let is_en = lang.as_deref() == Some("en");
                match self.labels.entry(triple.subject.clone()) {
                    Entry::Vacant(slot) => {
                        slot.insert((value.clone(), is_en));
                    }
                    Entry::Occupied(mut slot) => {
                        if is_en && !slot.get().1 {
                            slot.insert((value.clone(), true));
                        }
                    }
                }
            }
        }

        self.spo
            .entry((triple.subject.clone(), triple.predicate.clone()))
            .or_default()
            .push(triple.object);
        self.triple_count += 1;
    }

    /// Objects of `subject predicate ?obj`, in file order
    pub fn objects(&self, subject: &str, predicate: &str) -> &[Term] {
        self.spo
            .get(&(subject.to_string(), predicate.to_string()))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Display label of a uri, if any
    pub fn label_of(&self, uri: &str) -> Option<&str> {
        self.labels.get(uri).map(|(label, _)| label.as_str())
    }

    /// Number of loaded triples
    pub fn len(&self) -> usize {
        self.triple_count
    }

    pub fn is_empty(&self) -> bool {
        self.triple_count == 0
    }
}

/// Parse one N-Triples line; `None` on anything unexpected.
fn parse_line(line: &str) -> Option<Triple> {
    let rest = line.strip_suffix('.').map(str::trim_end).unwrap_or(line);

    let (subject, rest) = parse_uri(rest.trim_start())?;
    let (predicate, rest) = parse_uri(rest.trim_start())?;
    let object = parse_term(rest.trim())?;

    Some(Triple {
        subject,
        predicate,
        object,
    })
}

/// Parse a leading `<uri>`; returns the uri and the remainder.
fn parse_uri(input: &str) -> Option<(String, &str)> {
    let rest = input.strip_prefix('<')?;
    let end = rest.find('>')?;
    Some((rest[..end].to_string(), &rest[end + 1..]))
}

/// Parse an object term: `<uri>` or `"literal"` with optional
/// language tag (kept) or datatype suffix (dropped).
fn parse_term(input: &str) -> Option<Term> {
    if input.starts_with('<') {
        let (uri, rest) = parse_uri(input)?;
        if !rest.trim().is_empty() {
            debug!(trailing = rest, "Trailing content after object uri");
        }
        return Some(Term::Uri(uri));
    }

    let rest = input.strip_prefix('"')?;
    // Literals may contain escaped quotes
    let mut end = None;
    let mut prev_backslash = false;
    for (i, c) in rest.char_indices() {
        if c == '"' && !prev_backslash {
            end = Some(i);
            break;
        }
        prev_backslash = c == '\\' && !prev_backslash;
    }
    let end = end?;
    let value = rest[..end].replace("\\\"", "\"");
    let lang = rest[end + 1..]
        .strip_prefix('@')
        .map(|tag| {
            tag.split_whitespace()
                .next()
                .unwrap_or(tag)
                .to_string()
        })
        .filter(|tag| !tag.is_empty());
    Some(Term::Literal { value, lang })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const WD: &str = "http://www.wikidata.org/entity";
    const WDT: &str = "http://www.wikidata.org/prop/direct";

    fn uri(ns: &str, code: &str) -> String {
        format!("{}/{}", ns, code)
    }

    #[test]
    fn test_parse_uri_object() {
        let line = format!("<{}/Q1> <{}/P57> <{}/Q2> .", WD, WDT, WD);
        let triple = parse_line(&line).unwrap();
        assert_eq!(triple.subject, uri(WD, "Q1"));
        assert_eq!(triple.predicate, uri(WDT, "P57"));
        assert_eq!(triple.object, Term::Uri(uri(WD, "Q2")));
    }

    #[test]
    fn test_parse_tagged_literal() {
        let line = format!("<{}/Q1> <{}> \"Inception\"@en .", WD, RDFS_LABEL);
        let triple = parse_line(&line).unwrap();
        assert_eq!(
            triple.object,
            Term::Literal {
                value: "Inception".to_string(),
                lang: Some("en".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_typed_literal() {
        let line = format!(
            "<{}/Q1> <{}/P577> \"2010-07-16\"^^<http://www.w3.org/2001/XMLSchema#date> .",
            WD, WDT
        );
        let triple = parse_line(&line).unwrap();
        assert_eq!(triple.object, Term::literal("2010-07-16"));
    }

    #[test]
    fn test_malformed_line_is_none() {
        assert!(parse_line("not a triple").is_none());
        assert!(parse_line("<subject only> .").is_none());
    }

    #[test]
    fn test_objects_and_labels() {
        let store = TripleStore::from_triples(vec![
            Triple {
                subject: uri(WD, "Q1"),
                predicate: uri(WDT, "P57"),
                object: Term::Uri(uri(WD, "Q2")),
            },
            Triple {
                subject: uri(WD, "Q2"),
                predicate: RDFS_LABEL.to_string(),
                object: Term::literal("Christopher Nolan"),
            },
        ]);

        let objs = store.objects(&uri(WD, "Q1"), &uri(WDT, "P57"));
        assert_eq!(objs, &[Term::Uri(uri(WD, "Q2"))]);
        assert_eq!(store.label_of(&uri(WD, "Q2")), Some("Christopher Nolan"));
        assert!(store.objects(&uri(WD, "Q9"), &uri(WDT, "P57")).is_empty());
    }

    fn label(subject: &str, value: &str, lang: Option<&str>) -> Triple {
        Triple {
            subject: subject.to_string(),
            predicate: RDFS_LABEL.to_string(),
            object: Term::Literal {
                value: value.to_string(),
                lang: lang.map(str::to_string),
            },
        }
    }

    #[test]
    fn test_english_label_wins_over_earlier_foreign() {
        let store = TripleStore::from_triples(vec![
            label("wd:Q47703", "Il Padrino", Some("it")),
            label("wd:Q47703", "The Godfather", Some("en")),
        ]);
        assert_eq!(store.label_of("wd:Q47703"), Some("The Godfather"));
    }

    #[test]
    fn test_english_label_kept_against_later_labels() {
        let store = TripleStore::from_triples(vec![
            label("wd:Q47703", "The Godfather", Some("en")),
            label("wd:Q47703", "Der Pate", Some("de")),
            label("wd:Q47703", "Le Parrain", None),
        ]);
        assert_eq!(store.label_of("wd:Q47703"), Some("The Godfather"));
    }

    #[test]
    fn test_first_label_wins_without_english() {
        let store = TripleStore::from_triples(vec![
            label("wd:Q47703", "Il Padrino", Some("it")),
            label("wd:Q47703", "Der Pate", Some("de")),
        ]);
        assert_eq!(store.label_of("wd:Q47703"), Some("Il Padrino"));
    }

    #[test]
    fn test_load_prefers_english_label() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "<{}/Q1> <{}> \"Il Padrino\"@it .", WD, RDFS_LABEL).unwrap();
        writeln!(file, "<{}/Q1> <{}> \"The Godfather\"@en .", WD, RDFS_LABEL).unwrap();
        file.flush().unwrap();

        let store = TripleStore::load(file.path()).unwrap();
        assert_eq!(store.label_of(&uri(WD, "Q1")), Some("The Godfather"));
    }

    #[test]
    fn test_load_skips_bad_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "<{}/Q1> <{}/P57> <{}/Q2> .", WD, WDT, WD).unwrap();
        writeln!(file, "garbage line").unwrap();
        writeln!(file, "# a comment").unwrap();
        file.flush().unwrap();

        let store = TripleStore::load(file.path()).unwrap();
        assert_eq!(store.len(), 1);
    }
}
