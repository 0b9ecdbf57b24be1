//! Entity/relation extraction from question text
//!
//! An ordered grammar of question templates, each a data record
//! naming which capture group is the relation and which the entity.
//! The first matching template wins. When nothing matches, a quoted
//! span is taken as the entity; failing that, the whole cleaned text
//! stands in as the entity-search string and the relation stays
//! unresolved, which tells the caller to lean on the embedding
//! fallback instead of a direct graph query.

use regex_lite::{Regex, RegexBuilder};
use tracing::debug;

/// One question template: pattern plus group roles
struct QuestionPattern {
    regex: Regex,
    entity_group: usize,
    relation_group: usize,
}

impl QuestionPattern {
    fn new(pattern: &str, entity_group: usize, relation_group: usize) -> Self {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .expect("static question pattern must compile");
        Self {
            regex,
            entity_group,
            relation_group,
        }
    }
}

/// A media template captures only the entity
struct MediaPattern {
    regex: Regex,
    entity_group: usize,
}

impl MediaPattern {
    fn new(pattern: &str, entity_group: usize) -> Self {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .expect("static media pattern must compile");
        Self {
            regex,
            entity_group,
        }
    }
}

/// Result of factual extraction. `relation == None` signals that no
/// template matched and the relation must be resolved from the whole
/// question text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactualExtraction {
    pub relation: Option<String>,
    pub entity: Option<String>,
}

/// Connector phrases introducing a suggestion item list
const LIST_CONNECTORS: &[&str] = &["such as", "like", "including"];

/// Compiled extraction grammar, built once at startup
pub struct Extractor {
    factual: Vec<QuestionPattern>,
    media: Vec<MediaPattern>,
    quoted: Regex,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    pub fn new() -> Self {
        // Ordered most-specific first; `who (\S+) (.*)` would
        // otherwise shadow the "who wrote" templates.
        let factual = vec![
            QuestionPattern::new(r"^who is the (\S+) of (.*)", 2, 1),
            QuestionPattern::new(r"^who was the (\S+) of (.*)", 2, 1),
            QuestionPattern::new(r"^who was the (\S+) for (.*)", 2, 1),
            QuestionPattern::new(r"^who was the (\S+) in (.*)", 2, 1),
            QuestionPattern::new(r"^who wrote the (\S+) of (.*)", 2, 1),
            QuestionPattern::new(r"^who wrote the (\S+) for (.*)", 2, 1),
            QuestionPattern::new(r"^who (\S+) (.*)", 2, 1),
            QuestionPattern::new(r"^what is the (\S+) of (.*)", 2, 1),
            QuestionPattern::new(r"^when was (.*) (\S+)", 1, 2),
            QuestionPattern::new(r"^where was (.*) (\S+)", 1, 2),
            QuestionPattern::new(r"^where is (\S+) (.*)", 2, 1),
        ];

        let media = vec![
            MediaPattern::new(r"^show me an? (?:picture|poster|photo|image) of (.*)", 1),
            MediaPattern::new(r"^what does (.*) look like", 1),
            MediaPattern::new(r"(?:picture|poster|photo|image) (?:of|for|from) (.*)", 1),
            MediaPattern::new(r"^show me (.*)", 1),
        ];

        let quoted = Regex::new(r#""([^"]+)"|'([^']+)'"#).expect("quoted-span pattern");

        Self {
            factual,
            media,
            quoted,
        }
    }

    /// Pull (relation, entity) surfaces out of a factual question
    pub fn extract_factual(&self, question: &str) -> FactualExtraction {
        let question = question.trim().trim_end_matches('?');

        for pattern in &self.factual {
            if let Some(captures) = pattern.regex.captures(question) {
                let relation = captures
                    .get(pattern.relation_group)
                    .map(|m| m.as_str().trim().to_string());
                let entity = captures
                    .get(pattern.entity_group)
                    .map(|m| clean_text(m.as_str()));
                debug!(?relation, ?entity, "Template matched");
                return FactualExtraction { relation, entity };
            }
        }

        // Quoted span: probably the entity, relation unknown
        if let Some(captures) = self.quoted.captures(question) {
            let span = captures
                .get(1)
                .or_else(|| captures.get(2))
                .map(|m| m.as_str().trim().to_string());
            if let Some(span) = span {
                debug!(entity = %span, "Quoted-span fallback");
                return FactualExtraction {
                    relation: None,
                    entity: Some(span),
                };
            }
        }

        // Whole text as entity-search string
        let cleaned = clean_text(question);
        let entity = if cleaned.is_empty() { None } else { Some(cleaned) };
        FactualExtraction {
            relation: None,
            entity,
        }
    }

    /// Split a suggestion question into individual seed surfaces
    pub fn extract_seeds(&self, question: &str) -> Vec<String> {
        let text = question.trim().trim_end_matches('?');
        let lower = text.to_lowercase();

        // Isolate the item list after the earliest connector phrase
        let list = LIST_CONNECTORS
            .iter()
            .filter_map(|c| lower.find(&format!("{} ", c)).map(|pos| (pos, c.len())))
            .min_by_key(|(pos, _)| *pos)
            .and_then(|(pos, len)| text.get(pos + len + 1..))
            .unwrap_or(text);

        list.split(',')
            .flat_map(|part| part.split(" and "))
            .map(clean_text)
            .filter(|item| !item.is_empty())
            .collect()
    }

    /// Pull the entity surface out of a multimedia question
    pub fn extract_media(&self, question: &str) -> String {
        let question = question.trim().trim_end_matches('?');

        for pattern in &self.media {
            if let Some(captures) = pattern.regex.captures(question) {
                if let Some(m) = captures.get(pattern.entity_group) {
                    return clean_text(m.as_str());
                }
            }
        }

        clean_text(question)
    }
}

/// Strip quotes, question marks, trailing punctuation, and the
/// "the movie"/"the film" fillers before any resolution step.
pub fn clean_text(text: &str) -> String {
    let mut cleaned = text
        .replace(['"', '\'', '?'], "")
        .replace("the movie ", "")
        .replace("The movie ", "")
        .replace("the film ", "")
        .replace("The film ", "");
    cleaned = cleaned.trim().trim_end_matches(['.', ',', '!', ':']).to_string();
    cleaned.trim().to_string()
}
