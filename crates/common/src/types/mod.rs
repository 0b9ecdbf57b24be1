//! Shared record types for the semantic index and resolution pipeline

use serde::{Deserialize, Serialize};

/// Type tag distinguishing graph nodes from predicates in the index
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A graph node (movie, person, company, ...)
    Entity,
    /// A predicate (director, genre, publication date, ...)
    Relation,
}

impl EntityKind {
    /// Classify a Wikidata-style code: `P..` codes are relations,
    /// everything else is an entity.
    pub fn from_code(code: &str) -> Self {
        if code.starts_with('P') {
            EntityKind::Relation
        } else {
            EntityKind::Entity
        }
    }

    /// Classify a full uri by its trailing code segment
    /// ("…/prop/direct/P57" -> relation).
    pub fn from_uri(uri: &str) -> Self {
        let code = uri.rsplit(['/', '#']).next().unwrap_or(uri);
        Self::from_code(code)
    }
}

/// A record stored in the semantic index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRecord {
    /// Record id (uuid hex)
    pub id: String,

    /// Canonical identifier (URI-like string)
    pub uri: String,

    /// Display label
    pub label: String,

    /// Free-text description (may be empty)
    pub description: String,

    /// Entity vs relation tag
    pub kind: EntityKind,
}

impl IndexRecord {
    pub fn new(uri: &str, label: &str, description: &str, kind: EntityKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            uri: uri.to_string(),
            label: label.to_string(),
            description: description.to_string(),
            kind,
        }
    }

    /// Text the index embeds for this record: the label, with the
    /// description appended when one exists.
    pub fn index_text(&self) -> String {
        if self.description.is_empty() {
            self.label.clone()
        } else {
            format!("{}: {}", self.label, self.description)
        }
    }
}

/// An index record with a relevance score attached by a search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub record: IndexRecord,
    /// Relevance score; higher is better. Comparable only within a
    /// single result list.
    pub score: f32,
}
