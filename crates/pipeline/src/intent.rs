//! Intent classification
//!
//! Ordered, case-insensitive keyword rules; the first matching rule
//! wins and evaluation stops. Multimedia wording is checked before
//! suggestion wording so "what does X look like" is never read as a
//! recommendation request. Unmatched questions default to Factual.

use serde::{Deserialize, Serialize};

/// Mutually exclusive question intents
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionIntent {
    /// Answer from the knowledge graph
    Factual,
    /// Answer from embedding-space prediction (requested by name)
    Embedding,
    /// Multi-entity recommendations
    Suggestion,
    /// Picture/poster lookup
    Multimedia,
}

/// One classification rule: any keyword hit assigns the intent
struct IntentRule {
    intent: QuestionIntent,
    keywords: &'static [&'static str],
}

/// Evaluation order is part of the contract.
const RULES: &[IntentRule] = &[
    IntentRule {
        intent: QuestionIntent::Multimedia,
        keywords: &[
            "picture",
            "poster",
            "image",
            "photo",
            "look like",
            "looks like",
            "show me",
        ],
    },
    IntentRule {
        intent: QuestionIntent::Embedding,
        keywords: &["embedding"],
    },
    IntentRule {
        intent: QuestionIntent::Suggestion,
        keywords: &["recommend", "similar", "like", "suggest"],
    },
];

/// Classify a raw question. Pure; no side effects.
pub fn classify(question: &str) -> QuestionIntent {
    let question = question.to_lowercase();
    for rule in RULES {
        if rule.keywords.iter().any(|kw| question.contains(kw)) {
            return rule.intent;
        }
    }
    QuestionIntent::Factual
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factual_default() {
        assert_eq!(
            classify("Who is the director of Inception?"),
            QuestionIntent::Factual
        );
        assert_eq!(classify("random words"), QuestionIntent::Factual);
    }

    #[test]
    fn test_suggestion_keywords() {
        assert_eq!(
            classify("Recommend movies such as The Matrix"),
            QuestionIntent::Suggestion
        );
        assert_eq!(
            classify("What movies are similar to Heat?"),
            QuestionIntent::Suggestion
        );
    }

    #[test]
    fn test_multimedia_keywords() {
        assert_eq!(
            classify("Show me a picture of Tom Hanks"),
            QuestionIntent::Multimedia
        );
        assert_eq!(
            classify("What is the poster of Alien?"),
            QuestionIntent::Multimedia
        );
    }

    #[test]
    fn test_media_precedence_over_suggestion() {
        // "look like" contains "like"; multimedia must win
        assert_eq!(
            classify("What does Julia Roberts look like?"),
            QuestionIntent::Multimedia
        );
    }

    #[test]
    fn test_embedding_requested_by_name() {
        assert_eq!(
            classify("Answer with the embedding approach: who directed Heat?"),
            QuestionIntent::Embedding
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            classify("RECOMMEND something"),
            QuestionIntent::Suggestion
        );
    }
}
