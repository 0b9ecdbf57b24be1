//! Question orchestrator
//!
//! Routes one question through intent classification, extraction,
//! resolution, and the branch the intent selects. Every branch ends
//! in an `AnswerOutcome`: either an answer with its provenance or an
//! explicit reason for the miss. Full responses are cached by exact
//! question text, so repeating a question never re-runs resolution
//! or search.

use crate::cache::ResponseCache;
use crate::extract::Extractor;
use crate::intent::{self, QuestionIntent};
use crate::media::ImageLookup;
use crate::paraphrase::Paraphraser;
use crate::predict::LinkPredictor;
use crate::suggest::SuggestionScorer;
use cinegraph_common::config::AnswerConfig;
use cinegraph_graph::GraphQueryEngine;
use cinegraph_semantic::EntityResolver;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Which stage produced an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    /// Direct knowledge-graph lookup
    Factual,
    /// Embedding-space link prediction
    Embeddings,
    /// Suggestion scoring over seed movies
    Suggestions,
    /// External image lookup
    Multimedia,
}

/// Why a question produced no answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoMatchReason {
    /// No usable entity or relation surface in the text
    UnsupportedQuestion,
    /// Surface text resolved to nothing in lexicon or index
    EntityUnresolved,
    /// Graph had no matching fact and prediction found nothing
    NoFact,
    /// Embedding space is missing a vector for the pair
    NoPrediction,
    /// Seeds shared no properties, or search came back empty
    NoSuggestions,
    /// No image reference for the resolved entity
    NoImage,
}

/// A produced answer with its provenance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub source: AnswerSource,
}

/// Terminal state of one question
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    Answered(Answer),
    NoMatch(NoMatchReason),
}

impl AnswerOutcome {
    /// Response text shown to the user; misses become apologies
    pub fn user_facing_text(&self) -> String {
        match self {
            AnswerOutcome::Answered(answer) => answer.text.clone(),
            AnswerOutcome::NoMatch(reason) => match reason {
                NoMatchReason::UnsupportedQuestion => {
                    "I am not sure I understand the question. Could you rephrase it?".to_string()
                }
                NoMatchReason::EntityUnresolved => {
                    "I could not work out which movie or person you mean.".to_string()
                }
                NoMatchReason::NoFact => {
                    "I could not find that information in my knowledge graph.".to_string()
                }
                NoMatchReason::NoPrediction => {
                    "I could not make a confident prediction for that one.".to_string()
                }
                NoMatchReason::NoSuggestions => {
                    "I could not come up with good recommendations from those titles.".to_string()
                }
                NoMatchReason::NoImage => {
                    "I could not find a picture for that.".to_string()
                }
            },
        }
    }
}

/// The full question-answering pipeline
pub struct QuestionPipeline {
    extractor: Extractor,
    resolver: Arc<EntityResolver>,
    graph: Arc<GraphQueryEngine>,
    predictor: Arc<LinkPredictor>,
    suggester: Arc<SuggestionScorer>,
    images: Arc<dyn ImageLookup>,
    paraphraser: Arc<dyn Paraphraser>,
    cache: ResponseCache,
    image_id_property: String,
    column_separator: String,
}

impl QuestionPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        resolver: Arc<EntityResolver>,
        graph: Arc<GraphQueryEngine>,
        predictor: Arc<LinkPredictor>,
        suggester: Arc<SuggestionScorer>,
        images: Arc<dyn ImageLookup>,
        paraphraser: Arc<dyn Paraphraser>,
        answer: &AnswerConfig,
    ) -> Self {
        Self {
            extractor: Extractor::new(),
            resolver,
            graph,
            predictor,
            suggester,
            images,
            paraphraser,
            cache: ResponseCache::new(),
            image_id_property: answer.image_id_property.clone(),
            column_separator: answer.column_separator.clone(),
        }
    }

    /// Answer one question end to end, returning the response text.
    /// Cached responses are returned verbatim without re-running the
    /// pipeline.
    pub async fn respond(&self, question: &str) -> String {
        if let Some(cached) = self.cache.get(question).await {
            return cached;
        }

        let outcome = self.answer(question).await;
        let mut text = outcome.user_facing_text();

        if let AnswerOutcome::Answered(ref answer) = outcome {
            match self.paraphraser.paraphrase(question, &text).await {
                Ok(prose) => text = prose,
                Err(e) => {
                    warn!(error = %e, source = ?answer.source, "Paraphrase failed, using raw answer");
                }
            }
        }

        self.cache.put(question, &text).await;
        text
    }

    /// Run the pipeline and return the structured outcome
    pub async fn answer(&self, question: &str) -> AnswerOutcome {
        let intent = intent::classify(question);
        info!(?intent, question, "Handling question");

        match intent {
            QuestionIntent::Factual => self.answer_factual(question, false).await,
            QuestionIntent::Embedding => self.answer_factual(question, true).await,
            QuestionIntent::Suggestion => self.answer_suggestion(question).await,
            QuestionIntent::Multimedia => self.answer_multimedia(question).await,
        }
    }

    /// Factual branch; `predict_only` skips the graph lookup and goes
    /// straight to the embedding space.
    async fn answer_factual(&self, question: &str, predict_only: bool) -> AnswerOutcome {
        let extraction = self.extractor.extract_factual(question);

        let entity_surface = match extraction.entity {
            Some(surface) => surface,
            None => return AnswerOutcome::NoMatch(NoMatchReason::UnsupportedQuestion),
        };
        let entity_uri = match self.resolver.resolve_entity(&entity_surface).await {
            Some(uri) => uri,
            None => {
                debug!(surface = %entity_surface, "Entity unresolved");
                return AnswerOutcome::NoMatch(NoMatchReason::EntityUnresolved);
            }
        };

        // No template relation: resolve against the whole question
        let relation_surface = extraction
            .relation
            .unwrap_or_else(|| question.trim().trim_end_matches('?').to_string());
        let relation_uri = match self.resolver.resolve_relation(&relation_surface).await {
            Some(uri) => uri,
            None => {
                debug!(surface = %relation_surface, "Relation unresolved");
                return AnswerOutcome::NoMatch(NoMatchReason::UnsupportedQuestion);
            }
        };

        if !predict_only {
            let fact = self.graph.answer(&entity_uri, &relation_uri);
            if !fact.is_empty() {
                return AnswerOutcome::Answered(Answer {
                    text: fact,
                    source: AnswerSource::Factual,
                });
            }
            debug!(entity = %entity_uri, relation = %relation_uri, "Graph miss, trying prediction");
        }

        match self.predictor.nearest(&entity_uri, &relation_uri) {
            Some(prediction) => AnswerOutcome::Answered(Answer {
                text: format!("{} ({})", prediction.label, prediction.provenance),
                source: AnswerSource::Embeddings,
            }),
            None if predict_only => AnswerOutcome::NoMatch(NoMatchReason::NoPrediction),
            None => AnswerOutcome::NoMatch(NoMatchReason::NoFact),
        }
    }

    /// Suggestion branch: split seeds, resolve each, score
    async fn answer_suggestion(&self, question: &str) -> AnswerOutcome {
        let surfaces = self.extractor.extract_seeds(question);
        if surfaces.is_empty() {
            return AnswerOutcome::NoMatch(NoMatchReason::UnsupportedQuestion);
        }

        let mut seeds: Vec<(String, String)> = Vec::new();
        for surface in &surfaces {
            match self.resolver.resolve_entity(surface).await {
                Some(uri) => {
                    let label = self
                        .resolver
                        .lexicon()
                        .label_of(&uri)
                        .unwrap_or(surface)
                        .to_string();
                    seeds.push((label, uri));
                }
                None => warn!(surface, "Seed unresolved, skipping"),
            }
        }
        if seeds.is_empty() {
            return AnswerOutcome::NoMatch(NoMatchReason::EntityUnresolved);
        }

        let suggestions = self.suggester.suggest(&seeds, question).await;
        if suggestions.is_empty() {
            return AnswerOutcome::NoMatch(NoMatchReason::NoSuggestions);
        }
        AnswerOutcome::Answered(Answer {
            text: suggestions.join(&self.column_separator),
            source: AnswerSource::Suggestions,
        })
    }

    /// Multimedia branch: entity -> external id -> image reference
    async fn answer_multimedia(&self, question: &str) -> AnswerOutcome {
        let surface = self.extractor.extract_media(question);
        let entity_uri = match self.resolver.resolve_entity(&surface).await {
            Some(uri) => uri,
            None => return AnswerOutcome::NoMatch(NoMatchReason::EntityUnresolved),
        };

        let codes = self.graph.answer_rows(&entity_uri, &self.image_id_property);
        for code in &codes {
            match self.images.find(code).await {
                Ok(Some(image)) => {
                    return AnswerOutcome::Answered(Answer {
                        text: image,
                        source: AnswerSource::Multimedia,
                    })
                }
                Ok(None) => {}
                Err(e) => warn!(code, error = %e, "Image lookup failed"),
            }
        }
        debug!(entity = %entity_uri, codes = codes.len(), "No image found");
        AnswerOutcome::NoMatch(NoMatchReason::NoImage)
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }
}
