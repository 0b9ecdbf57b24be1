//! CineGraph Question Pipeline
//!
//! Turns a raw natural-language question into a terse factual
//! answer, an embedding-space prediction, a ranked suggestion list,
//! or an image reference:
//!
//! raw question -> intent -> extraction -> resolution -> one of
//! { graph query (-> embedding fallback) | suggestion scoring |
//!   image lookup }
//!
//! Each branch degrades gracefully: misses become explicit
//! `NoMatch` outcomes, never errors.

pub mod cache;
pub mod extract;
pub mod handler;
pub mod intent;
pub mod media;
pub mod paraphrase;
pub mod predict;
pub mod suggest;

pub use cache::ResponseCache;
pub use extract::Extractor;
pub use handler::{Answer, AnswerOutcome, AnswerSource, NoMatchReason, QuestionPipeline};
pub use intent::QuestionIntent;
pub use media::{ImageLookup, JsonImageLookup};
pub use paraphrase::{Paraphraser, Passthrough};
pub use predict::{EmbeddingSpace, LinkPredictor};
pub use suggest::SuggestionScorer;
