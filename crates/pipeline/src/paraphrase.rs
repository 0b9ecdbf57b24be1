//! Text-generation collaborator boundary
//!
//! The pipeline produces terse factual strings; turning those into
//! prose is an external service consumed as a black box. The
//! embedded `Passthrough` hands the factual string back unchanged.

use async_trait::async_trait;
use cinegraph_common::errors::Result;

/// Turns (question, terse fact) into user-facing prose
#[async_trait]
pub trait Paraphraser: Send + Sync {
    async fn paraphrase(&self, question: &str, fact: &str) -> Result<String>;
}

/// No-op paraphraser: the fact is the answer
pub struct Passthrough;

#[async_trait]
impl Paraphraser for Passthrough {
    async fn paraphrase(&self, _question: &str, fact: &str) -> Result<String> {
        Ok(fact.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passthrough() {
        let out = Passthrough
            .paraphrase("Who directed Heat?", "Michael Mann")
            .await
            .unwrap();
        assert_eq!(out, "Michael Mann");
    }
}
