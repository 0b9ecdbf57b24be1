//! Per-question response cache
//!
//! Raw question string -> previously produced response, keyed by
//! exact text with no normalization, unbounded, process lifetime.
//! Guarded by an async RwLock so the pipeline stays correct if the
//! surrounding runtime ever serves requests concurrently. A hit
//! short-circuits the whole pipeline, so repeated questions never
//! re-invoke the graph engine or semantic index.

use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// In-process response cache
#[derive(Default)]
pub struct ResponseCache {
    entries: RwLock<HashMap<String, String>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Previously produced response for this exact question
    pub async fn get(&self, question: &str) -> Option<String> {
        let entries = self.entries.read().await;
        match entries.get(question) {
            Some(response) => {
                debug!(question, "Response cache hit");
                Some(response.clone())
            }
            None => {
                debug!(question, "Response cache miss");
                None
            }
        }
    }

    /// Record a response. At most one entry per distinct literal
    /// question; later answers overwrite.
    pub async fn put(&self, question: &str, response: &str) {
        let mut entries = self.entries.write().await;
        entries.insert(question.to_string(), response.to_string());
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
