//! Image lookup collaborator boundary
//!
//! Maps an external title/person code (e.g. an IMDb id obtained from
//! the graph) to an image reference. The trait is the service
//! boundary; `JsonImageLookup` is the embedded implementation over a
//! JSON table of `{ movie: [codes], cast: [codes], img }` entries.

use async_trait::async_trait;
use cinegraph_common::errors::Result;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Image lookup service boundary
#[async_trait]
pub trait ImageLookup: Send + Sync {
    /// Image reference for an external code, `None` when unknown
    async fn find(&self, code: &str) -> Result<Option<String>>;
}

/// One entry of the image table
#[derive(Debug, Clone, Deserialize)]
pub struct ImageEntry {
    #[serde(default)]
    pub movie: Vec<String>,
    #[serde(default)]
    pub cast: Vec<String>,
    pub img: String,
}

/// Embedded lookup over a JSON image table
pub struct JsonImageLookup {
    entries: Vec<ImageEntry>,
}

impl JsonImageLookup {
    /// Load the image table from a JSON array file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<ImageEntry> = serde_json::from_str(&raw)?;
        info!(entries = entries.len(), "Loaded image table");
        Ok(Self { entries })
    }

    pub fn from_entries(entries: Vec<ImageEntry>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl ImageLookup for JsonImageLookup {
    async fn find(&self, code: &str) -> Result<Option<String>> {
        // An entry belongs to exactly the requested code when its
        // movie or cast list is that single code.
        let hit = self
            .entries
            .iter()
            .find(|entry| {
                (entry.movie.len() == 1 && entry.movie[0] == code)
                    || (entry.cast.len() == 1 && entry.cast[0] == code)
            })
            .map(|entry| entry.img.clone());

        debug!(code, found = hit.is_some(), "Image lookup");
        Ok(hit)
    }
}
