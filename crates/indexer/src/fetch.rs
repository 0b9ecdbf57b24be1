//! Entity description fetching
//!
//! Descriptions drive semantic resolution quality, but the lexicon
//! dump often lacks them. `DescriptionFetcher` is the seam; the
//! embedded implementation pulls English descriptions from the
//! Wikidata EntityData endpoint.

use async_trait::async_trait;
use cinegraph_common::errors::{AppError, Result};
use std::time::Duration;
use tracing::debug;

const DEFAULT_API_BASE: &str = "https://www.wikidata.org/wiki/Special:EntityData";

/// Looks up a free-text description for an entity uri
#[async_trait]
pub trait DescriptionFetcher: Send + Sync {
    /// English description, `None` when the entity has none
    async fn fetch(&self, uri: &str) -> Result<Option<String>>;
}

/// Fetches descriptions from the Wikidata EntityData endpoint
pub struct WikidataFetcher {
    client: reqwest::Client,
    api_base: String,
}

impl WikidataFetcher {
    pub fn new(api_base: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        })
    }
}

#[async_trait]
impl DescriptionFetcher for WikidataFetcher {
    async fn fetch(&self, uri: &str) -> Result<Option<String>> {
        let code = uri.rsplit(['/', '#']).next().unwrap_or(uri);
        let url = format!("{}/{}.json", self.api_base, code);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(code, "Entity unknown upstream");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::DescriptionFetch {
                code: code.to_string(),
                message: format!("unexpected status {status}"),
            });
        }

        let body: serde_json::Value = response.json().await?;
        Ok(extract_description(&body, code))
    }
}

/// Pull `entities.<code>.descriptions.en.value` out of an EntityData
/// response body.
fn extract_description(body: &serde_json::Value, code: &str) -> Option<String> {
    body.get("entities")?
        .get(code)?
        .get("descriptions")?
        .get("en")?
        .get("value")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_description() {
        let body = json!({
            "entities": {
                "Q47703": {
                    "descriptions": {
                        "en": { "language": "en", "value": "1972 film by Francis Ford Coppola" }
                    }
                }
            }
        });
        assert_eq!(
            extract_description(&body, "Q47703"),
            Some("1972 film by Francis Ford Coppola".to_string())
        );
    }

    #[test]
    fn test_extract_missing_language() {
        let body = json!({
            "entities": { "Q47703": { "descriptions": {} } }
        });
        assert_eq!(extract_description(&body, "Q47703"), None);
    }
}
