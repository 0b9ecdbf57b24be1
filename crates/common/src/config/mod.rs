//! Configuration management for CineGraph
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/<env>.toml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Startup data file locations
    pub data: DataConfig,

    /// Embedding service configuration
    pub embedding: EmbeddingConfig,

    /// Semantic index configuration
    pub index: IndexConfig,

    /// Answer assembly configuration
    pub answer: AnswerConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

/// Locations of the flat files loaded once at startup
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    /// Base directory all other paths are resolved against
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,

    /// N-Triples graph dump
    #[serde(default = "default_graph_file")]
    pub graph_file: String,

    /// uri,label lexicon table
    #[serde(default = "default_entities_file")]
    pub entities_file: String,

    /// uri,description table
    #[serde(default = "default_descriptions_file")]
    pub descriptions_file: String,

    /// Entity embedding matrix (CSV of f32 rows)
    #[serde(default = "default_entity_embeds_file")]
    pub entity_embeds_file: String,

    /// Relation embedding matrix (CSV of f32 rows)
    #[serde(default = "default_relation_embeds_file")]
    pub relation_embeds_file: String,

    /// index<TAB>uri mapping for entity rows
    #[serde(default = "default_entity_ids_file")]
    pub entity_ids_file: String,

    /// index<TAB>uri mapping for relation rows
    #[serde(default = "default_relation_ids_file")]
    pub relation_ids_file: String,

    /// Per-movie property table for suggestion scoring
    #[serde(default = "default_movies_file")]
    pub movies_file: String,

    /// Image lookup table (JSON array)
    #[serde(default = "default_images_file")]
    pub images_file: String,
}

impl DataConfig {
    /// Resolve a data file name against the base directory
    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    /// Embedding provider: http, mock
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// API key for the embedding endpoint (optional for local endpoints)
    pub api_key: Option<String>,

    /// API base URL (OpenAI-compatible /embeddings endpoint)
    pub api_base: Option<String>,

    /// Model to use
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding dimension
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// Request timeout in seconds
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries
    #[serde(default = "default_embedding_retries")]
    pub max_retries: u32,

    /// Batch size for embedding requests
    #[serde(default = "default_embed_batch_size")]
    pub batch_size: usize,
}

/// Semantic index read and write path tuning
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
    /// Candidates pulled from the vector stage before re-ranking
    #[serde(default = "default_rerank_candidates")]
    pub rerank_candidates: usize,

    /// Records per insert batch on the write path
    #[serde(default = "default_insert_batch_size")]
    pub insert_batch_size: usize,

    /// Seconds between timed flushes on the write path
    #[serde(default = "default_flush_interval")]
    pub flush_interval_secs: u64,

    /// Bounded insert channel capacity
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Concurrent description/embedding fetches during index builds
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
}

/// How terse answers are assembled from query results
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnswerConfig {
    /// Separator between columns of one result row
    #[serde(default = "default_column_separator")]
    pub column_separator: String,

    /// Separator between result rows
    #[serde(default = "default_row_separator")]
    pub row_separator: String,

    /// Maximum suggestions returned per question
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,

    /// Wikidata property holding the external image id
    #[serde(default = "default_image_id_property")]
    pub image_id_property: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,
}

// Default value functions
fn default_data_dir() -> PathBuf { PathBuf::from("data") }
fn default_graph_file() -> String { "graph.nt".to_string() }
fn default_entities_file() -> String { "entities.csv".to_string() }
fn default_descriptions_file() -> String { "descriptions.csv".to_string() }
fn default_entity_embeds_file() -> String { "entity_embeds.csv".to_string() }
fn default_relation_embeds_file() -> String { "relation_embeds.csv".to_string() }
fn default_entity_ids_file() -> String { "entity_ids.tsv".to_string() }
fn default_relation_ids_file() -> String { "relation_ids.tsv".to_string() }
fn default_movies_file() -> String { "movies.csv".to_string() }
fn default_images_file() -> String { "images.json".to_string() }
fn default_embedding_provider() -> String { "http".to_string() }
fn default_embedding_model() -> String { "all-MiniLM-L6-v2".to_string() }
fn default_embedding_dimension() -> usize { 384 }
fn default_embedding_timeout() -> u64 { 30 }
fn default_embedding_retries() -> u32 { 3 }
fn default_embed_batch_size() -> usize { 32 }
fn default_rerank_candidates() -> usize { 10 }
fn default_insert_batch_size() -> usize { 1000 }
fn default_flush_interval() -> u64 { 1 }
fn default_channel_capacity() -> usize { 4096 }
fn default_worker_count() -> usize { 12 }
fn default_column_separator() -> String { " and ".to_string() }
fn default_row_separator() -> String { "\n".to_string() }
fn default_suggestion_limit() -> usize { 5 }
fn default_image_id_property() -> String {
    "http://www.wikidata.org/prop/direct/P345".to_string()
}
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { false }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables with APP__ prefix
            // e.g., APP__EMBEDDING__API_BASE=http://localhost:11434/v1
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get embedding request timeout as Duration
    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_secs(self.embedding.timeout_secs)
    }

    /// Get write-path flush interval as Duration
    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.index.flush_interval_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig {
                dir: default_data_dir(),
                graph_file: default_graph_file(),
                entities_file: default_entities_file(),
                descriptions_file: default_descriptions_file(),
                entity_embeds_file: default_entity_embeds_file(),
                relation_embeds_file: default_relation_embeds_file(),
                entity_ids_file: default_entity_ids_file(),
                relation_ids_file: default_relation_ids_file(),
                movies_file: default_movies_file(),
                images_file: default_images_file(),
            },
            embedding: EmbeddingConfig {
                provider: default_embedding_provider(),
                api_key: None,
                api_base: None,
                model: default_embedding_model(),
                dimension: default_embedding_dimension(),
                timeout_secs: default_embedding_timeout(),
                max_retries: default_embedding_retries(),
                batch_size: default_embed_batch_size(),
            },
            index: IndexConfig {
                rerank_candidates: default_rerank_candidates(),
                insert_batch_size: default_insert_batch_size(),
                flush_interval_secs: default_flush_interval(),
                channel_capacity: default_channel_capacity(),
                worker_count: default_worker_count(),
            },
            answer: AnswerConfig {
                column_separator: default_column_separator(),
                row_separator: default_row_separator(),
                suggestion_limit: default_suggestion_limit(),
                image_id_property: default_image_id_property(),
            },
            observability: ObservabilityConfig {
                log_level: default_log_level(),
                json_logging: default_json_logging(),
            },
        }
    }
}
