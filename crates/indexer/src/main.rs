//! indexer: offline semantic index build
//!
//! 1. Loads the lexicon and movie table
//! 2. Fetches missing entity descriptions from Wikidata
//! 3. Streams records through the batch inserter into the index
//! 4. Writes the enriched description table back to disk so answerd
//!    starts with it next time

use anyhow::Context;
use cinegraph_common::config::AppConfig;
use cinegraph_common::embeddings::create_embedder;
use cinegraph_common::types::IndexRecord;
use cinegraph_common::VERSION;
use cinegraph_graph::MovieTable;
use cinegraph_indexer::inserter::InserterConfig;
use cinegraph_indexer::{BatchInserter, IndexBuilder, WikidataFetcher};
use cinegraph_semantic::index::{InMemoryIndex, SemanticIndex};
use cinegraph_semantic::lexicon::Lexicon;
use cinegraph_semantic::rerank::TermOverlapReranker;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.observability.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    info!(version = VERSION, "Starting index build");

    let data = &config.data;
    let lexicon = Lexicon::load(
        &data.path(&data.entities_file),
        Some(&data.path(&data.descriptions_file)),
    )
    .context("Failed to load lexicon")?;
    let movies =
        MovieTable::load(&data.path(&data.movies_file)).context("Failed to load movie table")?;

    // Description source; DESCRIPTION_API_BASE overrides the public
    // Wikidata endpoint.
    let fetcher = WikidataFetcher::new(
        std::env::var("DESCRIPTION_API_BASE").ok(),
        config.embedding_timeout(),
    )?;
    let builder = IndexBuilder::new(Arc::new(fetcher), config.index.worker_count);

    let lexicon_records = builder.lexicon_records(&lexicon).await;
    let movie_records = builder.movie_records(&movies);

    let index: Arc<dyn SemanticIndex> = Arc::new(InMemoryIndex::new(
        create_embedder(&config.embedding)?,
        Arc::new(TermOverlapReranker::default()),
        config.index.rerank_candidates,
    ));
    let inserter = BatchInserter::new(
        index.clone(),
        InserterConfig {
            batch_size: config.index.insert_batch_size,
            flush_interval: config.flush_interval(),
            channel_capacity: config.index.channel_capacity,
        },
    );

    let submitted = lexicon_records.len() + movie_records.len();
    for record in movie_records.iter().chain(lexicon_records.iter()) {
        inserter.submit(record.clone()).await?;
    }
    let inserted = inserter.finish().await?;
    info!(submitted, inserted, "Index build complete");

    let descriptions_path = data.path(&data.descriptions_file);
    write_descriptions(&descriptions_path, &lexicon_records)
        .context("Failed to write description table")?;
    info!(path = %descriptions_path.display(), "Description table written");

    Ok(())
}

/// Persist the fetched descriptions as a headerless `uri,description`
/// CSV, the format the lexicon loads at startup.
fn write_descriptions(path: &Path, records: &[IndexRecord]) -> anyhow::Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    for record in records {
        if record.description.is_empty() {
            continue;
        }
        writer.write_record([record.uri.as_str(), record.description.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}
