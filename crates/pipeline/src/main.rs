//! answerd: interactive question-answering daemon
//!
//! Loads the graph dump, lexicon, movie table, embedding space, and
//! image table once at startup, seeds the in-process semantic
//! indexes, then answers questions line by line on stdin.

use anyhow::Context;
use cinegraph_common::config::{AppConfig, ObservabilityConfig};
use cinegraph_common::embeddings::create_embedder;
use cinegraph_common::types::{EntityKind, IndexRecord};
use cinegraph_common::VERSION;
use cinegraph_graph::{GraphQueryEngine, MovieTable, TripleStore};
use cinegraph_pipeline::{
    EmbeddingSpace, ImageLookup, JsonImageLookup, LinkPredictor, Passthrough, QuestionPipeline,
    SuggestionScorer,
};
use cinegraph_semantic::index::{InMemoryIndex, SemanticIndex};
use cinegraph_semantic::lexicon::Lexicon;
use cinegraph_semantic::rerank::TermOverlapReranker;
use cinegraph_semantic::EntityResolver;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.observability);
    info!(version = VERSION, "Starting answerd");

    let pipeline = build_pipeline(&config).await?;
    info!("Pipeline ready, reading questions from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await? {
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("quit") || question.eq_ignore_ascii_case("exit") {
            break;
        }

        let response = pipeline.respond(question).await;
        stdout.write_all(response.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    info!("Shutting down");
    Ok(())
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    if config.json_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Load every startup table and assemble the pipeline
async fn build_pipeline(config: &AppConfig) -> anyhow::Result<QuestionPipeline> {
    let data = &config.data;

    let store = Arc::new(
        TripleStore::load(&data.path(&data.graph_file)).context("Failed to load graph dump")?,
    );
    let lexicon = Arc::new(
        Lexicon::load(
            &data.path(&data.entities_file),
            Some(&data.path(&data.descriptions_file)),
        )
        .context("Failed to load lexicon")?,
    );
    let movies = Arc::new(
        MovieTable::load(&data.path(&data.movies_file)).context("Failed to load movie table")?,
    );
    let space = Arc::new(
        EmbeddingSpace::load(
            &data.path(&data.entity_embeds_file),
            &data.path(&data.entity_ids_file),
            &data.path(&data.relation_embeds_file),
            &data.path(&data.relation_ids_file),
        )
        .context("Failed to load embedding space")?,
    );
    let images: Arc<dyn ImageLookup> = Arc::new(
        JsonImageLookup::load(&data.path(&data.images_file))
            .context("Failed to load image table")?,
    );

    let embedder = create_embedder(&config.embedding)?;
    let reranker = Arc::new(TermOverlapReranker::default());
    let batch_size = config.embedding.batch_size;

    // Entity/relation resolution index, seeded from the lexicon
    let index = InMemoryIndex::new(
        embedder.clone(),
        reranker.clone(),
        config.index.rerank_candidates,
    );
    let records: Vec<IndexRecord> = lexicon
        .entries()
        .map(|(uri, label)| {
            IndexRecord::new(uri, label, lexicon.description_of(uri), EntityKind::from_uri(uri))
        })
        .collect();
    seed_index(&index, records, batch_size).await?;
    info!(records = index.record_count().await, "Resolution index ready");

    // Movie index for suggestion retrieval, keyed on property text
    let movie_index = InMemoryIndex::new(embedder, reranker, config.index.rerank_candidates);
    let records: Vec<IndexRecord> = movies
        .records()
        .map(|record| {
            IndexRecord::new(
                &record.uri,
                &record.label,
                &record.descriptive_text(movies.property_names()),
                EntityKind::Entity,
            )
        })
        .collect();
    seed_index(&movie_index, records, batch_size).await?;
    info!(records = movie_index.record_count().await, "Movie index ready");

    let resolver = Arc::new(EntityResolver::new(lexicon.clone(), Arc::new(index)));
    let graph = Arc::new(GraphQueryEngine::new(
        store,
        config.answer.row_separator.clone(),
    ));
    let predictor = Arc::new(LinkPredictor::new(space, lexicon));
    let suggester = Arc::new(SuggestionScorer::new(
        movies,
        Arc::new(movie_index),
        config.answer.suggestion_limit,
    ));

    Ok(QuestionPipeline::new(
        resolver,
        graph,
        predictor,
        suggester,
        images,
        Arc::new(Passthrough),
        &config.answer,
    ))
}

async fn seed_index(
    index: &InMemoryIndex,
    records: Vec<IndexRecord>,
    batch_size: usize,
) -> anyhow::Result<()> {
    for chunk in records.chunks(batch_size.max(1)) {
        index.insert_batch(chunk.to_vec()).await?;
    }
    Ok(())
}

