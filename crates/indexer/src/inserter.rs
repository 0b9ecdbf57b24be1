//! Batched index inserts over a bounded channel
//!
//! Producers submit records one at a time; a single consumer task
//! accumulates them and flushes to the index when the batch fills or
//! the flush interval elapses. Closing the channel drains whatever
//! is buffered before the consumer exits, so `finish` never loses
//! submitted records.

use cinegraph_common::errors::{AppError, Result};
use cinegraph_common::types::IndexRecord;
use cinegraph_semantic::index::SemanticIndex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Write-path tuning knobs
#[derive(Debug, Clone)]
pub struct InserterConfig {
    pub batch_size: usize,
    pub flush_interval: Duration,
    pub channel_capacity: usize,
}

impl Default for InserterConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            flush_interval: Duration::from_secs(1),
            channel_capacity: 4096,
        }
    }
}

/// Handle for submitting records to the insert consumer
pub struct BatchInserter {
    tx: mpsc::Sender<IndexRecord>,
    consumer: JoinHandle<usize>,
}

impl BatchInserter {
    pub fn new(index: Arc<dyn SemanticIndex>, config: InserterConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
        let consumer = tokio::spawn(consume(index, rx, config));
        Self { tx, consumer }
    }

    /// Queue one record; applies backpressure when the channel is
    /// full.
    pub async fn submit(&self, record: IndexRecord) -> Result<()> {
        self.tx
            .send(record)
            .await
            .map_err(|_| AppError::ChannelClosed {
                message: "insert consumer is gone".to_string(),
            })
    }

    /// Close the channel and wait for the consumer to drain. Returns
    /// the number of records actually inserted.
    pub async fn finish(self) -> Result<usize> {
        drop(self.tx);
        self.consumer
            .await
            .map_err(|e| AppError::Other(anyhow::anyhow!("insert consumer panicked: {e}")))
    }
}

async fn consume(
    index: Arc<dyn SemanticIndex>,
    mut rx: mpsc::Receiver<IndexRecord>,
    config: InserterConfig,
) -> usize {
    let batch_size = config.batch_size.max(1);
    let mut batch: Vec<IndexRecord> = Vec::with_capacity(batch_size);
    let mut inserted = 0usize;

    let mut ticker = tokio::time::interval(config.flush_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            received = rx.recv() => {
                match received {
                    Some(record) => {
                        batch.push(record);
                        if batch.len() >= batch_size {
                            inserted += flush(&index, &mut batch).await;
                        }
                    }
                    // Channel closed: drain and exit
                    None => {
                        inserted += flush(&index, &mut batch).await;
                        break;
                    }
                }
            }
            _ = ticker.tick() => {
                inserted += flush(&index, &mut batch).await;
            }
        }
    }

    info!(inserted, "Insert consumer finished");
    inserted
}

/// Flush the buffered batch, returning how many records landed
async fn flush(index: &Arc<dyn SemanticIndex>, batch: &mut Vec<IndexRecord>) -> usize {
    if batch.is_empty() {
        return 0;
    }
    let records = std::mem::take(batch);
    let count = records.len();
    debug!(count, "Flushing insert batch");
    match index.insert_batch(records).await {
        Ok(()) => count,
        Err(e) => {
            error!(count, error = %e, "Insert batch failed, dropping records");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinegraph_common::embeddings::MockEmbedder;
    use cinegraph_common::types::EntityKind;
    use cinegraph_semantic::index::InMemoryIndex;
    use cinegraph_semantic::rerank::TermOverlapReranker;

    fn index() -> Arc<InMemoryIndex> {
        Arc::new(InMemoryIndex::new(
            Arc::new(MockEmbedder::new(64)),
            Arc::new(TermOverlapReranker::default()),
            10,
        ))
    }

    fn record(n: usize) -> IndexRecord {
        IndexRecord::new(
            &format!("wd:Q{n}"),
            &format!("Movie {n}"),
            "",
            EntityKind::Entity,
        )
    }

    #[tokio::test]
    async fn test_finish_drains_partial_batch() {
        let index = index();
        let inserter = BatchInserter::new(
            index.clone(),
            InserterConfig {
                batch_size: 100,
                flush_interval: Duration::from_secs(3600),
                channel_capacity: 16,
            },
        );

        for n in 0..7 {
            inserter.submit(record(n)).await.unwrap();
        }
        let inserted = inserter.finish().await.unwrap();

        assert_eq!(inserted, 7);
        assert_eq!(index.record_count().await, 7);
    }

    #[tokio::test]
    async fn test_full_batch_flushes_before_finish() {
        let index = index();
        let inserter = BatchInserter::new(
            index.clone(),
            InserterConfig {
                batch_size: 3,
                flush_interval: Duration::from_secs(3600),
                channel_capacity: 16,
            },
        );

        for n in 0..3 {
            inserter.submit(record(n)).await.unwrap();
        }
        // Give the consumer a chance to run the size-triggered flush
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(index.record_count().await, 3);

        assert_eq!(inserter.finish().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_timed_flush() {
        let index = index();
        let inserter = BatchInserter::new(
            index.clone(),
            InserterConfig {
                batch_size: 100,
                flush_interval: Duration::from_millis(20),
                channel_capacity: 16,
            },
        );

        inserter.submit(record(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(index.record_count().await, 1);

        inserter.finish().await.unwrap();
    }
}
