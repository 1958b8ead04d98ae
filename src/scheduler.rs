//! Bounded-concurrency scheduler.
//!
//! Drives every chunk through the retry-wrapped analysis client with
//! at most `max_concurrent_chunks` in flight; `buffer_unordered`
//! starts the next pending chunk the moment a slot frees. A chunk
//! whose retries are exhausted enters the individual fallback path:
//! its items are reprocessed as one-item chunks under the smaller
//! fallback cap, each with its own retry wrapping.

use crate::aggregator::ResultAggregator;
use crate::analysis::AnalysisClient;
use crate::retry::RetryPolicy;
use crate::splitter::Chunk;
use crate::types::{BatchStat, PipelineStatus, ProgressUpdate};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Caller-supplied progress hook, invoked after every settlement.
pub type ProgressCallback = Arc<dyn Fn(ProgressUpdate) + Send + Sync>;

pub struct ChunkScheduler {
    client: Arc<dyn AnalysisClient>,
    retry: RetryPolicy,
    max_concurrent_chunks: usize,
    fallback_concurrency: usize,
}

impl ChunkScheduler {
    pub fn new(
        client: Arc<dyn AnalysisClient>,
        retry: RetryPolicy,
        max_concurrent_chunks: usize,
        fallback_concurrency: usize,
    ) -> Self {
        Self {
            client,
            retry,
            max_concurrent_chunks: max_concurrent_chunks.max(1),
            fallback_concurrency: fallback_concurrency.max(1),
        }
    }

    /// Drive all chunks to settlement. Every item of every chunk ends
    /// up recorded in the aggregator exactly once.
    pub async fn run(
        &self,
        chunks: Vec<Chunk>,
        aggregator: &ResultAggregator,
        progress: Option<&ProgressCallback>,
    ) {
        let mut settled = stream::iter(chunks)
            .map(|chunk| self.process_chunk(chunk, aggregator, progress))
            .buffer_unordered(self.max_concurrent_chunks);
        while settled.next().await.is_some() {}
    }

    async fn process_chunk(
        &self,
        chunk: Chunk,
        aggregator: &ResultAggregator,
        progress: Option<&ProgressCallback>,
    ) {
        let start = Instant::now();
        let submitted = chunk.len();
        let outcome = self
            .retry
            .run(|| async { self.client.analyze_chunk(&chunk).await })
            .await;

        match outcome {
            Ok(records) => {
                let returned = records.len();
                // Positional match: record i came from item i. Missing
                // tail indices are failures; their slots stay absent.
                // A partial return does NOT trigger the fallback path.
                for (offset, meta) in records.into_iter().enumerate() {
                    aggregator.record(chunk.global_index(offset), Some(meta));
                }
                for offset in returned..submitted {
                    aggregator.record(chunk.global_index(offset), None);
                }
                if returned < submitted {
                    warn!(
                        chunk_number = chunk.number,
                        submitted,
                        returned,
                        "partial chunk coverage, shortfall recorded as failures"
                    );
                }
                aggregator.record_batch(BatchStat {
                    chunk_number: chunk.number,
                    item_count: submitted,
                    success_count: returned,
                    failure_count: submitted - returned,
                    elapsed_ms: start.elapsed().as_millis() as u64,
                });
                debug!(chunk_number = chunk.number, returned, "chunk settled");
                Self::notify(progress, aggregator);
            }
            Err(e) => {
                warn!(
                    chunk_number = chunk.number,
                    error = %e,
                    "chunk failed hard, entering individual fallback"
                );
                self.fallback_chunk(chunk, aggregator, progress).await;
            }
        }
    }

    /// Reprocess each item of a failed chunk independently, as
    /// one-item chunks under the fallback concurrency cap.
    async fn fallback_chunk(
        &self,
        chunk: Chunk,
        aggregator: &ResultAggregator,
        progress: Option<&ProgressCallback>,
    ) {
        let number = chunk.number;
        let base_index = chunk.base_index;
        let item_count = chunk.len();

        let mut settled = stream::iter(chunk.items.into_iter().enumerate())
            .map(|(offset, item)| {
                let single = Chunk {
                    number,
                    base_index: base_index + offset,
                    items: vec![item],
                };
                async move {
                    let start = Instant::now();
                    let index = single.base_index;
                    let outcome = self
                        .retry
                        .run(|| async { self.client.analyze_chunk(&single).await })
                        .await;
                    let meta = match outcome {
                        Ok(records) => records.into_iter().next(),
                        Err(e) => {
                            debug!(index, error = %e, "fallback item failed");
                            None
                        }
                    };
                    let succeeded = meta.is_some();
                    aggregator.record(index, meta);
                    aggregator.record_batch(BatchStat {
                        chunk_number: number,
                        item_count: 1,
                        success_count: succeeded as usize,
                        failure_count: !succeeded as usize,
                        elapsed_ms: start.elapsed().as_millis() as u64,
                    });
                    Self::notify(progress, aggregator);
                }
            })
            .buffer_unordered(self.fallback_concurrency);
        while settled.next().await.is_some() {}

        info!(
            chunk_number = number,
            item_count, "individual fallback drained"
        );
    }

    fn notify(progress: Option<&ProgressCallback>, aggregator: &ResultAggregator) {
        if let Some(callback) = progress {
            callback(ProgressUpdate::from_stats(
                &aggregator.snapshot(),
                PipelineStatus::Processing,
            ));
        }
    }
}
