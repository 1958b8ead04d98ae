//! Pipeline entry point.

use crate::aggregator::ResultAggregator;
use crate::analysis::AnalysisClient;
use crate::config::PipelineConfig;
use crate::retry::RetryPolicy;
use crate::scheduler::{ChunkScheduler, ProgressCallback};
use crate::splitter::split_into_chunks;
use crate::types::{GlobalStats, ImageMetadata, InputItem, PipelineStatus, ProgressUpdate};
use crate::Result;
use std::sync::Arc;
use tracing::{error, info};

/// Final result of a pipeline run.
///
/// `success` is false only for total pipeline failure (the upfront
/// availability check); ordinary partial failure still reports true
/// with a possibly-shorter metadata array. Failure detail lives in
/// `stats`, never inline in `metadata`.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub success: bool,
    pub metadata: Vec<ImageMetadata>,
    pub stats: GlobalStats,
}

/// The concurrent batch pipeline: split, schedule, analyze, aggregate.
///
/// The analysis client is injected, so tests drive the whole pipeline
/// with scripted doubles and production wires in
/// [`HttpAnalysisClient`](crate::analysis::HttpAnalysisClient).
pub struct MetadataPipeline {
    client: Arc<dyn AnalysisClient>,
    config: PipelineConfig,
}

impl MetadataPipeline {
    pub fn new(client: Arc<dyn AnalysisClient>, config: PipelineConfig) -> Result<Self> {
        config.validate_limits()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process all images, invoking `progress` after every settlement.
    ///
    /// Items are already pre-processed upstream; their submission
    /// order defines the global indices and the output order. No
    /// per-item failure escapes as an error.
    pub async fn process_images(
        &self,
        items: Vec<InputItem>,
        progress: Option<ProgressCallback>,
    ) -> PipelineOutput {
        let total_items = items.len();

        if total_items == 0 {
            let stats = empty_stats(0);
            notify(&progress, &stats, PipelineStatus::Completed);
            return PipelineOutput {
                success: true,
                metadata: Vec::new(),
                stats,
            };
        }

        if let Err(e) = self.client.check_availability().await {
            error!(error = %e, "analysis service unavailable, aborting pipeline");
            let stats = empty_stats(total_items);
            notify(&progress, &stats, PipelineStatus::Error);
            return PipelineOutput {
                success: false,
                metadata: Vec::new(),
                stats,
            };
        }

        let chunks = split_into_chunks(items, self.config.chunk_size);
        info!(
            total_items,
            chunk_count = chunks.len(),
            chunk_size = self.config.chunk_size,
            max_concurrent = self.config.max_concurrent_chunks,
            "starting metadata pipeline"
        );

        let aggregator = ResultAggregator::new(total_items);
        let scheduler = ChunkScheduler::new(
            self.client.clone(),
            RetryPolicy::from_config(&self.config),
            self.config.max_concurrent_chunks,
            self.config.individual_fallback_concurrency,
        );
        scheduler.run(chunks, &aggregator, progress.as_ref()).await;

        let stats = aggregator.snapshot();
        info!(
            total_items,
            success = stats.success_count,
            failure = stats.failure_count,
            elapsed_ms = stats.elapsed_ms,
            "metadata pipeline completed"
        );
        notify(&progress, &stats, PipelineStatus::Completed);

        PipelineOutput {
            success: true,
            metadata: aggregator.into_metadata(),
            stats,
        }
    }
}

fn empty_stats(total_items: usize) -> GlobalStats {
    GlobalStats {
        total_items,
        success_count: 0,
        failure_count: 0,
        elapsed_ms: 0,
        per_batch: Vec::new(),
    }
}

fn notify(progress: &Option<ProgressCallback>, stats: &GlobalStats, status: PipelineStatus) {
    if let Some(callback) = progress {
        callback(ProgressUpdate::from_stats(stats, status));
    }
}
