use serde::Serialize;

/// Outcome of one chunk attempt, including each fallback sub-run.
///
/// Diagnostic only; nothing in the pipeline branches on these.
#[derive(Debug, Clone, Serialize)]
pub struct BatchStat {
    pub chunk_number: usize,
    pub item_count: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub elapsed_ms: u64,
}

/// Running totals for a pipeline run, owned by the aggregator.
#[derive(Debug, Clone, Serialize)]
pub struct GlobalStats {
    pub total_items: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub elapsed_ms: u64,
    pub per_batch: Vec<BatchStat>,
}

impl GlobalStats {
    pub fn processed(&self) -> usize {
        self.success_count + self.failure_count
    }

    pub fn is_complete(&self) -> bool {
        self.processed() == self.total_items
    }
}

/// Pipeline-level status reported through the progress callback.
///
/// `Error` is reserved for total pipeline failure (the upfront
/// availability check); partial per-item failure still completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Processing,
    Completed,
    Error,
}

/// Read-only snapshot handed to the progress callback after every
/// chunk or fallback-item settlement.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressUpdate {
    pub total_images: usize,
    pub processed_images: usize,
    pub successful_images: usize,
    pub failed_images: usize,
    pub processing_time_ms: u64,
    pub status: PipelineStatus,
}

impl ProgressUpdate {
    pub fn from_stats(stats: &GlobalStats, status: PipelineStatus) -> Self {
        Self {
            total_images: stats.total_items,
            processed_images: stats.processed(),
            successful_images: stats.success_count,
            failed_images: stats.failure_count,
            processing_time_ms: stats.elapsed_ms,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_update_mirrors_stats() {
        let stats = GlobalStats {
            total_items: 10,
            success_count: 6,
            failure_count: 2,
            elapsed_ms: 1234,
            per_batch: Vec::new(),
        };
        let update = ProgressUpdate::from_stats(&stats, PipelineStatus::Processing);
        assert_eq!(update.total_images, 10);
        assert_eq!(update.processed_images, 8);
        assert_eq!(update.successful_images, 6);
        assert_eq!(update.failed_images, 2);
        assert!(!stats.is_complete());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PipelineStatus::Processing).unwrap(),
            "\"processing\""
        );
        assert_eq!(
            serde_json::to_string(&PipelineStatus::Completed).unwrap(),
            "\"completed\""
        );
    }
}
