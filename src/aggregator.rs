//! Result aggregator: write-once slots keyed by global index.

use crate::types::{BatchStat, GlobalStats, ImageMetadata};
use std::sync::Mutex;
use std::time::Instant;
use tracing::warn;

#[derive(Debug, Clone)]
enum Slot {
    Pending,
    Success(ImageMetadata),
    Failed,
}

struct State {
    slots: Vec<Slot>,
    success_count: usize,
    failure_count: usize,
    per_batch: Vec<BatchStat>,
}

/// Records each item's outcome exactly once and exposes running
/// statistics. Shared across chunk tasks behind an `Arc`; the lock is
/// never held across an await.
pub struct ResultAggregator {
    state: Mutex<State>,
    started: Instant,
    total_items: usize,
}

impl ResultAggregator {
    pub fn new(total_items: usize) -> Self {
        Self {
            state: Mutex::new(State {
                slots: vec![Slot::Pending; total_items],
                success_count: 0,
                failure_count: 0,
                per_batch: Vec::new(),
            }),
            started: Instant::now(),
            total_items,
        }
    }

    /// Record one item's outcome at its global index. A second write
    /// to the same index is ignored (and logged); counters bump
    /// exactly once per index.
    pub fn record(&self, index: usize, outcome: Option<ImageMetadata>) {
        let mut state = self.state.lock().unwrap();
        if index >= state.slots.len() {
            warn!(index, total = state.slots.len(), "index out of range, dropping result");
            return;
        }
        if !matches!(state.slots[index], Slot::Pending) {
            warn!(index, "duplicate write to result slot, ignoring");
            return;
        }
        match outcome {
            Some(meta) => {
                state.slots[index] = Slot::Success(meta);
                state.success_count += 1;
            }
            None => {
                state.slots[index] = Slot::Failed;
                state.failure_count += 1;
            }
        }
    }

    pub fn record_batch(&self, stat: BatchStat) {
        self.state.lock().unwrap().per_batch.push(stat);
    }

    /// Read-only snapshot of the running statistics.
    pub fn snapshot(&self) -> GlobalStats {
        let state = self.state.lock().unwrap();
        GlobalStats {
            total_items: self.total_items,
            success_count: state.success_count,
            failure_count: state.failure_count,
            elapsed_ms: self.started.elapsed().as_millis() as u64,
            per_batch: state.per_batch.clone(),
        }
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Final ordered output: present slots in index order, absent
    /// slots omitted.
    pub fn into_metadata(self) -> Vec<ImageMetadata> {
        let state = self.state.into_inner().unwrap();
        state
            .slots
            .into_iter()
            .filter_map(|slot| match slot {
                Slot::Success(meta) => Some(meta),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    fn meta(title: &str) -> ImageMetadata {
        ImageMetadata {
            title: title.to_string(),
            description: "d".to_string(),
            keywords: (0..15).map(|i| format!("kw{}", i)).collect(),
            category: Category::Travel,
            display_name: format!("{}.jpg", title),
        }
    }

    #[test]
    fn counters_track_outcomes() {
        let agg = ResultAggregator::new(3);
        agg.record(0, Some(meta("a")));
        agg.record(2, None);
        let stats = agg.snapshot();
        assert_eq!(stats.success_count, 1);
        assert_eq!(stats.failure_count, 1);
        assert!(!stats.is_complete());

        agg.record(1, Some(meta("b")));
        assert!(agg.snapshot().is_complete());
    }

    #[test]
    fn duplicate_writes_are_ignored() {
        let agg = ResultAggregator::new(2);
        agg.record(0, Some(meta("first")));
        agg.record(0, Some(meta("second")));
        agg.record(0, None);
        let stats = agg.snapshot();
        assert_eq!(stats.success_count, 1);
        assert_eq!(stats.failure_count, 0);
        let out = agg.into_metadata();
        assert_eq!(out[0].title, "first");
    }

    #[test]
    fn out_of_range_writes_are_dropped() {
        let agg = ResultAggregator::new(1);
        agg.record(5, Some(meta("ghost")));
        let stats = agg.snapshot();
        assert_eq!(stats.success_count, 0);
    }

    #[test]
    fn output_is_in_index_order_with_gaps_omitted() {
        let agg = ResultAggregator::new(5);
        // Written out of order, as out-of-order chunk completion would.
        agg.record(4, Some(meta("e")));
        agg.record(0, Some(meta("a")));
        agg.record(2, None);
        agg.record(1, Some(meta("b")));
        agg.record(3, None);
        let titles: Vec<String> = agg.into_metadata().into_iter().map(|m| m.title).collect();
        assert_eq!(titles, vec!["a", "b", "e"]);
    }

    #[test]
    fn batch_stats_accumulate() {
        let agg = ResultAggregator::new(0);
        agg.record_batch(BatchStat {
            chunk_number: 0,
            item_count: 20,
            success_count: 18,
            failure_count: 2,
            elapsed_ms: 10,
        });
        assert_eq!(agg.snapshot().per_batch.len(), 1);
    }
}
