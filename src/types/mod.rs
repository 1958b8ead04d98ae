//! Core type definitions: input items, validated metadata, statistics.

mod item;
mod metadata;
mod stats;

pub use item::InputItem;
pub use metadata::{Category, ImageMetadata};
pub use stats::{BatchStat, GlobalStats, PipelineStatus, ProgressUpdate};
