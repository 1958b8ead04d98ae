//! # stockmeta
//!
//! Concurrent batch pipeline that pushes an ordered list of uploaded
//! images through an external vision-analysis service, turning each
//! into structured stock metadata (title, description, keywords,
//! category) while respecting the service's concurrency and rate
//! limits, recovering from partial failures without losing progress,
//! and reporting live status.
//!
//! ## Core Behavior
//!
//! - **Bounded concurrency**: at most `max_concurrent_chunks` analyses
//!   in flight; a freed slot immediately starts the next pending chunk
//! - **Retry with backoff**: transient failures retry on an
//!   exponential curve, rate-limited failures with a raised floor
//! - **Individual fallback**: a chunk whose retries are exhausted is
//!   reprocessed item by item under a smaller concurrency cap
//! - **Index-preserving aggregation**: every outcome is recorded once
//!   at its global submission index, so out-of-order completion never
//!   reorders or corrupts the output
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use stockmeta::{HttpAnalysisClient, InputItem, MetadataPipeline, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> stockmeta::Result<()> {
//!     let config = PipelineConfig::new("https://vision.example.com/v1/analyze")
//!         .with_api_key("your-api-key");
//!     let client = Arc::new(HttpAnalysisClient::new(&config)?);
//!     let pipeline = MetadataPipeline::new(client, config)?;
//!
//!     let items = vec![InputItem::from_bytes(b"...", "image/jpeg", "photo.jpg")];
//!     let output = pipeline.process_images(items, None).await;
//!     println!("{} of {} images tagged", output.metadata.len(), output.stats.total_items);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`splitter`] | Fixed-size chunking with global index bookkeeping |
//! | [`analysis`] | HTTP client, payload extraction, record validation |
//! | [`retry`] | Bounded retries with exponential backoff |
//! | [`scheduler`] | Bounded-concurrency driver with individual fallback |
//! | [`aggregator`] | Write-once result slots and running statistics |
//! | [`pipeline`] | The `process_images` entry point |

pub mod aggregator;
pub mod analysis;
pub mod config;
pub mod pipeline;
pub mod retry;
pub mod scheduler;
pub mod splitter;
pub mod types;

/// Error type for the library
pub mod error;
pub use error::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

// Re-export main types for convenience
pub use aggregator::ResultAggregator;
pub use analysis::{AnalysisClient, HttpAnalysisClient};
pub use config::PipelineConfig;
pub use pipeline::{MetadataPipeline, PipelineOutput};
pub use retry::RetryPolicy;
pub use scheduler::{ChunkScheduler, ProgressCallback};
pub use splitter::{split_into_chunks, Chunk};
pub use types::{
    BatchStat, Category, GlobalStats, ImageMetadata, InputItem, PipelineStatus, ProgressUpdate,
};
