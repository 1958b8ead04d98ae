//! Pipeline configuration.
//!
//! All knobs are explicit and injected; nothing reads global state at
//! call time. Operational overrides come from the environment once, at
//! construction.

use crate::{Error, Result};
use std::env;
use std::time::Duration;

/// Configuration for the metadata pipeline.
///
/// Keep this surface area small and predictable. Defaults match the
/// service's documented concurrency and rate limits.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Analysis service endpoint (the per-chunk POST target).
    pub endpoint: String,
    /// Optional bearer token for the analysis service.
    pub api_key: Option<String>,
    /// Items per analysis request.
    pub chunk_size: usize,
    /// Maximum chunk analyses in flight at once.
    pub max_concurrent_chunks: usize,
    /// Concurrency cap for the per-item fallback path.
    pub individual_fallback_concurrency: usize,
    /// Maximum attempts per call (first try included).
    pub max_retries: u32,
    /// Base delay for exponential backoff.
    pub base_delay: Duration,
    /// Upper bound on any single backoff delay.
    pub max_delay: Duration,
    /// Minimum delay applied to rate-limited failures.
    pub rate_limit_floor: Duration,
    /// Per-request timeout; expiry surfaces as a transient error.
    pub request_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            chunk_size: 20,
            max_concurrent_chunks: 5,
            individual_fallback_concurrency: 3,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            rate_limit_floor: Duration::from_secs(2),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl PipelineConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Build a config from the environment.
    ///
    /// Recognized variables: `STOCKMETA_ENDPOINT`, `STOCKMETA_API_KEY`,
    /// `STOCKMETA_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let endpoint = env::var("STOCKMETA_ENDPOINT").map_err(|_| {
            Error::configuration("STOCKMETA_ENDPOINT is not set")
        })?;
        let mut config = Self::new(endpoint);
        config.api_key = env::var("STOCKMETA_API_KEY").ok();
        if let Some(secs) = env::var("STOCKMETA_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            config.request_timeout = Duration::from_secs(secs);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    pub fn with_max_concurrent_chunks(mut self, cap: usize) -> Self {
        self.max_concurrent_chunks = cap.max(1);
        self
    }

    pub fn with_individual_fallback_concurrency(mut self, cap: usize) -> Self {
        self.individual_fallback_concurrency = cap.max(1);
        self
    }

    pub fn with_max_retries(mut self, attempts: u32) -> Self {
        self.max_retries = attempts.max(1);
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_rate_limit_floor(mut self, floor: Duration) -> Self {
        self.rate_limit_floor = floor;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Check the full config, endpoint included. Used by the HTTP
    /// client; pipelines with injected clients only need
    /// [`validate_limits`](Self::validate_limits).
    pub fn validate(&self) -> Result<()> {
        self.validate_limits()?;
        url::Url::parse(&self.endpoint).map_err(|e| {
            Error::configuration(format!("invalid endpoint '{}': {}", self.endpoint, e))
        })?;
        Ok(())
    }

    /// Check the numeric knobs only.
    pub fn validate_limits(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::configuration("chunk_size must be at least 1"));
        }
        if self.max_concurrent_chunks == 0 {
            return Err(Error::configuration(
                "max_concurrent_chunks must be at least 1",
            ));
        }
        if self.individual_fallback_concurrency == 0 {
            return Err(Error::configuration(
                "individual_fallback_concurrency must be at least 1",
            ));
        }
        if self.max_retries == 0 {
            return Err(Error::configuration("max_retries must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_limits() {
        let config = PipelineConfig::default();
        assert_eq!(config.chunk_size, 20);
        assert_eq!(config.max_concurrent_chunks, 5);
        assert_eq!(config.individual_fallback_concurrency, 3);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.base_delay, Duration::from_millis(500));
    }

    #[test]
    fn builder_methods_clamp_to_one() {
        let config = PipelineConfig::new("http://localhost:9999/analyze")
            .with_max_concurrent_chunks(0)
            .with_individual_fallback_concurrency(0)
            .with_max_retries(0);
        assert_eq!(config.max_concurrent_chunks, 1);
        assert_eq!(config.individual_fallback_concurrency, 1);
        assert_eq!(config.max_retries, 1);
    }

    #[test]
    fn validate_rejects_bad_endpoint() {
        let config = PipelineConfig::new("not a url");
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_chunk_size() {
        let config = PipelineConfig::new("http://localhost:9999/analyze").with_chunk_size(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_defaults_with_endpoint() {
        let config = PipelineConfig::new("https://vision.example.com/v1/analyze");
        assert!(config.validate().is_ok());
    }
}
