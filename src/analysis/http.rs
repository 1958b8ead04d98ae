//! HTTP analysis client: one request per chunk to the vision service.

use crate::analysis::extract::extract_payload;
use crate::analysis::validate::{validate_record, RawMetadata};
use crate::config::PipelineConfig;
use crate::splitter::Chunk;
use crate::types::ImageMetadata;
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Fixed instruction sent with every chunk. The schema it requests is
/// what `RawMetadata` decodes.
const INSTRUCTION: &str = "For each attached image, produce one JSON object with fields \
\"title\", \"description\", \"keywords\" (45-49 single-word strings) and \"category\" \
(one of the 21 stock categories, by name or numeric id). Respond with a bare JSON array \
of these objects, in the same order as the images.";

/// Seam between the scheduler and the external service.
///
/// Implemented over HTTP in production and by scripted doubles in
/// tests; the pipeline only ever sees this trait.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Cheap upfront availability probe, run before any chunk work.
    async fn check_availability(&self) -> Result<()>;

    /// Analyze one chunk, returning validated metadata in submission
    /// order. May return fewer records than submitted items; the
    /// caller infers gaps positionally.
    async fn analyze_chunk(&self, chunk: &Chunk) -> Result<Vec<ImageMetadata>>;
}

pub struct HttpAnalysisClient {
    client: reqwest::Client,
    endpoint: String,
    health_url: String,
    api_key: Option<String>,
}

impl HttpAnalysisClient {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;

        let mut health = url::Url::parse(&config.endpoint)
            .map_err(|e| Error::configuration(format!("invalid endpoint: {}", e)))?;
        health.set_path("/health");
        health.set_query(None);

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            health_url: health.to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn request_body(chunk: &Chunk) -> Value {
        let items: Vec<Value> = chunk
            .items
            .iter()
            .map(|item| {
                json!({
                    "name": item.display_name,
                    "media_type": item.payload_kind,
                    "data": item.encoded_payload,
                })
            })
            .collect();
        json!({ "instruction": INSTRUCTION, "items": items })
    }

    /// Map a non-success status to the pipeline taxonomy. 429 and
    /// rate-limit flavored bodies pick the raised backoff floor;
    /// everything else is plainly transient.
    fn classify_failure(status: u16, body: &str) -> Error {
        let lowered = body.to_lowercase();
        let rate_limited = status == 429
            || lowered.contains("rate limit")
            || lowered.contains("quota")
            || lowered.contains("overloaded");
        let message = format!("service returned HTTP {}", status);
        if rate_limited {
            Error::rate_limited(message)
        } else {
            Error::transient(message)
        }
    }

    /// Pull the per-item record array out of whatever shape the
    /// service wrapped it in.
    fn coerce_records(value: Value) -> Option<Vec<Value>> {
        match value {
            Value::Array(records) => Some(records),
            Value::Object(map) => {
                for key in ["items", "results", "images", "metadata", "data"] {
                    if let Some(Value::Array(records)) = map.get(key) {
                        return Some(records.clone());
                    }
                }
                // Envelope with the payload as embedded text.
                for key in ["content", "output", "text"] {
                    if let Some(Value::String(text)) = map.get(key) {
                        if let Some(inner) = extract_payload(text) {
                            return Self::coerce_records(inner);
                        }
                    }
                }
                None
            }
            _ => None,
        }
    }

    fn parse_response(chunk: &Chunk, body: &str) -> Result<Vec<ImageMetadata>> {
        let payload = extract_payload(body)
            .ok_or_else(|| Error::malformed("no structured payload found in response"))?;
        let mut records = Self::coerce_records(payload)
            .ok_or_else(|| Error::malformed("payload is not an array of records"))?;

        if records.len() > chunk.len() {
            warn!(
                chunk_number = chunk.number,
                returned = records.len(),
                submitted = chunk.len(),
                "service returned more records than submitted; truncating"
            );
            records.truncate(chunk.len());
        }

        let mut usable = Vec::with_capacity(records.len());
        for (offset, record) in records.into_iter().enumerate() {
            let display_name = &chunk.items[offset].display_name;
            let raw: RawMetadata = match serde_json::from_value(record) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(display_name, error = %e, "dropping undecodable record");
                    continue;
                }
            };
            match validate_record(raw, display_name) {
                Ok(meta) => usable.push(meta),
                Err(e) => {
                    warn!(display_name, error = %e, "dropping invalid record");
                }
            }
        }

        if usable.is_empty() {
            return Err(Error::malformed("zero usable records in response"));
        }
        Ok(usable)
    }
}

#[async_trait]
impl AnalysisClient for HttpAnalysisClient {
    async fn check_availability(&self) -> Result<()> {
        let resp = self
            .client
            .get(&self.health_url)
            .send()
            .await
            .map_err(|e| Error::transient(format!("availability check failed: {}", e)))?;
        if !resp.status().is_success() {
            return Err(Error::transient(format!(
                "availability check returned HTTP {}",
                resp.status().as_u16()
            )));
        }
        debug!("analysis service available");
        Ok(())
    }

    async fn analyze_chunk(&self, chunk: &Chunk) -> Result<Vec<ImageMetadata>> {
        let request_id = Uuid::new_v4().to_string();
        let start = Instant::now();

        let mut req = self
            .client
            .post(&self.endpoint)
            .json(&Self::request_body(chunk))
            .header("x-request-id", &request_id);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::transient(format!("request timed out: {}", e))
            } else {
                Error::Http(e)
            }
        })?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(
                chunk_number = chunk.number,
                http_status = status,
                request_id = request_id.as_str(),
                duration_ms = start.elapsed().as_millis() as u64,
                "analysis request failed"
            );
            return Err(Self::classify_failure(status, &body));
        }

        let body = resp.text().await.map_err(Error::Http)?;
        let usable = Self::parse_response(chunk, &body)?;

        info!(
            chunk_number = chunk.number,
            submitted = chunk.len(),
            usable = usable.len(),
            request_id = request_id.as_str(),
            duration_ms = start.elapsed().as_millis() as u64,
            "analysis request completed"
        );
        Ok(usable)
    }
}
