use thiserror::Error;

/// Unified error type for the metadata pipeline.
///
/// The variants mirror the pipeline's failure taxonomy: transient
/// service failures (including rate limiting) are retried, malformed
/// responses are retried and then treated as a hard chunk failure,
/// validation failures drop the offending item only, and configuration
/// errors surface before any work starts.
#[derive(Debug, Error)]
pub enum Error {
    /// Network or service unavailability. Auto-retried by the retry
    /// controller; `rate_limited` selects the longer backoff floor.
    #[error("transient service error{}: {message}", rate_limit_suffix(.rate_limited))]
    Transient { message: String, rate_limited: bool },

    /// The service responded but nothing usable could be parsed.
    #[error("malformed analysis response: {message}")]
    MalformedResponse { message: String },

    /// A decoded item failed structural checks.
    #[error("validation error: {message}{}", format_field(.field))]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Bad pipeline configuration (invalid endpoint, zero chunk size).
    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn rate_limit_suffix(rate_limited: &bool) -> &'static str {
    if *rate_limited {
        " (rate limited)"
    } else {
        ""
    }
}

fn format_field(field: &Option<String>) -> String {
    match field {
        Some(f) => format!(" (field: {})", f),
        None => String::new(),
    }
}

impl Error {
    pub fn transient(msg: impl Into<String>) -> Self {
        Error::Transient {
            message: msg.into(),
            rate_limited: false,
        }
    }

    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Error::Transient {
            message: msg.into(),
            rate_limited: true,
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedResponse {
            message: msg.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation {
            message: msg.into(),
            field: None,
        }
    }

    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Error::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
        }
    }

    /// Whether the retry controller should attempt this error again.
    ///
    /// Malformed responses are retryable: the service may produce a
    /// usable payload on a second attempt. Timeouts and connection
    /// failures from reqwest count as transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transient { .. } | Error::MalformedResponse { .. } => true,
            Error::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            Error::Transient {
                rate_limited: true,
                ..
            }
        )
    }
}
