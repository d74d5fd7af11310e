use std::time::Duration;

use thiserror::Error;

/// Failures raised by the external collaborators (search, extraction, model).
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {provider} (retry after {retry_after_secs}s)")]
    RateLimited {
        provider: &'static str,
        retry_after_secs: u64,
    },

    #[error("unexpected HTTP status {status} from {provider} at {url}")]
    UnexpectedStatus {
        provider: &'static str,
        status: u16,
        url: String,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{provider} call timed out after {after:?}")]
    Timeout {
        provider: &'static str,
        after: Duration,
    },

    #[error("{url} is not an article: {reason}")]
    NotArticle { url: String, reason: String },

    #[error("{0} returned an empty response")]
    EmptyResponse(&'static str),

    #[error("invalid {provider} base URL: {reason}")]
    InvalidBaseUrl {
        provider: &'static str,
        reason: String,
    },
}

impl ProviderError {
    /// Returns `true` for transient failures that are worth one more attempt.
    ///
    /// Rate limits, timeouts, connect failures and 5xx statuses are transient.
    /// Client errors, malformed bodies and non-article pages are not.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            ProviderError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            ProviderError::RateLimited { .. } | ProviderError::Timeout { .. } => true,
            ProviderError::UnexpectedStatus { status, .. } => *status >= 500,
            ProviderError::Deserialize { .. }
            | ProviderError::NotArticle { .. }
            | ProviderError::EmptyResponse(_)
            | ProviderError::InvalidBaseUrl { .. } => false,
        }
    }
}

/// Why a model response could not become a [`crate::SentimentRecord`].
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no JSON object found in model response")]
    PayloadNotFound,

    #[error("sentiment payload did not decode: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("label \"{0}\" is not a recognised sentiment")]
    InvalidLabel(String),

    #[error("confidence {0} is not an integer in 0..=10")]
    ConfidenceOutOfRange(String),

    #[error("summary is empty")]
    EmptySummary,

    #[error("summary is {len} chars, limit is {max}")]
    SummaryTooLong { len: usize, max: usize },

    #[error("expected 2 to 4 insights, got {0}")]
    InsightCount(usize),

    #[error("insight #{0} is empty")]
    EmptyInsight(usize),
}

/// Error taxonomy of the analyze operation.
///
/// Only [`SentimentError::InvalidInput`] and [`SentimentError::SearchUnavailable`]
/// reach a caller of [`crate::RequestService::analyze`]. The per-article
/// variants, [`SentimentError::ModelUnavailable`] included, are absorbed as
/// skips by the pipeline. [`SentimentError::Http`] only comes out of
/// [`crate::RequestService::from_config`].
#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("search provider unavailable: {0}")]
    SearchUnavailable(String),

    #[error("article extraction failed for {url}: {reason}")]
    ArticleExtraction { url: String, reason: String },

    #[error("model provider unavailable: {0}")]
    ModelUnavailable(String),

    #[error("malformed model response: {0}")]
    MalformedResponse(#[from] ParseError),

    /// HTTP client construction failed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl SentimentError {
    /// Stable machine-readable code for transports.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            SentimentError::InvalidInput { .. } => "invalid_input",
            SentimentError::SearchUnavailable(_) => "search_unavailable",
            SentimentError::ArticleExtraction { .. } => "article_extraction_failed",
            SentimentError::ModelUnavailable(_) => "model_unavailable",
            SentimentError::MalformedResponse(_) => "malformed_response",
            SentimentError::Http(_) => "internal_error",
        }
    }

    /// The offending request field for validation failures.
    #[must_use]
    pub fn field(&self) -> Option<&'static str> {
        match self {
            SentimentError::InvalidInput { field, .. } => Some(*field),
            _ => None,
        }
    }
}
