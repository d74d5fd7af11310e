//! The analyze entry point shared by every transport.

use std::sync::Arc;
use std::time::Instant as StdInstant;

use tokio::time::Instant;

use crate::error::{ProviderError, SentimentError};
use crate::extractor::SentimentExtractor;
use crate::fetcher::{validate_request, ArticleFetcher};
use crate::gemini::GeminiClient;
use crate::pipeline::AnalysisPipeline;
use crate::providers::{ExtractionProvider, ModelProvider, SearchProvider};
use crate::sources::{BraveSearchClient, HtmlArticleExtractor};
use crate::types::{AnalysisReport, PipelineSettings, SentimentBreakdown, SentimentConfig};

/// Validates requests, enforces the overall deadline and assembles the
/// [`AnalysisReport`]. Holds no per-request state, so one instance can be
/// shared across concurrent callers.
pub struct RequestService {
    pipeline: AnalysisPipeline,
    settings: PipelineSettings,
}

impl RequestService {
    #[must_use]
    pub fn new(
        settings: PipelineSettings,
        search: Arc<dyn SearchProvider>,
        extractor: Arc<dyn ExtractionProvider>,
        model: Arc<dyn ModelProvider>,
    ) -> Self {
        let fetcher = ArticleFetcher::new(search, extractor, settings.clone());
        let sentiment = SentimentExtractor::new(model, settings.clone());
        let pipeline = AnalysisPipeline::new(fetcher, sentiment, settings.max_concurrency);
        Self { pipeline, settings }
    }

    /// Wires the Brave, HTML and Gemini HTTP providers from config.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if an HTTP client cannot be built, or
    /// [`SentimentError::InvalidInput`] if a provider base URL is malformed.
    pub fn from_config(config: &SentimentConfig) -> Result<Self, SentimentError> {
        let settings = config.settings.clone();
        let search = BraveSearchClient::with_base_url(
            &config.brave_api_key,
            settings.search_timeout,
            &config.user_agent,
            &config.brave_base_url,
        )
        .map_err(provider_setup_error)?;
        let extractor = HtmlArticleExtractor::new(settings.extract_timeout, &config.user_agent)
            .map_err(provider_setup_error)?;
        let model = GeminiClient::with_base_url(
            &config.gemini_api_key,
            &config.gemini_model,
            settings.model_timeout,
            &config.user_agent,
            &config.gemini_base_url,
        )
        .map_err(provider_setup_error)?;

        Ok(Self::new(
            settings,
            Arc::new(search),
            Arc::new(extractor),
            Arc::new(model),
        ))
    }

    #[must_use]
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Analyzes up to `count` articles about `topic` (default count when `None`).
    ///
    /// Hitting the request deadline is not an error: the report carries the
    /// records finished in time and `partial = true`.
    ///
    /// # Errors
    ///
    /// - [`SentimentError::InvalidInput`] for a blank topic or zero count.
    /// - [`SentimentError::SearchUnavailable`] if the search provider is down.
    pub async fn analyze(
        &self,
        topic: &str,
        count: Option<usize>,
    ) -> Result<AnalysisReport, SentimentError> {
        let count = count.unwrap_or(self.settings.default_articles);
        let topic = validate_request(topic, count)?;

        let started = StdInstant::now();
        let deadline = Instant::now() + self.settings.request_timeout;
        let output = self
            .pipeline
            .run_with_deadline(topic, count, Some(deadline))
            .await?;

        let breakdown = SentimentBreakdown::from_records(&output.records);
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(
            topic,
            requested = output.requested,
            returned = output.returned,
            attempted = output.attempted,
            skipped = output.skipped,
            partial = output.timed_out,
            elapsed_ms,
            "analysis complete"
        );

        Ok(AnalysisReport {
            topic: topic.to_owned(),
            requested: output.requested,
            returned: output.returned,
            partial: output.timed_out,
            attempted: output.attempted,
            skipped: output.skipped,
            breakdown,
            records: output.records,
        })
    }
}

fn provider_setup_error(err: ProviderError) -> SentimentError {
    match err {
        ProviderError::Http(e) => SentimentError::Http(e),
        ProviderError::InvalidBaseUrl { provider, reason } => SentimentError::InvalidInput {
            field: provider,
            reason,
        },
        other => SentimentError::InvalidInput {
            field: "provider",
            reason: other.to_string(),
        },
    }
}
