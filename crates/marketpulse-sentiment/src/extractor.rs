//! Article → validated sentiment record, via the language model.

use std::sync::Arc;

use tokio::time::timeout;

use crate::error::{ProviderError, SentimentError};
use crate::parse::parse_sentiment_response;
use crate::prompt::build_prompt;
use crate::providers::ModelProvider;
use crate::retry::retry_with_backoff;
use crate::types::{Article, PipelineSettings, SentimentRecord};

pub struct SentimentExtractor {
    model: Arc<dyn ModelProvider>,
    settings: PipelineSettings,
}

impl SentimentExtractor {
    #[must_use]
    pub fn new(model: Arc<dyn ModelProvider>, settings: PipelineSettings) -> Self {
        Self { model, settings }
    }

    /// Classifies one article.
    ///
    /// Each model attempt is bounded by the model timeout; transient failures
    /// get `model_max_retries` further attempts.
    ///
    /// # Errors
    ///
    /// - [`SentimentError::ModelUnavailable`] when the model call keeps failing.
    /// - [`SentimentError::MalformedResponse`] when the reply does not yield a
    ///   valid record.
    pub async fn analyze(&self, article: &Article) -> Result<SentimentRecord, SentimentError> {
        let prompt = build_prompt(article, self.settings.prompt_max_chars);
        let model_timeout = self.settings.model_timeout;
        let prompt_ref = prompt.as_str();

        let raw = retry_with_backoff(
            self.settings.model_max_retries,
            self.settings.retry_backoff_ms,
            move || async move {
                timeout(model_timeout, self.model.complete(prompt_ref))
                    .await
                    .map_err(|_| ProviderError::Timeout {
                        provider: "model",
                        after: model_timeout,
                    })
                    .and_then(|inner| inner)
            },
        )
        .await
        .map_err(|e| SentimentError::ModelUnavailable(e.to_string()))?;

        let record = parse_sentiment_response(&raw, article, self.settings.summary_max_chars)?;
        tracing::debug!(
            url = %article.url,
            label = %record.label,
            confidence = record.confidence,
            "article classified"
        );
        Ok(record)
    }
}
