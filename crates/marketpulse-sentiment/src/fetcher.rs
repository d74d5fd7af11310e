//! Topic → extracted articles.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::time::timeout;

use crate::error::{ProviderError, SentimentError};
use crate::providers::{ExtractionProvider, SearchProvider};
use crate::retry::retry_with_backoff;
use crate::types::{Article, PipelineSettings, SearchResult};

const MAX_TOPIC_CHARS: usize = 256;

/// Articles collected for one topic plus how many candidates were tried.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    /// In search-result order.
    pub articles: Vec<Article>,
    /// Candidates whose extraction finished (successfully or not).
    pub attempted: usize,
}

/// Checks a `(topic, count)` pair and returns the trimmed topic.
///
/// # Errors
///
/// Returns [`SentimentError::InvalidInput`] naming the offending field.
pub fn validate_request(topic: &str, count: usize) -> Result<&str, SentimentError> {
    let trimmed = topic.trim();
    if trimmed.is_empty() {
        return Err(SentimentError::InvalidInput {
            field: "topic",
            reason: "must not be empty".to_owned(),
        });
    }
    if trimmed.chars().count() > MAX_TOPIC_CHARS {
        return Err(SentimentError::InvalidInput {
            field: "topic",
            reason: format!("must be at most {MAX_TOPIC_CHARS} characters"),
        });
    }
    if count == 0 {
        return Err(SentimentError::InvalidInput {
            field: "count",
            reason: "must be at least 1".to_owned(),
        });
    }
    Ok(trimmed)
}

/// Searches for a topic and extracts readable text from the hits.
pub struct ArticleFetcher {
    search: Arc<dyn SearchProvider>,
    extractor: Arc<dyn ExtractionProvider>,
    settings: PipelineSettings,
}

impl ArticleFetcher {
    #[must_use]
    pub fn new(
        search: Arc<dyn SearchProvider>,
        extractor: Arc<dyn ExtractionProvider>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            search,
            extractor,
            settings,
        }
    }

    /// Number of search hits requested for `count` wanted articles.
    fn search_limit(&self, count: usize) -> usize {
        count
            .saturating_mul(self.settings.search_overfetch_percent)
            .div_ceil(100)
            .max(count)
    }

    /// Collects up to `count` articles (clamped to the configured maximum).
    ///
    /// Candidates that fail extraction, time out, or have no body are skipped.
    /// Only a wholly failed search is fatal.
    ///
    /// # Errors
    ///
    /// - [`SentimentError::InvalidInput`] for an empty topic or a zero count.
    /// - [`SentimentError::SearchUnavailable`] if the search provider fails
    ///   after retries.
    pub async fn fetch(&self, topic: &str, count: usize) -> Result<FetchOutcome, SentimentError> {
        let topic = validate_request(topic, count)?;
        let wanted = count.min(self.settings.max_articles.max(1));
        let limit = self.search_limit(wanted);

        let candidates = self.search_candidates(topic, limit).await?;
        tracing::debug!(
            topic,
            wanted,
            limit,
            candidates = candidates.len(),
            "search returned candidates"
        );

        let concurrency = self.settings.max_concurrency.max(1);
        let mut extractions = stream::iter(candidates)
            .map(|candidate| self.extract_one(candidate))
            .buffered(concurrency);

        let mut outcome = FetchOutcome::default();
        while let Some(article) = extractions.next().await {
            outcome.attempted += 1;
            if let Some(article) = article {
                outcome.articles.push(article);
                if outcome.articles.len() >= wanted {
                    break;
                }
            }
        }

        tracing::debug!(
            topic,
            attempted = outcome.attempted,
            articles = outcome.articles.len(),
            "article fetch complete"
        );
        Ok(outcome)
    }

    async fn search_candidates(
        &self,
        topic: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, SentimentError> {
        let search_timeout = self.settings.search_timeout;
        let results = retry_with_backoff(
            self.settings.search_max_retries,
            self.settings.retry_backoff_ms,
            move || async move {
                timeout(search_timeout, self.search.search(topic, limit))
                    .await
                    .map_err(|_| ProviderError::Timeout {
                        provider: "search",
                        after: search_timeout,
                    })
                    .and_then(|inner| inner)
            },
        )
        .await
        .map_err(|e| {
            tracing::error!(topic, error = %e, "search provider unavailable");
            SentimentError::SearchUnavailable(e.to_string())
        })?;

        let mut seen = HashSet::new();
        Ok(results
            .into_iter()
            .filter(|r| seen.insert(r.url.clone()))
            .take(limit)
            .collect())
    }

    async fn extract_one(&self, candidate: SearchResult) -> Option<Article> {
        let extract_timeout = self.settings.extract_timeout;
        let outcome = timeout(extract_timeout, self.extractor.extract_text(&candidate.url))
            .await
            .map_err(|_| ProviderError::Timeout {
                provider: "extraction",
                after: extract_timeout,
            })
            .and_then(|inner| inner);

        match outcome {
            Ok(text) => {
                let url = candidate.url.clone();
                let article = Article::from_parts(candidate, text);
                if article.is_none() {
                    tracing::warn!(url = %url, "skipping article with empty body");
                }
                article
            }
            Err(e) => {
                let skipped = SentimentError::ArticleExtraction {
                    url: candidate.url,
                    reason: e.to_string(),
                };
                tracing::warn!(error = %skipped, "skipping article");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "fetcher_test.rs"]
mod tests;
