//! Sentiment pipeline orchestration.

use futures::stream::{self, StreamExt};
use tokio::time::{timeout_at, Instant};

use crate::error::SentimentError;
use crate::extractor::SentimentExtractor;
use crate::fetcher::ArticleFetcher;
use crate::types::SentimentRecord;

/// Result of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    /// In article-fetch order.
    pub records: Vec<SentimentRecord>,
    /// The caller's `count`, unclamped.
    pub requested: usize,
    pub returned: usize,
    /// Search candidates whose extraction was attempted.
    pub attempted: usize,
    /// `attempted - returned`: candidates that produced no record.
    pub skipped: usize,
    /// The deadline fired before every article was processed.
    pub timed_out: bool,
}

impl PipelineOutput {
    fn finish(
        records: Vec<SentimentRecord>,
        requested: usize,
        attempted: usize,
        timed_out: bool,
    ) -> Self {
        let returned = records.len();
        Self {
            records,
            requested,
            returned,
            attempted,
            skipped: attempted.saturating_sub(returned),
            timed_out,
        }
    }
}

/// Fetches articles for a topic and classifies each one.
pub struct AnalysisPipeline {
    fetcher: ArticleFetcher,
    extractor: SentimentExtractor,
    max_concurrency: usize,
}

impl AnalysisPipeline {
    #[must_use]
    pub fn new(
        fetcher: ArticleFetcher,
        extractor: SentimentExtractor,
        max_concurrency: usize,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Runs the pipeline with no overall deadline.
    ///
    /// # Errors
    ///
    /// See [`AnalysisPipeline::run_with_deadline`].
    pub async fn run(&self, topic: &str, count: usize) -> Result<PipelineOutput, SentimentError> {
        self.run_with_deadline(topic, count, None).await
    }

    /// Runs the pipeline, giving up at `deadline` if one is set.
    ///
    /// 1. Fetch up to `count` articles (one search, bounded extractions).
    /// 2. Classify the articles concurrently, at most `max_concurrency` at a time.
    /// 3. Slot each record back at its article's index so output order follows
    ///    fetch order whatever the completion order.
    ///
    /// Per-article failures are logged and counted as skips. When the deadline
    /// fires, in-flight classifications are dropped (cancelled) and the records
    /// finished so far are returned with `timed_out = true`.
    ///
    /// # Errors
    ///
    /// Only the fetch stage can fail the run: [`SentimentError::InvalidInput`]
    /// or [`SentimentError::SearchUnavailable`].
    pub async fn run_with_deadline(
        &self,
        topic: &str,
        count: usize,
        deadline: Option<Instant>,
    ) -> Result<PipelineOutput, SentimentError> {
        let fetch = self.fetcher.fetch(topic, count);
        let fetched = match deadline {
            Some(at) => match timeout_at(at, fetch).await {
                Ok(result) => result?,
                Err(_) => {
                    tracing::warn!(topic, "deadline reached while fetching articles");
                    return Ok(PipelineOutput::finish(Vec::new(), count, 0, true));
                }
            },
            None => fetch.await?,
        };

        let articles = fetched.articles;
        let mut slots: Vec<Option<SentimentRecord>> = (0..articles.len()).map(|_| None).collect();

        // Index-keyed so the stream item future does not borrow from the iterator.
        let articles_ref = &articles;
        let mut classifications = stream::iter(0..articles.len())
            .map(|index| async move {
                (index, self.extractor.analyze(&articles_ref[index]).await)
            })
            .buffer_unordered(self.max_concurrency);

        let timed_out = loop {
            let next = match deadline {
                Some(at) => match timeout_at(at, classifications.next()).await {
                    Ok(next) => next,
                    Err(_) => break true,
                },
                None => classifications.next().await,
            };
            let Some((index, result)) = next else {
                break false;
            };
            match result {
                Ok(record) => slots[index] = Some(record),
                Err(e) => {
                    tracing::warn!(
                        url = %articles[index].url,
                        code = e.code(),
                        error = %e,
                        "skipping article"
                    );
                }
            }
        };
        // Dropping the stream cancels whatever is still in flight.
        drop(classifications);

        if timed_out {
            tracing::warn!(
                topic,
                completed = slots.iter().filter(|s| s.is_some()).count(),
                articles = articles.len(),
                "deadline reached; returning partial results"
            );
        }

        let records: Vec<SentimentRecord> = slots.into_iter().flatten().collect();
        Ok(PipelineOutput::finish(
            records,
            count,
            fetched.attempted,
            timed_out,
        ))
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
