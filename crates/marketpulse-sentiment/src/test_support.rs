//! In-process provider fakes shared by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::providers::{ExtractionProvider, ModelProvider, SearchProvider};
use crate::types::{ExtractedText, PipelineSettings, SearchResult};

pub(crate) fn test_settings() -> PipelineSettings {
    PipelineSettings {
        search_timeout: Duration::from_secs(2),
        extract_timeout: Duration::from_secs(2),
        model_timeout: Duration::from_secs(2),
        retry_backoff_ms: 0,
        request_timeout: Duration::from_secs(10),
        ..PipelineSettings::default()
    }
}

pub(crate) fn url(n: usize) -> String {
    format!("https://news{n}.example.com/story")
}

pub(crate) fn valid_payload(label: &str, confidence: i64) -> String {
    format!(
        r#"{{"sentiment":"{label}","confidence":{confidence},"summary":"Prices moved.","insights":["first","second"]}}"#
    )
}

pub(crate) struct MockSearch {
    results: Result<Vec<SearchResult>, u16>,
    pub calls: AtomicUsize,
}

impl MockSearch {
    pub fn with_urls(n: usize) -> Arc<Self> {
        let results = (1..=n)
            .map(|i| SearchResult {
                url: url(i),
                title: format!("Story {i}"),
                description: String::new(),
            })
            .collect();
        Arc::new(Self {
            results: Ok(results),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn with_results(results: Vec<SearchResult>) -> Arc<Self> {
        Arc::new(Self {
            results: Ok(results),
            calls: AtomicUsize::new(0),
        })
    }

    /// Every call fails with the given HTTP status.
    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            results: Err(status),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<SearchResult>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.results {
            Ok(results) => Ok(results.iter().take(limit).cloned().collect()),
            Err(status) => Err(ProviderError::UnexpectedStatus {
                provider: "mock_search",
                status: *status,
                url: "mock://search".to_owned(),
            }),
        }
    }
}

/// Returns `"Body of <url>"` unless told otherwise for a specific URL.
#[derive(Default)]
pub(crate) struct MockExtractor {
    failing: HashSet<String>,
    empty: HashSet<String>,
    delays: HashMap<String, Duration>,
    pub calls: AtomicUsize,
}

impl MockExtractor {
    pub fn fail(mut self, url: String) -> Self {
        self.failing.insert(url);
        self
    }

    pub fn empty(mut self, url: String) -> Self {
        self.empty.insert(url);
        self
    }

    pub fn delay(mut self, url: String, by: Duration) -> Self {
        self.delays.insert(url, by);
        self
    }

    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl ExtractionProvider for MockExtractor {
    async fn extract_text(&self, url: &str) -> Result<ExtractedText, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(by) = self.delays.get(url) {
            tokio::time::sleep(*by).await;
        }
        if self.failing.contains(url) {
            return Err(ProviderError::NotArticle {
                url: url.to_owned(),
                reason: "mock failure".to_owned(),
            });
        }
        let body = if self.empty.contains(url) {
            String::new()
        } else {
            format!("Body of {url}")
        };
        Ok(ExtractedText {
            title: String::new(),
            author: None,
            body,
        })
    }
}

type Responder = Box<dyn Fn(&str) -> Result<String, ProviderError> + Send + Sync>;

/// Answers each prompt with `respond(prompt)`, optionally sleeping first when
/// the prompt mentions one of the configured needles.
pub(crate) struct MockModel {
    respond: Responder,
    delays: Vec<(String, Duration)>,
    pub calls: AtomicUsize,
}

impl MockModel {
    pub fn new(
        respond: impl Fn(&str) -> Result<String, ProviderError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            delays: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always returns a valid Bullish payload.
    pub fn healthy() -> Self {
        Self::new(|_| Ok(valid_payload("Bullish", 6)))
    }

    pub fn delay_when(mut self, needle: impl Into<String>, by: Duration) -> Self {
        self.delays.push((needle.into(), by));
        self
    }

    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl ModelProvider for MockModel {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some((_, by)) = self.delays.iter().find(|(needle, _)| prompt.contains(needle)) {
            tokio::time::sleep(*by).await;
        }
        (self.respond)(prompt)
    }
}
