//! Boundaries to the third-party collaborators.
//!
//! The pipeline only talks to these traits. [`crate::BraveSearchClient`],
//! [`crate::HtmlArticleExtractor`] and [`crate::GeminiClient`] are the HTTP
//! implementations.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::{ExtractedText, SearchResult};

/// Finds candidate news articles for a query.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, ProviderError>;
}

/// Turns an article URL into readable text.
#[async_trait]
pub trait ExtractionProvider: Send + Sync {
    async fn extract_text(&self, url: &str) -> Result<ExtractedText, ProviderError>;
}

/// Runs a prompt through a language model and returns its raw text.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}
