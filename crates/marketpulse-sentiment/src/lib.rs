//! News sentiment analysis pipeline for MarketPulse.
//!
//! Searches Brave news for a topic, extracts article text, asks Gemini to
//! classify each article's market sentiment, and returns only records that
//! pass strict schema validation. Per-article failures are skipped; only bad
//! input or a search outage fails a request.

pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod gemini;
pub mod parse;
pub mod pipeline;
pub mod prompt;
pub mod providers;
pub mod service;
pub mod types;

mod retry;
mod sources;

#[cfg(test)]
mod test_support;

pub use error::{ParseError, ProviderError, SentimentError};
pub use extractor::SentimentExtractor;
pub use fetcher::{validate_request, ArticleFetcher, FetchOutcome};
pub use gemini::GeminiClient;
pub use parse::parse_sentiment_response;
pub use pipeline::{AnalysisPipeline, PipelineOutput};
pub use prompt::build_prompt;
pub use providers::{ExtractionProvider, ModelProvider, SearchProvider};
pub use service::RequestService;
pub use sources::{BraveSearchClient, HtmlArticleExtractor};
pub use types::{
    source_domain, AnalysisReport, Article, ExtractedText, PipelineSettings, SearchResult,
    SentimentBreakdown, SentimentConfig, SentimentLabel, SentimentRecord,
};
