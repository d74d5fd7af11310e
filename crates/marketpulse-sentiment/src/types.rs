use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use marketpulse_core::AppConfig;
use reqwest::Url;
use serde::Serialize;

use crate::error::ParseError;

/// One candidate returned by the search provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub url: String,
    /// May be empty.
    pub title: String,
    /// Snippet shown by the search provider. May be empty.
    pub description: String,
}

/// Readable text pulled out of an article page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    pub title: String,
    pub author: Option<String>,
    pub body: String,
}

/// An article ready for sentiment extraction. Always has a non-blank body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub url: String,
    pub title: String,
    pub description: String,
    pub author: Option<String>,
    pub body: String,
    pub source_domain: String,
}

impl Article {
    /// Combine a search hit with its extracted text.
    ///
    /// Returns `None` when the body is blank after trimming; such candidates are
    /// skipped rather than sent to the model. The search title wins over the
    /// page title unless it is empty.
    #[must_use]
    pub fn from_parts(result: SearchResult, text: ExtractedText) -> Option<Self> {
        let body = text.body.trim();
        if body.is_empty() {
            return None;
        }

        let title = if result.title.trim().is_empty() {
            text.title.trim().to_string()
        } else {
            result.title.trim().to_string()
        };

        Some(Self {
            source_domain: source_domain(&result.url),
            url: result.url,
            title,
            description: result.description.trim().to_string(),
            author: text.author.filter(|a| !a.trim().is_empty()),
            body: body.to_string(),
        })
    }
}

/// Host of `url` without a leading `www.`, or `"unknown"` if it has none.
#[must_use]
pub fn source_domain(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .map_or_else(
            || "unknown".to_string(),
            |host| host.strip_prefix("www.").unwrap_or(&host).to_string(),
        )
}

/// The closed set of market-sentiment classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SentimentLabel {
    VeryBullish,
    Bullish,
    Neutral,
    Bearish,
    VeryBearish,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 5] = [
        SentimentLabel::VeryBullish,
        SentimentLabel::Bullish,
        SentimentLabel::Neutral,
        SentimentLabel::Bearish,
        SentimentLabel::VeryBearish,
    ];

    /// Human spelling, as used in the prompt.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            SentimentLabel::VeryBullish => "Very Bullish",
            SentimentLabel::Bullish => "Bullish",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Bearish => "Bearish",
            SentimentLabel::VeryBearish => "Very Bearish",
        }
    }

    /// Position on the bearish-to-bullish axis, `-2..=2`.
    #[must_use]
    pub fn polarity(self) -> i8 {
        match self {
            SentimentLabel::VeryBullish => 2,
            SentimentLabel::Bullish => 1,
            SentimentLabel::Neutral => 0,
            SentimentLabel::Bearish => -1,
            SentimentLabel::VeryBearish => -2,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for SentimentLabel {
    type Err = ParseError;

    /// Accepts `Very Bullish`, `VeryBullish`, `very_bullish`, `very-bullish`
    /// and so on, case-insensitively. Anything else is rejected.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let folded: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        match folded.as_str() {
            "verybullish" => Ok(SentimentLabel::VeryBullish),
            "bullish" => Ok(SentimentLabel::Bullish),
            "neutral" => Ok(SentimentLabel::Neutral),
            "bearish" => Ok(SentimentLabel::Bearish),
            "verybearish" => Ok(SentimentLabel::VeryBearish),
            _ => Err(ParseError::InvalidLabel(raw.to_string())),
        }
    }
}

/// A validated sentiment classification of one article.
///
/// Only the response parser constructs these, so every instance satisfies:
/// confidence in `0..=10`, a non-empty bounded summary and 2 to 4 non-empty
/// insights.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentRecord {
    pub url: String,
    pub title: String,
    pub source_domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub label: SentimentLabel,
    pub confidence: u8,
    /// `polarity × confidence / 10`, in `[-2.0, 2.0]`.
    pub gauge_position: f32,
    pub summary: String,
    pub insights: Vec<String>,
}

impl SentimentRecord {
    pub(crate) fn new(
        article: &Article,
        label: SentimentLabel,
        confidence: u8,
        summary: String,
        insights: Vec<String>,
    ) -> Self {
        Self {
            url: article.url.clone(),
            title: article.title.clone(),
            source_domain: article.source_domain.clone(),
            author: article.author.clone(),
            label,
            confidence,
            gauge_position: f32::from(label.polarity()) * f32::from(confidence) / 10.0,
            summary,
            insights,
        }
    }
}

/// Per-label counts across a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentBreakdown {
    pub very_bullish: usize,
    pub bullish: usize,
    pub neutral: usize,
    pub bearish: usize,
    pub very_bearish: usize,
    /// `very_bullish + bullish`.
    pub bullish_total: usize,
    /// `very_bearish + bearish`.
    pub bearish_total: usize,
}

impl SentimentBreakdown {
    #[must_use]
    pub fn from_records(records: &[SentimentRecord]) -> Self {
        let mut breakdown = Self::default();
        for record in records {
            match record.label {
                SentimentLabel::VeryBullish => breakdown.very_bullish += 1,
                SentimentLabel::Bullish => breakdown.bullish += 1,
                SentimentLabel::Neutral => breakdown.neutral += 1,
                SentimentLabel::Bearish => breakdown.bearish += 1,
                SentimentLabel::VeryBearish => breakdown.very_bearish += 1,
            }
        }
        breakdown.bullish_total = breakdown.very_bullish + breakdown.bullish;
        breakdown.bearish_total = breakdown.very_bearish + breakdown.bearish;
        breakdown
    }
}

/// Result of one analyze call.
///
/// `returned < requested` is a normal outcome: articles may have been skipped,
/// or the request deadline may have fired (`partial`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub topic: String,
    pub requested: usize,
    pub returned: usize,
    pub partial: bool,
    /// Search candidates the fetcher tried to extract.
    pub attempted: usize,
    /// Candidates that did not produce a record.
    pub skipped: usize,
    pub breakdown: SentimentBreakdown,
    pub records: Vec<SentimentRecord>,
}

/// Tunables for fetching, extraction and the overall request.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub default_articles: usize,
    pub max_articles: usize,
    /// Search over-fetch as a percentage of the requested count (150 = 1.5×).
    pub search_overfetch_percent: usize,
    pub search_timeout: Duration,
    pub extract_timeout: Duration,
    pub model_timeout: Duration,
    pub search_max_retries: u32,
    pub model_max_retries: u32,
    pub retry_backoff_ms: u64,
    pub request_timeout: Duration,
    pub max_concurrency: usize,
    pub prompt_max_chars: usize,
    pub summary_max_chars: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            default_articles: 5,
            max_articles: 20,
            search_overfetch_percent: 150,
            search_timeout: Duration::from_secs(10),
            extract_timeout: Duration::from_secs(12),
            model_timeout: Duration::from_secs(30),
            search_max_retries: 1,
            model_max_retries: 1,
            retry_backoff_ms: 500,
            request_timeout: Duration::from_secs(90),
            max_concurrency: 4,
            prompt_max_chars: 12_000,
            summary_max_chars: 1_000,
        }
    }
}

/// Provider credentials and endpoints plus [`PipelineSettings`].
#[derive(Clone)]
pub struct SentimentConfig {
    pub brave_api_key: String,
    pub brave_base_url: String,
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub user_agent: String,
    pub settings: PipelineSettings,
}

impl SentimentConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            brave_api_key: config.brave_api_key.clone(),
            brave_base_url: config.brave_base_url.clone(),
            gemini_api_key: config.gemini_api_key.clone(),
            gemini_base_url: config.gemini_base_url.clone(),
            gemini_model: config.gemini_model.clone(),
            user_agent: config.user_agent.clone(),
            settings: PipelineSettings {
                default_articles: config.default_articles,
                max_articles: config.max_articles,
                search_overfetch_percent: config.search_overfetch_percent,
                search_timeout: Duration::from_secs(config.search_timeout_secs),
                extract_timeout: Duration::from_secs(config.extract_timeout_secs),
                model_timeout: Duration::from_secs(config.model_timeout_secs),
                search_max_retries: config.search_max_retries,
                model_max_retries: config.model_max_retries,
                retry_backoff_ms: config.retry_backoff_ms,
                request_timeout: Duration::from_secs(config.request_timeout_secs),
                max_concurrency: config.max_concurrency,
                prompt_max_chars: config.prompt_max_chars,
                summary_max_chars: config.summary_max_chars,
            },
        }
    }
}

impl fmt::Debug for SentimentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentimentConfig")
            .field("brave_api_key", &"[redacted]")
            .field("brave_base_url", &self.brave_base_url)
            .field("gemini_api_key", &"[redacted]")
            .field("gemini_base_url", &self.gemini_base_url)
            .field("gemini_model", &self.gemini_model)
            .field("user_agent", &self.user_agent)
            .field("settings", &self.settings)
            .finish()
    }
}
