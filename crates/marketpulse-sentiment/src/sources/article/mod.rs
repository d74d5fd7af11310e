//! Fetches an article page and reduces it to readable text.

mod html;
mod jsonld;

pub(crate) use html::clean_text;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::ProviderError;
use crate::providers::ExtractionProvider;
use crate::types::ExtractedText;

use super::{build_http_client, check_status};

const PROVIDER: &str = "article_fetch";

/// Plain-HTTP extractor: downloads the page and pulls title, author and body
/// out of the markup (JSON-LD first, `<p>` paragraphs as a fallback).
pub struct HtmlArticleExtractor {
    client: Client,
}

impl HtmlArticleExtractor {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_http_client(timeout, user_agent)?,
        })
    }
}

#[async_trait]
impl ExtractionProvider for HtmlArticleExtractor {
    async fn extract_text(&self, url: &str) -> Result<ExtractedText, ProviderError> {
        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml;q=0.9,*/*;q=0.5",
            )
            .send()
            .await?;
        check_status(PROVIDER, &response)?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        if !content_type.is_empty() && !content_type.contains("html") {
            return Err(ProviderError::NotArticle {
                url: url.to_owned(),
                reason: format!("content type {content_type}"),
            });
        }

        let page = response.text().await?;
        let extracted = html::extract_article(&page);
        if extracted.body.is_empty() {
            return Err(ProviderError::NotArticle {
                url: url.to_owned(),
                reason: "no readable body text".to_owned(),
            });
        }

        tracing::debug!(
            url,
            body_chars = extracted.body.chars().count(),
            has_author = extracted.author.is_some(),
            "article text extracted"
        );
        Ok(extracted)
    }
}
