//! Brave Search news API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::ProviderError;
use crate::providers::SearchProvider;
use crate::types::SearchResult;

use super::article::clean_text;
use super::{build_http_client, check_status};

const PROVIDER: &str = "brave_search";
const DEFAULT_BASE_URL: &str = "https://api.search.brave.com/";
const NEWS_SEARCH_PATH: &str = "res/v1/news/search";
/// Brave caps news results per call.
const MAX_RESULTS_PER_CALL: usize = 50;

#[derive(Debug, Deserialize)]
struct NewsSearchResponse {
    #[serde(default)]
    results: Vec<NewsSearchItem>,
}

#[derive(Debug, Deserialize)]
struct NewsSearchItem {
    url: Option<String>,
    title: Option<String>,
    description: Option<String>,
}

/// Client for the Brave news search endpoint.
///
/// Use [`BraveSearchClient::new`] for production or
/// [`BraveSearchClient::with_base_url`] to point at a mock server in tests.
pub struct BraveSearchClient {
    client: Client,
    api_key: String,
    endpoint: Url,
}

impl BraveSearchClient {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, timeout: Duration, user_agent: &str) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, timeout, user_agent, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ProviderError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout: Duration,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        let client = build_http_client(timeout, user_agent)?;

        // Exactly one trailing slash, so `join` appends rather than replaces.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join(NEWS_SEARCH_PATH))
            .map_err(|e| ProviderError::InvalidBaseUrl {
                provider: PROVIDER,
                reason: format!("'{base_url}': {e}"),
            })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint,
        })
    }

    fn build_url(&self, query: &str, count: usize) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("count", &count.to_string())
            .append_pair("result_filter", "news")
            .append_pair("search_lang", "en");
        url
    }
}

#[async_trait]
impl SearchProvider for BraveSearchClient {
    /// Returns at most `limit` results (and never more than Brave's per-call
    /// cap). Items without a URL are dropped; titles and descriptions have
    /// Brave's highlight markup stripped.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, ProviderError> {
        let count = limit.clamp(1, MAX_RESULTS_PER_CALL);
        let url = self.build_url(query, count);

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .send()
            .await?;
        check_status(PROVIDER, &response)?;

        let body = response.text().await?;
        let parsed: NewsSearchResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
                context: format!("news search for \"{query}\""),
                source: e,
            })?;

        let results = parsed
            .results
            .into_iter()
            .filter_map(|item| {
                let url = item.url?.trim().to_string();
                if url.is_empty() {
                    return None;
                }
                Some(SearchResult {
                    url,
                    title: item.title.as_deref().map(clean_text).unwrap_or_default(),
                    description: item
                        .description
                        .as_deref()
                        .map(clean_text)
                        .unwrap_or_default(),
                })
            })
            .take(count)
            .collect();

        Ok(results)
    }
}
