//! Google Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::providers::ModelProvider;
use crate::sources::{build_http_client, check_status};

const PROVIDER: &str = "gemini";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";
const TEMPERATURE: f32 = 0.2;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Text-only Gemini client. The API key travels in the `x-goog-api-key`
/// header so it never appears in logged URLs.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: Url,
}

impl GeminiClient {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        api_key: &str,
        model: &str,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, model, timeout, user_agent, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ProviderError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout: Duration,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        let client = build_http_client(timeout, user_agent)?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join(&format!("v1beta/models/{model}:generateContent")))
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
}

#[async_trait]
impl ModelProvider for GeminiClient {
    /// Returns the concatenated text parts of the first candidate.
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;
        check_status(PROVIDER, &response)?;

        let body = response.text().await?;
        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
                context: "gemini generateContent".to_owned(),
                source: e,
            })?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse(PROVIDER));
        }
        Ok(text)
    }
}
