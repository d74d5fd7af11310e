//! HTTP implementations of the search and extraction providers.

mod article;
mod brave;

pub use article::HtmlArticleExtractor;
pub use brave::BraveSearchClient;

use std::time::Duration;

use crate::error::ProviderError;

/// Turn a 429 / non-2xx response into the matching [`ProviderError`].
pub(crate) fn check_status(
    provider: &'static str,
    response: &reqwest::Response,
) -> Result<(), ProviderError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(ProviderError::RateLimited {
            provider,
            retry_after_secs,
        });
    }

    if !status.is_success() {
        return Err(ProviderError::UnexpectedStatus {
            provider,
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }

    Ok(())
}

/// Shared `reqwest::Client` construction for all providers.
pub(crate) fn build_http_client(
    timeout: Duration,
    user_agent: &str,
) -> Result<reqwest::Client, ProviderError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10).min(timeout))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}
