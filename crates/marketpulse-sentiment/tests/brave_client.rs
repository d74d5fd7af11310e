//! Integration tests for `BraveSearchClient` using wiremock HTTP mocks.

use std::time::Duration;

use marketpulse_sentiment::{BraveSearchClient, ProviderError, SearchProvider};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> BraveSearchClient {
    BraveSearchClient::with_base_url("test-key", Duration::from_secs(5), "test/0.1", base_url)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn search_returns_cleaned_results() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "type": "news",
        "results": [
            {
                "url": "https://www.reuters.com/markets/gold-1",
                "title": "<strong>Gold</strong> hits record",
                "description": "Bullion rose &amp; miners rallied"
            },
            { "title": "no url, dropped" },
            {
                "url": "https://www.cnbc.com/gold-2",
                "title": "Gold steady"
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/res/v1/news/search"))
        .and(query_param("q", "gold"))
        .and(query_param("count", "5"))
        .and(query_param("result_filter", "news"))
        .and(header("X-Subscription-Token", "test-key"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let results = client.search("gold", 5).await.expect("should parse results");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].url, "https://www.reuters.com/markets/gold-1");
    assert_eq!(results[0].title, "Gold hits record");
    assert_eq!(results[0].description, "Bullion rose & miners rallied");
    assert_eq!(results[1].title, "Gold steady");
    assert!(results[1].description.is_empty());
}

#[tokio::test]
async fn search_caps_count_at_provider_maximum() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("count", "50"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let results = client.search("oil", 500).await.expect("empty results are fine");
    assert!(results.is_empty());
}

#[tokio::test]
async fn missing_results_field_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "type": "news" })),
        )
        .mount(&server)
        .await;

    let results = test_client(&server.uri())
        .search("oil", 3)
        .await
        .expect("should tolerate missing results");
    assert!(results.is_empty());
}

#[tokio::test]
async fn rate_limit_maps_to_rate_limited_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .search("gold", 3)
        .await
        .expect_err("429 should fail");
    assert!(matches!(
        err,
        ProviderError::RateLimited {
            retry_after_secs: 7,
            ..
        }
    ));
    assert!(err.is_retriable());
}

#[tokio::test]
async fn unauthorized_is_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .search("gold", 3)
        .await
        .expect_err("401 should fail");
    assert!(matches!(
        err,
        ProviderError::UnexpectedStatus { status: 401, .. }
    ));
    assert!(!err.is_retriable());
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .search("gold", 3)
        .await
        .expect_err("html body should fail");
    assert!(matches!(err, ProviderError::Deserialize { .. }));
}
