use std::sync::atomic::Ordering;
use std::time::Duration;

use super::*;
use crate::test_support::{test_settings, url, MockExtractor, MockSearch};

fn fetcher(search: Arc<MockSearch>, extractor: Arc<MockExtractor>) -> ArticleFetcher {
    ArticleFetcher::new(search, extractor, test_settings())
}

#[test]
fn validate_request_rejects_blank_topic_and_zero_count() {
    let err = validate_request("   ", 5).unwrap_err();
    assert_eq!(err.field(), Some("topic"));

    let err = validate_request("gold", 0).unwrap_err();
    assert_eq!(err.field(), Some("count"));

    let err = validate_request(&"x".repeat(MAX_TOPIC_CHARS + 1), 5).unwrap_err();
    assert_eq!(err.field(), Some("topic"));

    assert_eq!(validate_request("  gold  ", 1).unwrap(), "gold");
}

#[tokio::test]
async fn fetch_returns_articles_in_search_order() {
    let extractor = MockExtractor::default()
        .delay(url(1), Duration::from_millis(60))
        .build();
    let fetcher = fetcher(MockSearch::with_urls(3), extractor);

    let outcome = fetcher.fetch("gold", 3).await.expect("fetch");
    let urls: Vec<_> = outcome.articles.iter().map(|a| a.url.clone()).collect();
    assert_eq!(urls, vec![url(1), url(2), url(3)]);
    assert_eq!(outcome.attempted, 3);
    assert_eq!(outcome.articles[0].source_domain, "news1.example.com");
    assert_eq!(outcome.articles[0].title, "Story 1");
}

#[tokio::test]
async fn fetch_skips_failed_and_empty_candidates_and_uses_overfetch() {
    let extractor = MockExtractor::default()
        .fail(url(1))
        .empty(url(2))
        .build();
    // count 2 at 150 % over-fetch asks for 3 hits; 2 of them are unusable.
    let search = MockSearch::with_urls(10);
    let fetcher = fetcher(Arc::clone(&search), extractor);

    let outcome = fetcher.fetch("oil", 2).await.expect("fetch");
    assert_eq!(outcome.articles.len(), 1);
    assert_eq!(outcome.articles[0].url, url(3));
    assert_eq!(outcome.attempted, 3);
}

#[tokio::test]
async fn fetch_stops_once_enough_articles_are_collected() {
    let settings = PipelineSettings {
        max_concurrency: 1,
        ..test_settings()
    };
    let extractor = MockExtractor::default().build();
    let fetcher = ArticleFetcher::new(
        MockSearch::with_urls(10),
        Arc::clone(&extractor) as Arc<dyn ExtractionProvider>,
        settings,
    );

    let outcome = fetcher.fetch("gold", 2).await.expect("fetch");
    assert_eq!(outcome.articles.len(), 2);
    assert_eq!(outcome.attempted, 2);
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn fetch_clamps_count_to_max_articles() {
    let settings = PipelineSettings {
        max_articles: 3,
        ..test_settings()
    };
    let fetcher = ArticleFetcher::new(
        MockSearch::with_urls(50),
        MockExtractor::default().build(),
        settings,
    );

    let outcome = fetcher.fetch("gold", 40).await.expect("fetch");
    assert_eq!(outcome.articles.len(), 3);
}

#[tokio::test]
async fn slow_extraction_times_out_and_is_skipped() {
    let settings = PipelineSettings {
        extract_timeout: Duration::from_millis(50),
        ..test_settings()
    };
    let extractor = MockExtractor::default()
        .delay(url(1), Duration::from_secs(5))
        .build();
    let fetcher = ArticleFetcher::new(MockSearch::with_urls(2), extractor, settings);

    let outcome = fetcher.fetch("gold", 2).await.expect("fetch");
    assert_eq!(outcome.articles.len(), 1);
    assert_eq!(outcome.articles[0].url, url(2));
    assert_eq!(outcome.attempted, 2);
}

#[tokio::test]
async fn duplicate_search_hits_are_extracted_once() {
    let hit = SearchResult {
        url: url(1),
        title: "Same".to_owned(),
        description: String::new(),
    };
    let extractor = MockExtractor::default().build();
    let fetcher = ArticleFetcher::new(
        MockSearch::with_results(vec![hit.clone(), hit]),
        Arc::clone(&extractor) as Arc<dyn ExtractionProvider>,
        test_settings(),
    );

    let outcome = fetcher.fetch("gold", 2).await.expect("fetch");
    assert_eq!(outcome.articles.len(), 1);
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn search_failure_is_fatal_after_retry() {
    let search = MockSearch::failing(503);
    let fetcher = fetcher(Arc::clone(&search), MockExtractor::default().build());

    let err = fetcher.fetch("gold", 3).await.unwrap_err();
    assert!(matches!(err, SentimentError::SearchUnavailable(_)));
    // one retry on a transient status
    assert_eq!(search.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn search_retries_follow_their_own_budget() {
    let settings = PipelineSettings {
        search_max_retries: 0,
        model_max_retries: 3,
        ..test_settings()
    };
    let search = MockSearch::failing(503);
    let fetcher = ArticleFetcher::new(
        Arc::clone(&search) as Arc<dyn SearchProvider>,
        MockExtractor::default().build(),
        settings,
    );

    let err = fetcher.fetch("gold", 3).await.unwrap_err();
    assert!(matches!(err, SentimentError::SearchUnavailable(_)));
    assert_eq!(search.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_search_is_not_an_error() {
    let fetcher = fetcher(MockSearch::with_urls(0), MockExtractor::default().build());
    let outcome = fetcher.fetch("obscure", 3).await.expect("fetch");
    assert!(outcome.articles.is_empty());
    assert_eq!(outcome.attempted, 0);
}

#[tokio::test]
async fn invalid_input_never_reaches_search() {
    let search = MockSearch::with_urls(3);
    let fetcher = fetcher(Arc::clone(&search), MockExtractor::default().build());

    assert!(matches!(
        fetcher.fetch("", 5).await,
        Err(SentimentError::InvalidInput { field: "topic", .. })
    ));
    assert_eq!(search.calls.load(Ordering::SeqCst), 0);
}
