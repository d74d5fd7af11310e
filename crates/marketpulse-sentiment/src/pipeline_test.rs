use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::error::ProviderError;
use crate::providers::ModelProvider;
use crate::test_support::{
    test_settings, url, valid_payload, MockExtractor, MockModel, MockSearch,
};
use crate::types::{PipelineSettings, SentimentLabel};

fn pipeline_with(
    search: Arc<MockSearch>,
    model: Arc<dyn ModelProvider>,
    settings: PipelineSettings,
) -> AnalysisPipeline {
    let fetcher = ArticleFetcher::new(
        search,
        MockExtractor::default().build(),
        settings.clone(),
    );
    let extractor = SentimentExtractor::new(model, settings.clone());
    AnalysisPipeline::new(fetcher, extractor, settings.max_concurrency)
}

fn pipeline(n: usize, model: Arc<dyn ModelProvider>) -> AnalysisPipeline {
    pipeline_with(MockSearch::with_urls(n), model, test_settings())
}

fn assert_send<T: Send>(_: &T) {}

#[test]
fn run_futures_are_send() {
    let pipeline = pipeline(3, MockModel::healthy().build());
    let run = pipeline.run("gold", 2);
    assert_send(&run);
    let with_deadline = pipeline.run_with_deadline("gold", 2, None);
    assert_send(&with_deadline);
}

#[tokio::test]
async fn healthy_stack_returns_valid_records() {
    let out = pipeline(10, MockModel::healthy().build())
        .run("gold", 5)
        .await
        .expect("run");

    assert_eq!(out.requested, 5);
    assert_eq!(out.returned, 5);
    assert_eq!(out.records.len(), 5);
    assert_eq!(out.skipped, 0);
    assert!(!out.timed_out);
    for record in &out.records {
        assert!(SentimentLabel::ALL.contains(&record.label));
        assert!(record.confidence <= 10);
        assert!((2..=4).contains(&record.insights.len()));
    }
}

#[tokio::test]
async fn output_follows_fetch_order_despite_completion_order() {
    // A is slowest, C fastest.
    let model = MockModel::healthy()
        .delay_when(url(1), Duration::from_millis(120))
        .delay_when(url(2), Duration::from_millis(60))
        .build();
    let out = pipeline(3, model).run("gold", 3).await.expect("run");

    let urls: Vec<_> = out.records.iter().map(|r| r.url.clone()).collect();
    assert_eq!(urls, vec![url(1), url(2), url(3)]);
}

#[tokio::test]
async fn invalid_records_are_dropped_without_affecting_siblings() {
    let model = MockModel::new(|prompt| {
        if prompt.contains(&url(1)) {
            Ok(valid_payload("Moonshot", 5))
        } else if prompt.contains(&url(2)) {
            Ok(valid_payload("Bullish", 15))
        } else {
            Ok(valid_payload("Bearish", 3))
        }
    })
    .build();
    let out = pipeline(3, model).run("oil", 3).await.expect("run");

    assert_eq!(out.returned, 1);
    assert_eq!(out.records[0].url, url(3));
    assert_eq!(out.records[0].label, SentimentLabel::Bearish);
    assert_eq!(out.attempted, 3);
    assert_eq!(out.skipped, 2);
}

#[tokio::test]
async fn model_timing_out_everywhere_yields_empty_success() {
    let settings = PipelineSettings {
        model_timeout: Duration::from_millis(20),
        ..test_settings()
    };
    let model = MockModel::healthy()
        .delay_when("Body of", Duration::from_secs(5))
        .build();
    let out = pipeline_with(MockSearch::with_urls(10), model, settings)
        .run("Bitcoin", 5)
        .await
        .expect("run must succeed");

    assert_eq!(out.requested, 5);
    assert_eq!(out.returned, 0);
    assert!(out.records.is_empty());
    assert!(!out.timed_out);
}

#[tokio::test]
async fn model_outage_is_absorbed_as_skips() {
    let model = MockModel::new(|_| {
        Err(ProviderError::UnexpectedStatus {
            provider: "mock",
            status: 500,
            url: "mock://model".to_owned(),
        })
    })
    .build();
    let out = pipeline(4, model).run("gold", 4).await.expect("run");
    assert_eq!(out.returned, 0);
    assert_eq!(out.skipped, 4);
}

#[tokio::test]
async fn returned_never_exceeds_requested() {
    for count in [1, 3, 7] {
        let out = pipeline(4, MockModel::healthy().build())
            .run("gold", count)
            .await
            .expect("run");
        assert!(out.returned <= out.requested);
        assert!(out.returned <= count);
    }
}

#[tokio::test]
async fn deadline_returns_completed_records_only() {
    let model = MockModel::healthy()
        .delay_when(url(2), Duration::from_secs(10))
        .build();
    let deadline = Instant::now() + Duration::from_millis(200);
    let out = pipeline(3, model)
        .run_with_deadline("gold", 3, Some(deadline))
        .await
        .expect("partial run");

    assert!(out.timed_out);
    let urls: Vec<_> = out.records.iter().map(|r| r.url.clone()).collect();
    assert_eq!(urls, vec![url(1), url(3)]);
    assert_eq!(out.requested, 3);
    assert_eq!(out.skipped, 1);
}

#[tokio::test]
async fn search_outage_fails_the_run() {
    let err = pipeline_with(MockSearch::failing(502), MockModel::healthy().build(), test_settings())
        .run("gold", 3)
        .await
        .unwrap_err();
    assert!(matches!(err, SentimentError::SearchUnavailable(_)));
}

#[tokio::test]
async fn repeated_runs_share_record_shape() {
    let pipeline = pipeline(3, MockModel::healthy().build());
    let first = pipeline.run("gold", 2).await.expect("run");
    let second = pipeline.run("gold", 2).await.expect("run");

    let shape = |out: &PipelineOutput| {
        out.records
            .iter()
            .map(|r| serde_json::to_value(r).expect("serialize"))
            .map(|v| {
                let mut keys: Vec<String> =
                    v.as_object().expect("object").keys().cloned().collect();
                keys.sort();
                keys
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(shape(&first), shape(&second));
}
