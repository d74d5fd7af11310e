//! `analyze` command: run one request and print the report.

use chrono::Utc;
use marketpulse_core::AppConfig;
use marketpulse_sentiment::{AnalysisReport, RequestService, SentimentConfig, SentimentRecord};

const GAUGE_WIDTH: usize = 21;

/// Runs a single analysis and prints it to stdout.
///
/// # Errors
///
/// Returns an error if the providers cannot be built, the input is invalid,
/// or the search provider is unavailable.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    topic: &str,
    count: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let service = RequestService::from_config(&SentimentConfig::from_app_config(config))?;
    tracing::debug!(topic, count = ?count, "starting analysis");

    let report = service.analyze(topic, count).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text_report(&report));
    }
    Ok(())
}

/// Markdown-flavoured text rendering of a report.
pub(crate) fn render_text_report(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let now = Utc::now().format("%Y-%m-%d %H:%M UTC");
    let b = &report.breakdown;

    out.push_str(&format!("# Market Sentiment: {}\n\n", report.topic));
    out.push_str(&format!("**Generated**: {now}\n"));
    out.push_str(&format!(
        "**Articles**: {} of {} requested ({} tried, {} skipped)\n",
        report.returned, report.requested, report.attempted, report.skipped
    ));
    out.push_str(&format!(
        "**Bullish**: {} | **Neutral**: {} | **Bearish**: {}\n",
        b.bullish_total, b.neutral, b.bearish_total
    ));
    if report.partial {
        out.push_str("**Note**: time limit reached; showing articles finished in time\n");
    }
    out.push('\n');

    if report.records.is_empty() {
        out.push_str("No articles could be analyzed for this topic.\n");
        return out;
    }

    out.push_str("---\n");
    for (i, record) in report.records.iter().enumerate() {
        out.push('\n');
        render_record(&mut out, i + 1, record);
    }
    out
}

fn render_record(out: &mut String, position: usize, record: &SentimentRecord) {
    out.push_str(&format!("## {position}. {}\n", record.title));
    match &record.author {
        Some(author) => out.push_str(&format!("{} | by {author}\n", record.source_domain)),
        None => out.push_str(&format!("{}\n", record.source_domain)),
    }
    out.push_str(&format!(
        "**{}** ({}/10)  {}\n\n",
        record.label,
        record.confidence,
        gauge_bar(record.gauge_position)
    ));
    out.push_str(&format!("{}\n\n", record.summary));
    for insight in &record.insights {
        out.push_str(&format!("- {insight}\n"));
    }
    out.push_str(&format!("\n{}\n", record.url));
}

/// ASCII gauge from Very Bearish (left) to Very Bullish (right) with `|` at
/// neutral and `*` at `position`, which is clamped to `[-2.0, 2.0]`.
pub(crate) fn gauge_bar(position: f32) -> String {
    let clamped = if position.is_nan() {
        0.0
    } else {
        position.clamp(-2.0, 2.0)
    };
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let marker = (((clamped + 2.0) / 4.0) * (GAUGE_WIDTH - 1) as f32).round() as usize;
    let center = GAUGE_WIDTH / 2;

    let bar: String = (0..GAUGE_WIDTH)
        .map(|i| {
            if i == marker {
                '*'
            } else if i == center {
                '|'
            } else {
                '-'
            }
        })
        .collect();
    format!("[{bar}]")
}
