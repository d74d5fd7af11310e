//! Turns free-form model output into a validated [`SentimentRecord`].
//!
//! Parsing is strict: a payload that cannot be located, does not decode, or
//! breaks any schema rule is rejected as a whole. Nothing is defaulted or
//! patched.

use serde::Deserialize;

use crate::error::ParseError;
use crate::types::{Article, SentimentLabel, SentimentRecord};

const MAX_CONFIDENCE: u64 = 10;
const MIN_INSIGHTS: usize = 2;
const MAX_INSIGHTS: usize = 4;

#[derive(Debug, Deserialize)]
struct RawPayload {
    #[serde(alias = "label")]
    sentiment: String,
    confidence: serde_json::Number,
    summary: String,
    #[serde(alias = "key_insights", alias = "keyInsights")]
    insights: Vec<String>,
}

/// Locates, decodes and validates the sentiment payload in `raw`.
///
/// # Errors
///
/// Returns the first [`ParseError`] the payload trips over.
pub fn parse_sentiment_response(
    raw: &str,
    article: &Article,
    summary_max_chars: usize,
) -> Result<SentimentRecord, ParseError> {
    let json = locate_json_object(raw).ok_or(ParseError::PayloadNotFound)?;
    let payload: RawPayload = serde_json::from_str(json)?;

    let label: SentimentLabel = payload.sentiment.parse()?;

    let confidence = payload
        .confidence
        .as_u64()
        .filter(|c| *c <= MAX_CONFIDENCE)
        .and_then(|c| u8::try_from(c).ok())
        .ok_or_else(|| ParseError::ConfidenceOutOfRange(payload.confidence.to_string()))?;

    let summary = payload.summary.trim().to_string();
    if summary.is_empty() {
        return Err(ParseError::EmptySummary);
    }
    let summary_len = summary.chars().count();
    if summary_len > summary_max_chars {
        return Err(ParseError::SummaryTooLong {
            len: summary_len,
            max: summary_max_chars,
        });
    }

    if !(MIN_INSIGHTS..=MAX_INSIGHTS).contains(&payload.insights.len()) {
        return Err(ParseError::InsightCount(payload.insights.len()));
    }
    let insights = payload
        .insights
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Err(ParseError::EmptyInsight(i + 1))
            } else {
                Ok(trimmed.to_string())
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SentimentRecord::new(
        article, label, confidence, summary, insights,
    ))
}

/// Finds the first balanced `{...}` span that parses as a JSON object.
///
/// Markdown code fences are ignored and braces inside string literals do not
/// count toward nesting.
fn locate_json_object(raw: &str) -> Option<&str> {
    let text = strip_code_fence(raw);

    for (start, _) in text.match_indices('{') {
        let Some(end) = matching_brace(&text[start..]) else {
            continue;
        };
        let candidate = &text[start..start + end];
        if serde_json::from_str::<serde_json::Value>(candidate).is_ok_and(|v| v.is_object()) {
            return Some(candidate);
        }
    }
    None
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`) on the opening fence line.
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.rsplit_once("```").map_or(body, |(inner, _)| inner).trim()
}

/// Byte length of the balanced object that starts at `text[0] == '{'`.
fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
