//! JSON-LD structured data lookup for article body and byline.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::html::clean_text;

static JSON_LD_SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("valid regex")
});

/// What the page's article node(s) declare about themselves.
#[derive(Debug, Default)]
pub(super) struct StructuredArticle {
    pub headline: Option<String>,
    pub author: Option<String>,
    pub body: Option<String>,
}

/// Scans every `application/ld+json` block and keeps the article node with
/// the longest `articleBody`. Blocks that fail to parse are ignored.
pub(super) fn find_structured_article(page: &str) -> StructuredArticle {
    let mut nodes = Vec::new();
    for cap in JSON_LD_SCRIPT_RE.captures_iter(page) {
        let raw = cap.get(1).map_or("", |m| m.as_str()).trim();
        if raw.is_empty() {
            continue;
        }
        let Ok(value) = serde_json::from_str::<Value>(raw) else {
            continue;
        };
        collect_article_nodes(&value, &mut nodes);
    }

    nodes
        .into_iter()
        .max_by_key(|n| n.body.as_ref().map_or(0, String::len))
        .unwrap_or_default()
}

fn collect_article_nodes(value: &Value, out: &mut Vec<StructuredArticle>) {
    match value {
        Value::Object(map) => {
            if looks_like_article_node(map.get("@type")) {
                out.push(StructuredArticle {
                    headline: non_empty(
                        map.get("headline")
                            .or_else(|| map.get("name"))
                            .and_then(Value::as_str)
                            .map(clean_text),
                    ),
                    author: map.get("author").and_then(author_name),
                    body: non_empty(map.get("articleBody").and_then(Value::as_str).map(clean_text)),
                });
            }
            for child in map.values() {
                collect_article_nodes(child, out);
            }
        }
        Value::Array(items) => {
            for child in items {
                collect_article_nodes(child, out);
            }
        }
        _ => {}
    }
}

/// `author` may be a string, a `Person` object, or a list of either.
fn author_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(Some(clean_text(s))),
        Value::Object(map) => non_empty(map.get("name").and_then(Value::as_str).map(clean_text)),
        Value::Array(items) => {
            let names: Vec<String> = items.iter().filter_map(author_name).collect();
            if names.is_empty() {
                None
            } else {
                Some(names.join(", "))
            }
        }
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn contains_article_token(value: &str) -> bool {
    let lower = value.to_lowercase();
    lower.contains("article") || lower.contains("blogposting") || lower.contains("report")
}

fn looks_like_article_node(node_type: Option<&Value>) -> bool {
    match node_type {
        Some(Value::String(s)) => contains_article_token(s),
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(Value::as_str)
            .any(contains_article_token),
        _ => false,
    }
}
