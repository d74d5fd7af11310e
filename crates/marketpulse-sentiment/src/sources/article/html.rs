//! Regex-based HTML reduction for article pages.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::types::ExtractedText;

use super::jsonld::find_structured_article;

/// Paragraphs shorter than this are navigation crumbs, captions or bylines.
const MIN_PARAGRAPH_CHARS: usize = 40;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<[^>]+>").expect("valid regex"));
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});").expect("valid regex")
});
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"));
static H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").expect("valid regex"));
static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<p(?:\s[^>]*)?>(.*?)</p>").expect("valid regex"));

/// Elements whose contents never belong to the article body. The regex crate
/// has no back-references, so each tag gets its own pattern.
static BOILERPLATE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["script", "style", "noscript", "nav", "header", "footer", "aside", "form"]
        .iter()
        .map(|tag| Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}>")).expect("valid regex"))
        .collect()
});

/// Builds a pair of `<meta>` patterns for `attr="key"` since `content` may
/// come before or after it.
fn meta_patterns(attr: &str, key: &str) -> [Regex; 2] {
    [
        Regex::new(&format!(
            r#"(?is)<meta[^>]+{attr}\s*=\s*["']{key}["'][^>]+content\s*=\s*["'](.*?)["'][^>]*>"#
        ))
        .expect("valid regex"),
        Regex::new(&format!(
            r#"(?is)<meta[^>]+content\s*=\s*["'](.*?)["'][^>]+{attr}\s*=\s*["']{key}["'][^>]*>"#
        ))
        .expect("valid regex"),
    ]
}

static OG_TITLE_RES: LazyLock<[Regex; 2]> = LazyLock::new(|| meta_patterns("property", "og:title"));
static META_AUTHOR_RES: LazyLock<[Regex; 2]> = LazyLock::new(|| meta_patterns("name", "author"));

/// Reduces a full HTML page to title, author and body text.
///
/// An empty `body` means nothing article-like was found.
pub(super) fn extract_article(page: &str) -> ExtractedText {
    let structured = find_structured_article(page);

    let title = first_match(&*OG_TITLE_RES, page)
        .or_else(|| first_capture(&TITLE_RE, page))
        .or_else(|| first_capture(&H1_RE, page))
        .or(structured.headline)
        .unwrap_or_default();

    let author = first_match(&*META_AUTHOR_RES, page).or(structured.author);

    let body = structured
        .body
        .unwrap_or_else(|| paragraph_text(&strip_boilerplate(page)));

    ExtractedText {
        title,
        author,
        body,
    }
}

fn first_match(patterns: &[Regex], page: &str) -> Option<String> {
    patterns.iter().find_map(|re| first_capture(re, page))
}

fn first_capture(re: &Regex, page: &str) -> Option<String> {
    re.captures(page)
        .and_then(|cap| cap.get(1).map(|m| clean_text(m.as_str())))
        .filter(|s| !s.is_empty())
}

fn strip_boilerplate(page: &str) -> String {
    BOILERPLATE_RES
        .iter()
        .fold(page.to_owned(), |acc, re| re.replace_all(&acc, " ").into_owned())
}

fn paragraph_text(page: &str) -> String {
    PARAGRAPH_RE
        .captures_iter(page)
        .filter_map(|cap| cap.get(1).map(|m| clean_text(m.as_str())))
        .filter(|p| p.chars().count() >= MIN_PARAGRAPH_CHARS)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Strips tags, decodes entities and collapses whitespace.
pub(crate) fn clean_text(input: &str) -> String {
    let no_tags = TAG_RE.replace_all(input, " ");
    let decoded = decode_entities(&no_tags);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(input: &str) -> String {
    ENTITY_RE
        .replace_all(input, |cap: &Captures<'_>| {
            let entity = &cap[1];
            decode_entity(entity).map_or_else(|| cap[0].to_owned(), String::from)
        })
        .into_owned()
}

fn decode_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity
        .strip_prefix("#x")
        .or_else(|| entity.strip_prefix("#X"))
    {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }
    if let Some(dec) = entity.strip_prefix('#') {
        return dec.parse::<u32>().ok().and_then(char::from_u32);
    }
    let ch = match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "hellip" => '\u{2026}',
        _ => return None,
    };
    Some(ch)
}
