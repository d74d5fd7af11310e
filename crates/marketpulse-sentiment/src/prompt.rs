//! Prompt template for per-article sentiment classification.

use crate::types::{Article, SentimentLabel};

/// Marker appended to a body that was cut to fit the prompt budget.
const TRUNCATION_MARKER: &str = " [...]";

/// Builds the classification prompt for one article.
///
/// The output depends only on `article` and `body_max_chars`, so identical
/// inputs always produce identical prompts. The body is cut on a char
/// boundary once it exceeds `body_max_chars`.
#[must_use]
pub fn build_prompt(article: &Article, body_max_chars: usize) -> String {
    let labels = SentimentLabel::ALL
        .iter()
        .map(|l| format!("\"{}\"", l.display_name()))
        .collect::<Vec<_>>()
        .join(", ");

    let mut prompt = String::with_capacity(body_max_chars.min(article.body.len()) + 1_024);
    prompt.push_str(
        "You are a financial news analyst. Read the article below and assess the market \
         sentiment it expresses toward the assets, companies or sectors it discusses.\n\n",
    );
    prompt.push_str(&format!("Title: {}\n", article.title));
    if !article.description.is_empty() {
        prompt.push_str(&format!("Description: {}\n", article.description));
    }
    prompt.push_str(&format!("Source: {}\n", article.url));
    prompt.push_str("\nArticle text:\n");
    prompt.push_str(&truncate_chars(&article.body, body_max_chars));
    prompt.push_str("\n\n");

    prompt.push_str(&format!(
        "Respond with a single JSON object and nothing else, using exactly these keys:\n\
         {{\"sentiment\": one of [{labels}], \
         \"confidence\": an integer from 0 to 10, \
         \"summary\": a 2-3 sentence summary of the article, \
         \"insights\": an array of 2 to 4 short key takeaways}}\n"
    ));
    prompt
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &text[..cut]),
        None => text.to_owned(),
    }
}
