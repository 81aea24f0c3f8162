use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;
use zahri_types::{Location, MatchType, WordSearch};

use crate::normalize::normalize_apostrophes;

/// Context tokens on each side of a hit for corpus-wide search.
pub const CORPUS_CONTEXT_PADDING: usize = 10;
/// Context tokens on each side of a hit for single-article snippets.
pub const SNIPPET_PADDING: usize = 5;

static MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--.*?-->|</?[A-Za-z][^<>]*>").expect("markup pattern is valid")
});

/// Remove HTML comments and tags, leaving their text content.
pub fn strip_tags(text: &str) -> Cow<'_, str> {
    MARKUP.replace_all(text, "")
}

/// Split text on Unicode word boundaries. Punctuation marks become their own
/// tokens; whitespace is dropped.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_word_bounds()
        .filter(|token| !token.chars().all(char::is_whitespace))
        .collect()
}

/// Find `query` among the tokens of `raw`.
///
/// Markup is stripped and apostrophe variants are unified in both text and
/// query before matching. A token equal to the lowercased query is an exact
/// hit; a token merely containing it is a partial hit. Each hit carries up to
/// `padding` tokens of context per side. Exact hits are listed before partial
/// ones, otherwise in text order.
pub fn search_word(raw: &str, query: &str, padding: usize) -> WordSearch {
    let query = normalize_apostrophes(query.trim()).to_lowercase();
    if query.is_empty() {
        return WordSearch::empty();
    }

    let text = normalize_apostrophes(&strip_tags(raw));
    let tokens = tokenize(&text);

    let mut count = 0;
    let mut locations = Vec::new();
    for (idx, token) in tokens.iter().enumerate() {
        let lowered = token.to_lowercase();
        let match_type = if lowered == query {
            MatchType::Exact
        } else if lowered.contains(&query) {
            MatchType::Partial
        } else {
            continue;
        };

        count += 1;
        let start = idx.saturating_sub(padding);
        let end = idx.saturating_add(padding).saturating_add(1).min(tokens.len());
        locations.push(Location {
            count,
            context: tokens[start..end].join(" "),
            match_type,
        });
    }

    locations.sort_by_key(|location| location.match_type);
    WordSearch {
        frequency: count,
        locations,
    }
}
