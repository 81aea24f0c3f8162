use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::projection::project;

/// A char range in the plain projection.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct PlainSpan {
    pub start: usize,
    pub end: usize,
}

/// Locate a snippet the user highlighted in rendered text.
///
/// Rendering may collapse or trim whitespace, so the snippet's words are
/// matched in order with any run of whitespace between them. When several
/// places match, the one starting closest to `approx_start` (or, failing
/// that, `approx_end`) wins; without a hint the first match is used.
pub fn resolve_span(
    raw: &str,
    snippet: &str,
    approx_start: Option<usize>,
    approx_end: Option<usize>,
) -> Option<PlainSpan> {
    let projection = project(raw);
    resolve_in_plain(&projection.plain, snippet, approx_start, approx_end)
}

/// [`resolve_span`] against an already projected plain text.
pub fn resolve_in_plain(
    plain: &str,
    snippet: &str,
    approx_start: Option<usize>,
    approx_end: Option<usize>,
) -> Option<PlainSpan> {
    let trimmed = snippet.trim();
    let tokens: Vec<String> = trimmed.split_whitespace().map(regex::escape).collect();
    if tokens.is_empty() {
        return None;
    }

    let mut byte_ranges: Vec<(usize, usize)> = match Regex::new(&tokens.join(r"\s+")) {
        Ok(pattern) => pattern
            .find_iter(plain)
            .map(|m| (m.start(), m.end()))
            .collect(),
        Err(err) => {
            debug!(%err, "snippet pattern rejected, falling back to literal search");
            Vec::new()
        }
    };
    if byte_ranges.is_empty() {
        byte_ranges = plain
            .match_indices(trimmed)
            .map(|(at, found)| (at, at + found.len()))
            .collect();
    }

    let spans: Vec<PlainSpan> = byte_ranges
        .into_iter()
        .map(|(start, end)| PlainSpan {
            start: char_offset(plain, start),
            end: char_offset(plain, end),
        })
        .collect();

    match (spans.as_slice(), approx_start.or(approx_end)) {
        ([], _) => None,
        ([only], _) => Some(*only),
        (many, Some(hint)) => many
            .iter()
            .min_by_key(|span| span.start.abs_diff(hint))
            .copied(),
        (many, None) => many.first().copied(),
    }
}

fn char_offset(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}
