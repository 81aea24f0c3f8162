use std::ops::Range;

use tracing::{debug, warn};
use zahri_types::AnnotationKind;

use crate::projection::{AnnotationSpan, Bias, Projection, project};

/// Result of an annotation edit. `text` is the full raw text to persist.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Edit {
    pub text: String,
    pub changed: bool,
}

impl Edit {
    fn unchanged(raw: &str) -> Self {
        Self {
            text: raw.to_string(),
            changed: false,
        }
    }
}

/// [`apply_or_toggle_kind`] for a kind given by name. Unknown names leave the
/// text untouched.
pub fn apply_or_toggle(raw: &str, plain_start: usize, plain_end: usize, kind: &str) -> Edit {
    match AnnotationKind::parse(kind) {
        Some(kind) => apply_or_toggle_kind(raw, plain_start, plain_end, kind),
        None => {
            debug!(kind, "ignoring unknown annotation kind");
            Edit::unchanged(raw)
        }
    }
}

/// Annotate the plain range `plain_start..plain_end` with `kind`.
///
/// Offsets are plain-text chars; they are swapped if reversed and clamped to
/// the text. Re-selecting exactly one existing annotation of the same kind
/// removes it. Otherwise every annotation overlapping the range is removed
/// first and the new markers wrap the range. Empty and whitespace-only
/// selections are ignored.
///
/// An edit that would change the plain text, or would not re-parse as the
/// requested annotation, is refused and the input is returned unchanged.
pub fn apply_or_toggle_kind(
    raw: &str,
    plain_start: usize,
    plain_end: usize,
    kind: AnnotationKind,
) -> Edit {
    let projection = project(raw);
    let Some(range) = selection(&projection, plain_start, plain_end) else {
        return Edit::unchanged(raw);
    };
    if projection
        .plain_slice(range.start, range.end)
        .chars()
        .all(char::is_whitespace)
    {
        return Edit::unchanged(raw);
    }

    let kept = untouched(&projection, &range);
    let hits: Vec<&AnnotationSpan> = projection.intersecting(range.start, range.end).collect();
    if let [only] = hits.as_slice()
        && only.kind == kind
        && only.plain_range() == range
    {
        let text = remove_markers(raw, hits);
        return verified(raw, &projection, text, &kept, None);
    }

    let cleared = remove_markers(raw, hits);
    let shrunk = project(&cleared);
    let raw_start = shrunk.plain_to_raw(range.start, Bias::After);
    let raw_end = shrunk.plain_to_raw(range.end, Bias::Before);
    if raw_start > raw_end {
        warn!(raw_start, raw_end, "selection maps to an inverted raw range");
        return Edit::unchanged(raw);
    }

    let mut chars: Vec<char> = cleared.chars().collect();
    chars.splice(raw_end..raw_end, kind.close().chars());
    chars.splice(raw_start..raw_start, kind.open().chars());
    let text: String = chars.into_iter().collect();

    verified(raw, &projection, text, &kept, Some((kind, range)))
}

/// Strip the markers of every annotation overlapping `plain_start..plain_end`,
/// keeping their content as plain text.
pub fn remove_annotations(raw: &str, plain_start: usize, plain_end: usize) -> Edit {
    let projection = project(raw);
    let Some(range) = selection(&projection, plain_start, plain_end) else {
        return Edit::unchanged(raw);
    };
    let hits: Vec<&AnnotationSpan> = projection.intersecting(range.start, range.end).collect();
    if hits.is_empty() {
        return Edit::unchanged(raw);
    }
    let kept = untouched(&projection, &range);
    let text = remove_markers(raw, hits);
    verified(raw, &projection, text, &kept, None)
}

/// Ordered, clamped, non-empty plain range.
fn selection(projection: &Projection, start: usize, end: usize) -> Option<Range<usize>> {
    let (start, end) = if start > end { (end, start) } else { (start, end) };
    let len = projection.plain_len();
    let range = start.min(len)..end.min(len);
    (!range.is_empty()).then_some(range)
}

/// Delete the opening and closing markers of `spans`, highest offset first.
fn remove_markers<'a, I>(raw: &str, spans: I) -> String
where
    I: IntoIterator<Item = &'a AnnotationSpan>,
{
    let mut ranges: Vec<Range<usize>> = spans
        .into_iter()
        .flat_map(AnnotationSpan::marker_ranges)
        .collect();
    ranges.sort_by(|a, b| b.start.cmp(&a.start));

    let mut chars: Vec<char> = raw.chars().collect();
    for range in ranges {
        chars.drain(range);
    }
    chars.into_iter().collect()
}

/// Kind and plain range of every annotation the selection does not overlap.
fn untouched(projection: &Projection, range: &Range<usize>) -> Vec<(AnnotationKind, Range<usize>)> {
    projection
        .annotations
        .iter()
        .filter(|span| !span.intersects(range.start, range.end))
        .map(|span| (span.kind, span.plain_range()))
        .collect()
}

fn verified(
    raw: &str,
    before: &Projection,
    text: String,
    kept: &[(AnnotationKind, Range<usize>)],
    expected: Option<(AnnotationKind, Range<usize>)>,
) -> Edit {
    let after = project(&text);
    if after.plain != before.plain {
        warn!("refusing annotation edit that would alter the plain text");
        return Edit::unchanged(raw);
    }
    let survives = |(kind, range): &(AnnotationKind, Range<usize>)| {
        after
            .annotations
            .iter()
            .any(|span| span.kind == *kind && span.plain_range() == *range)
    };
    if let Some((kind, range)) = kept.iter().find(|entry| !survives(*entry)) {
        warn!(%kind, ?range, "refusing annotation edit that would disturb a neighbouring annotation");
        return Edit::unchanged(raw);
    }
    if let Some((kind, range)) = expected
        && !survives(&(kind, range.clone()))
    {
        warn!(%kind, ?range, "refusing annotation edit that does not re-parse as requested");
        return Edit::unchanged(raw);
    }
    let changed = text != raw;
    Edit { text, changed }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_then_toggles_off() {
        let applied = apply_or_toggle("Hello Smith.", 6, 11, "male");
        assert_eq!(applied.text, "Hello [Smith].");
        assert!(applied.changed);

        let toggled = apply_or_toggle(&applied.text, 6, 11, "male");
        assert_eq!(toggled.text, "Hello Smith.");
        assert!(toggled.changed);
    }

    #[test]
    fn reversed_offsets_are_swapped() {
        let edit = apply_or_toggle("Hello Smith.", 11, 6, "female");
        assert_eq!(edit.text, "Hello ^^Smith^^.");
    }

    #[test]
    fn offsets_are_clamped() {
        let edit = apply_or_toggle("Hello Smith.", 100, 6, "toponym");
        assert_eq!(edit.text, "Hello $$Smith.$$");
    }

    #[test]
    fn unknown_kind_is_noop() {
        let edit = apply_or_toggle("Hello Smith.", 6, 11, "person");
        assert_eq!(edit.text, "Hello Smith.");
        assert!(!edit.changed);
    }

    #[test]
    fn empty_and_blank_selections_are_noops() {
        assert!(!apply_or_toggle("Hello Smith.", 4, 4, "male").changed);
        assert!(!apply_or_toggle("Hello  Smith.", 5, 7, "male").changed);
        assert!(!apply_or_toggle("", 0, 3, "male").changed);
    }

    #[test]
    fn same_range_other_kind_replaces_annotation() {
        let edit = apply_or_toggle("Hello [Smith].", 6, 11, "female");
        assert_eq!(edit.text, "Hello ^^Smith^^.");
        assert!(edit.changed);
    }

    #[test]
    fn overlapping_annotations_are_cleared() {
        let edit = apply_or_toggle("Hello [John Smith].", 11, 16, "male");
        assert_eq!(edit.text, "Hello John [Smith].");

        let wide = apply_or_toggle("[A] and ^^B^^ went", 0, 7, "toponym");
        assert_eq!(wide.text, "$$A and B$$ went");
    }

    #[test]
    fn adjacent_annotations_are_left_intact() {
        let edit = apply_or_toggle("[A]B", 1, 2, "male");
        assert_eq!(edit.text, "[A][B]");

        let before = apply_or_toggle("A[B]", 0, 1, "female");
        assert_eq!(before.text, "^^A^^[B]");
    }

    #[test]
    fn multibyte_text_is_spliced_on_char_boundaries() {
        let edit = apply_or_toggle("Bu Oʻktam va Gʻofur", 3, 9, "male");
        assert_eq!(edit.text, "Bu [Oʻktam] va Gʻofur");
    }

    #[test]
    fn refuses_edit_that_would_corrupt_text() {
        let raw = "a [ b";
        let edit = apply_or_toggle(raw, 0, 5, "male");
        assert_eq!(edit.text, raw);
        assert!(!edit.changed);
    }

    #[test]
    fn refuses_edit_that_repairs_markers_of_a_neighbour() {
        // Clearing `[$^]` exposes `$^` which pairs with the female markers
        // to its right, so the untouched `^^$^^` would no longer parse.
        let raw = " [$^]^^$^^";
        let before = project(raw);
        assert_eq!(before.annotations.len(), 2);
        assert_eq!(before.annotations[1].kind, AnnotationKind::Female);
        assert_eq!(before.annotations[1].plain_range(), 3..4);

        let edit = apply_or_toggle(raw, 1, 2, "female");
        assert_eq!(edit.text, raw);
        assert!(!edit.changed);
    }

    #[test]
    fn neighbours_keep_their_kind_and_range() {
        let raw = "[Ali] va ^^Lola^^ $$Xiva$$";
        let edit = apply_or_toggle(raw, 4, 6, "toponym");
        assert!(edit.changed);
        let after = project(&edit.text);
        let kinds: Vec<(AnnotationKind, Range<usize>)> = after
            .annotations
            .iter()
            .map(|span| (span.kind, span.plain_range()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (AnnotationKind::Male, 0..3),
                (AnnotationKind::Toponym, 4..6),
                (AnnotationKind::Female, 7..11),
                (AnnotationKind::Toponym, 12..16),
            ]
        );
    }

    #[test]
    fn remove_strips_every_overlapping_span() {
        let edit = remove_annotations("[Ali] va ^^Lola^^ $$Xiva$$", 0, 8);
        assert_eq!(edit.text, "Ali va Lola $$Xiva$$");
        assert!(edit.changed);

        let nothing = remove_annotations("plain text", 0, 5);
        assert!(!nothing.changed);
    }
}
