//! Plain-text projection of annotated raw text.
//!
//! Raw text carries inline markers (`[`…`]`, `^^`…`^^`, `$$`…`$$`). The
//! projection removes the markers, keeps the annotated content inline, and
//! records enough offsets to translate plain positions back to raw ones.
//! All offsets are counted in `char`s.

use std::ops::Range;

use serde::Serialize;
use zahri_types::AnnotationKind;

/// One annotation found in raw text, in both coordinate spaces.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct AnnotationSpan {
    pub kind: AnnotationKind,
    pub plain_start: usize,
    pub plain_end: usize,
    pub open_raw_start: usize,
    pub open_raw_end: usize,
    pub close_raw_start: usize,
    pub close_raw_end: usize,
}

impl AnnotationSpan {
    pub fn plain_range(&self) -> Range<usize> {
        self.plain_start..self.plain_end
    }

    /// Raw range of the content between the markers.
    pub fn inner_raw_range(&self) -> Range<usize> {
        self.open_raw_end..self.close_raw_start
    }

    /// Half-open overlap with the plain range `start..end`.
    pub fn intersects(&self, start: usize, end: usize) -> bool {
        self.plain_start < end && start < self.plain_end
    }

    pub(crate) fn marker_ranges(&self) -> [Range<usize>; 2] {
        [
            self.open_raw_start..self.open_raw_end,
            self.close_raw_start..self.close_raw_end,
        ]
    }
}

/// A raw range that appears unchanged in the plain projection.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Segment {
    pub raw_start: usize,
    pub raw_end: usize,
    pub plain_start: usize,
    pub plain_end: usize,
}

/// Which segment wins when a plain index sits on the boundary of two.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Bias {
    /// The earlier segment: the index lands at the end of the preceding run,
    /// before any marker that follows it.
    #[default]
    Before,
    /// The later segment: the index lands at the start of the following run,
    /// after any marker that precedes it.
    After,
}

/// Marker-free view of raw text plus the offsets linking it back.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Projection {
    pub plain: String,
    pub annotations: Vec<AnnotationSpan>,
    pub segments: Vec<Segment>,
    #[serde(skip)]
    plain_len: usize,
    #[serde(skip)]
    raw_len: usize,
}

impl Projection {
    /// Length of the plain text in chars.
    pub fn plain_len(&self) -> usize {
        self.plain_len
    }

    /// Length of the raw text in chars.
    pub fn raw_len(&self) -> usize {
        self.raw_len
    }

    /// Plain text between two char offsets, clamped to the text.
    pub fn plain_slice(&self, start: usize, end: usize) -> &str {
        let end = end.min(self.plain_len);
        let start = start.min(end);
        let from = byte_offset(&self.plain, start);
        let to = byte_offset(&self.plain, end);
        &self.plain[from..to]
    }

    /// Annotations whose plain range overlaps `start..end`.
    pub fn intersecting(&self, start: usize, end: usize) -> impl Iterator<Item = &AnnotationSpan> {
        self.annotations
            .iter()
            .filter(move |span| span.intersects(start, end))
    }

    /// Translate a plain offset into a raw offset.
    ///
    /// The index is clamped to the plain text and matched against segments
    /// inclusively at both ends; `bias` picks the segment on a shared
    /// boundary.
    pub fn plain_to_raw(&self, plain_index: usize, bias: Bias) -> usize {
        let index = plain_index.min(self.plain_len);
        let mut containing = self
            .segments
            .iter()
            .filter(|seg| seg.plain_start <= index && index <= seg.plain_end);
        let segment = match bias {
            Bias::Before => containing.next(),
            Bias::After => containing.last(),
        };
        match segment {
            Some(seg) => seg.raw_start + (index - seg.plain_start),
            None => self.raw_len,
        }
    }
}

/// Scan raw text and build its plain projection.
///
/// At every position the male, female and toponym markers are tried in that
/// order and the first that forms a complete annotation wins; scanning
/// resumes after its closing marker. Male content is one or more chars
/// without `[` or `]`. Female and toponym content is one or more arbitrary
/// chars, newlines included, up to the nearest closing marker. Markers that
/// never close stay in the plain text as literals.
pub fn project(raw: &str) -> Projection {
    let chars: Vec<char> = raw.chars().collect();
    let mut builder = Builder::with_capacity(raw.len());

    let mut gap_start = 0;
    let mut pos = 0;
    while pos < chars.len() {
        let Some(found) = match_at(&chars, pos) else {
            pos += 1;
            continue;
        };

        builder.copy(&chars, gap_start, found.start);
        let (plain_start, plain_end) = builder.copy(&chars, found.open_end, found.close_start);
        builder.annotations.push(AnnotationSpan {
            kind: found.kind,
            plain_start,
            plain_end,
            open_raw_start: found.start,
            open_raw_end: found.open_end,
            close_raw_start: found.close_start,
            close_raw_end: found.end,
        });

        pos = found.end;
        gap_start = found.end;
    }
    builder.copy(&chars, gap_start, chars.len());

    Projection {
        plain: builder.plain,
        annotations: builder.annotations,
        segments: builder.segments,
        plain_len: builder.plain_len,
        raw_len: chars.len(),
    }
}

/// [`plain_to_raw_index_biased`] preferring the earlier segment on a boundary.
pub fn plain_to_raw_index(raw: &str, plain_index: usize) -> usize {
    plain_to_raw_index_biased(raw, plain_index, Bias::Before)
}

pub fn plain_to_raw_index_biased(raw: &str, plain_index: usize, bias: Bias) -> usize {
    project(raw).plain_to_raw(plain_index, bias)
}

/// Byte offset of the `char_index`-th char, or the string length past the end.
pub(crate) fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map_or(text.len(), |(byte, _)| byte)
}

struct Builder {
    plain: String,
    plain_len: usize,
    annotations: Vec<AnnotationSpan>,
    segments: Vec<Segment>,
}

impl Builder {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            plain: String::with_capacity(capacity),
            plain_len: 0,
            annotations: Vec::new(),
            segments: Vec::new(),
        }
    }

    /// Copy `chars[start..end]` verbatim into the plain text and return the
    /// plain range it occupies. Empty runs add no segment.
    fn copy(&mut self, chars: &[char], start: usize, end: usize) -> (usize, usize) {
        let plain_start = self.plain_len;
        if start >= end {
            return (plain_start, plain_start);
        }
        self.plain.extend(&chars[start..end]);
        self.plain_len += end - start;
        self.segments.push(Segment {
            raw_start: start,
            raw_end: end,
            plain_start,
            plain_end: self.plain_len,
        });
        (plain_start, self.plain_len)
    }
}

struct ScanMatch {
    kind: AnnotationKind,
    start: usize,
    open_end: usize,
    close_start: usize,
    end: usize,
}

fn match_at(chars: &[char], pos: usize) -> Option<ScanMatch> {
    AnnotationKind::ALL
        .into_iter()
        .find_map(|kind| match_kind(chars, pos, kind))
}

fn match_kind(chars: &[char], pos: usize, kind: AnnotationKind) -> Option<ScanMatch> {
    let open = kind.open();
    let close = kind.close();
    if !has_marker(chars, pos, open) {
        return None;
    }
    let open_end = pos + open.chars().count();
    let close_len = close.chars().count();

    let mut cursor = open_end;
    while cursor < chars.len() {
        // Content must be at least one char long.
        if cursor > open_end && has_marker(chars, cursor, close) {
            return Some(ScanMatch {
                kind,
                start: pos,
                open_end,
                close_start: cursor,
                end: cursor + close_len,
            });
        }
        if kind == AnnotationKind::Male && matches!(chars[cursor], '[' | ']') {
            return None;
        }
        cursor += 1;
    }
    None
}

fn has_marker(chars: &[char], at: usize, marker: &str) -> bool {
    marker
        .chars()
        .enumerate()
        .all(|(offset, expected)| chars.get(at + offset) == Some(&expected))
}
