//! Text engine for the Zahri newspaper corpus.
//!
//! Article bodies are stored as raw text with inline entity markers: male
//! names as `[Ali]`, female names as `^^Lola^^`, toponyms as `$$Xiva$$`. This
//! crate works on that raw text without owning it; every function takes the
//! current text and returns values or a new text for the caller to persist.
//!
//! # Pieces
//! - [`projection`]: strip markers into a plain view, with annotation spans
//!   and segments mapping plain offsets back to raw ones.
//! - [`editor`]: apply, toggle or remove annotations given a plain range.
//! - [`selection`]: turn a snippet highlighted in rendered text into a plain
//!   range.
//! - [`search`]: token search with context windows and exact/partial hits.
//! - [`counter`] and [`normalize`]: apostrophe-aware word counting with a
//!   running top-10.
//! - [`names`]: annotated entities per kind.
//!
//! All offsets are counted in `char`s.
//!
//! # Example
//! ```rust
//! use zahri_text::{apply_or_toggle, project, resolve_span};
//!
//! let raw = "Hello Smith.";
//! let span = resolve_span(raw, "Smith", None, None).unwrap();
//! let edit = apply_or_toggle(raw, span.start, span.end, "male");
//! assert_eq!(edit.text, "Hello [Smith].");
//! assert_eq!(project(&edit.text).plain, raw);
//! ```

pub mod counter;
pub mod editor;
pub mod names;
pub mod normalize;
pub mod projection;
pub mod search;
pub mod selection;

pub use counter::{TOP_WORDS, WordCounter};
pub use editor::{Edit, apply_or_toggle, apply_or_toggle_kind, remove_annotations};
pub use names::{AnnotatedNames, annotated_names};
pub use normalize::{APOSTROPHE_VARIANTS, cleanse, normalize_apostrophes, query_variants};
pub use projection::{
    AnnotationSpan, Bias, Projection, Segment, plain_to_raw_index, plain_to_raw_index_biased,
    project,
};
pub use search::{CORPUS_CONTEXT_PADDING, SNIPPET_PADDING, search_word, strip_tags, tokenize};
pub use selection::{PlainSpan, resolve_in_plain, resolve_span};
