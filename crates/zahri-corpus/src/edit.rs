use serde::Serialize;
use tracing::{debug, info};
use zahri_text::{Edit, PlainSpan, apply_or_toggle, remove_annotations, resolve_span};

use crate::Corpus;
use crate::error::CorpusError;

/// What part of an article an edit targets.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Selection {
    /// Text highlighted in the rendered article, with optional plain offsets
    /// near where it was highlighted.
    Snippet {
        text: String,
        approx_start: Option<usize>,
        approx_end: Option<usize>,
    },
    /// Exact plain-text char range.
    Range { start: usize, end: usize },
}

impl Selection {
    fn resolve(&self, article_id: u64, raw: &str) -> Result<PlainSpan, CorpusError> {
        match self {
            Selection::Snippet {
                text,
                approx_start,
                approx_end,
            } => resolve_span(raw, text, *approx_start, *approx_end)
                .ok_or(CorpusError::SelectionNotFound(article_id)),
            Selection::Range { start, end } => Ok(PlainSpan {
                start: *start,
                end: *end,
            }),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct AnnotationOutcome {
    pub article_id: u64,
    pub changed: bool,
    pub span: PlainSpan,
    pub content: String,
}

impl Corpus {
    /// Apply or toggle an annotation of `kind` on an article.
    ///
    /// The article entry is held exclusively from reading the content until
    /// the new content is stored.
    pub fn annotate(
        &self,
        article_id: u64,
        selection: &Selection,
        kind: &str,
    ) -> Result<AnnotationOutcome, CorpusError> {
        self.edit_article(article_id, selection, |raw, span| {
            apply_or_toggle(raw, span.start, span.end, kind)
        })
    }

    /// Strip every annotation overlapping the selection.
    pub fn remove_annotations(
        &self,
        article_id: u64,
        selection: &Selection,
    ) -> Result<AnnotationOutcome, CorpusError> {
        self.edit_article(article_id, selection, |raw, span| {
            remove_annotations(raw, span.start, span.end)
        })
    }

    fn edit_article<F>(
        &self,
        article_id: u64,
        selection: &Selection,
        edit: F,
    ) -> Result<AnnotationOutcome, CorpusError>
    where
        F: FnOnce(&str, PlainSpan) -> Edit,
    {
        let mut entry = self
            .articles
            .get_mut(&article_id)
            .ok_or(CorpusError::ArticleNotFound(article_id))?;
        let span = selection.resolve(article_id, &entry.content)?;
        let Edit { text, changed } = edit(&entry.content, span);
        if changed {
            entry.content = text;
            info!(
                article_id,
                start = span.start,
                end = span.end,
                "article annotations updated"
            );
        } else {
            debug!(article_id, start = span.start, end = span.end, "edit left article unchanged");
        }
        Ok(AnnotationOutcome {
            article_id,
            changed,
            span,
            content: entry.content.clone(),
        })
    }
}
