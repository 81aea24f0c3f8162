use std::collections::HashSet;

use serde::Serialize;
use zahri_types::{AnnotationKind, NameCounts};

use crate::projection::{Projection, project};

/// Annotated entities of one text, trimmed, in order of appearance.
/// Repeats are kept; blank annotations are dropped.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct AnnotatedNames {
    pub male: Vec<String>,
    pub female: Vec<String>,
    pub toponym: Vec<String>,
}

impl AnnotatedNames {
    pub fn from_projection(projection: &Projection) -> Self {
        let mut names = Self::default();
        for span in &projection.annotations {
            let name = projection.plain_slice(span.plain_start, span.plain_end).trim();
            if !name.is_empty() {
                names.list_mut(span.kind).push(name.to_string());
            }
        }
        names
    }

    pub fn of_kind(&self, kind: AnnotationKind) -> &[String] {
        match kind {
            AnnotationKind::Male => &self.male,
            AnnotationKind::Female => &self.female,
            AnnotationKind::Toponym => &self.toponym,
        }
    }

    fn list_mut(&mut self, kind: AnnotationKind) -> &mut Vec<String> {
        match kind {
            AnnotationKind::Male => &mut self.male,
            AnnotationKind::Female => &mut self.female,
            AnnotationKind::Toponym => &mut self.toponym,
        }
    }

    /// Every name with its kind.
    pub fn iter(&self) -> impl Iterator<Item = (AnnotationKind, &str)> {
        AnnotationKind::ALL.into_iter().flat_map(move |kind| {
            self.of_kind(kind)
                .iter()
                .map(move |name| (kind, name.as_str()))
        })
    }

    pub fn counts(&self) -> NameCounts {
        let mut counts = NameCounts::default();
        for kind in AnnotationKind::ALL {
            counts.add(kind, self.of_kind(kind).len());
        }
        counts
    }

    pub fn unique_counts(&self) -> NameCounts {
        let mut counts = NameCounts::default();
        for kind in AnnotationKind::ALL {
            let unique: HashSet<&String> = self.of_kind(kind).iter().collect();
            counts.add(kind, unique.len());
        }
        counts
    }
}

pub fn annotated_names(raw: &str) -> AnnotatedNames {
    AnnotatedNames::from_projection(&project(raw))
}
