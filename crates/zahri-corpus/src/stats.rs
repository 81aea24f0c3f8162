use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use zahri_text::{WordCounter, annotated_names};
use zahri_types::{AnnotationKind, NameCounts, WordFrequency};

use crate::Corpus;
use crate::error::CorpusError;
use crate::records::{ArticleFilter, Newspaper};

/// Number of articles published in a year. `None` collects undated articles.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct YearCount {
    pub year: Option<u16>,
    pub count: usize,
}

/// A newspaper with the number of articles it holds.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct NewspaperSummary {
    #[serde(flatten)]
    pub newspaper: Newspaper,
    pub article_count: usize,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct NameFrequency {
    pub name: String,
    pub kind: AnnotationKind,
    pub count: usize,
}

/// Annotation totals per kind plus a per-name breakdown.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct NameStats {
    pub counts: NameCounts,
    pub frequency: Vec<NameFrequency>,
}

impl Corpus {
    /// Word counter over the content of every article matching `filter`.
    pub fn word_counter(&self, filter: &ArticleFilter) -> WordCounter {
        WordCounter::from_texts(
            self.articles_in(filter)
                .iter()
                .map(|article| article.content.as_str()),
        )
    }

    /// Full word frequency table for `filter`, most frequent first.
    pub fn frequency_stats(&self, filter: &ArticleFilter) -> Vec<WordFrequency> {
        self.word_counter(filter).frequencies()
    }

    pub fn article_word_counter(&self, article_id: u64) -> Result<WordCounter, CorpusError> {
        let entry = self
            .articles
            .get(&article_id)
            .ok_or(CorpusError::ArticleNotFound(article_id))?;
        Ok(WordCounter::from_texts([entry.content.as_str()]))
    }

    /// Word counter over every article of one newspaper.
    pub fn newspaper_word_counter(&self, newspaper_id: u64) -> Result<WordCounter, CorpusError> {
        if self.newspaper(newspaper_id).is_none() {
            return Err(CorpusError::NewspaperNotFound(newspaper_id));
        }
        Ok(self.word_counter(&ArticleFilter::all().newspaper(newspaper_id)))
    }

    /// Newspapers ordered by title, with their article counts.
    pub fn newspaper_summaries(&self) -> Vec<NewspaperSummary> {
        let mut per_paper: HashMap<u64, usize> = HashMap::new();
        for entry in self.articles.iter() {
            *per_paper.entry(entry.newspaper_id).or_default() += 1;
        }
        self.newspapers()
            .into_iter()
            .map(|paper| NewspaperSummary {
                article_count: per_paper.get(&paper.id).copied().unwrap_or(0),
                newspaper: paper.clone(),
            })
            .collect()
    }

    pub fn word_count(&self, article_id: u64) -> Result<usize, CorpusError> {
        self.articles
            .get(&article_id)
            .map(|entry| entry.word_count())
            .ok_or(CorpusError::ArticleNotFound(article_id))
    }

    /// Article counts per publication year, latest first, undated last.
    pub fn year_list(&self) -> Vec<YearCount> {
        let mut by_year: BTreeMap<Reverse<Option<u16>>, usize> = BTreeMap::new();
        for entry in self.articles.iter() {
            *by_year.entry(Reverse(entry.published_year)).or_default() += 1;
        }
        by_year
            .into_iter()
            .map(|(Reverse(year), count)| YearCount { year, count })
            .collect()
    }

    /// Annotation totals across the whole corpus.
    pub fn total_name_counts(&self) -> NameCounts {
        let mut counts = NameCounts::default();
        for entry in self.articles.iter() {
            let names = annotated_names(&entry.content).counts();
            for kind in AnnotationKind::ALL {
                counts.add(kind, names.get(kind));
            }
        }
        counts
    }

    /// Annotated names in articles matching `filter`, counted per name and
    /// kind. Sorted by count descending, then name.
    pub fn annotated_name_stats(&self, filter: &ArticleFilter) -> NameStats {
        let mut counts = NameCounts::default();
        let mut tally: HashMap<(AnnotationKind, String), usize> = HashMap::new();
        for article in self.articles_in(filter) {
            for (kind, name) in annotated_names(&article.content).iter() {
                counts.add(kind, 1);
                *tally.entry((kind, name.to_string())).or_default() += 1;
            }
        }

        let mut frequency: Vec<NameFrequency> = tally
            .into_iter()
            .map(|((kind, name), count)| NameFrequency { name, kind, count })
            .collect();
        frequency.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.kind.cmp(&b.kind))
        });
        NameStats { counts, frequency }
    }
}
