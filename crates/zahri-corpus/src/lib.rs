//! In-memory store for the Zahri newspaper corpus.
//!
//! A corpus is a JSON file holding newspapers and their articles. [`Corpus`]
//! loads it once, answers corpus-wide searches and statistics through the
//! `zahri-text` engine, and applies annotation edits to article content.
//!
//! Articles live in a sharded concurrent map: reads clone what they need, and
//! each edit runs its read-compute-write cycle while holding the article's
//! entry exclusively, so concurrent edits to one article never lose updates.
//!
//! # Example
//! ```no_run
//! use zahri_corpus::{ArticleFilter, Corpus};
//! use zahri_types::Language;
//!
//! # fn main() -> anyhow::Result<()> {
//! let corpus = Corpus::load("articles.json")?;
//! let found = corpus.search("xo'jalik", Language::Uzbek, None);
//! println!("{} hits in {} articles", found.total_frequency, found.results.len());
//!
//! let counter = corpus.word_counter(&ArticleFilter::all().language(Language::English));
//! println!("top words: {:?}", counter.top_words());
//! # Ok(()) }
//! ```

mod edit;
mod error;
mod records;
mod search;
mod stats;

use std::cmp::Reverse;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use dashmap::DashMap;
use tracing::info;

pub use edit::{AnnotationOutcome, Selection};
pub use error::CorpusError;
pub use records::{Article, ArticleFilter, CorpusFile, Newspaper};
pub use search::{SearchHit, SearchResult};
pub use stats::{NameFrequency, NameStats, NewspaperSummary, YearCount};

pub struct Corpus {
    newspapers: HashMap<u64, Newspaper>,
    articles: DashMap<u64, Article>,
}

impl Corpus {
    /// Read and validate a corpus file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read corpus file {}", path.display()))?;
        let file: CorpusFile = serde_json::from_str(&raw)
            .with_context(|| format!("parse corpus file {}", path.display()))?;
        let corpus = Self::from_records(file)
            .with_context(|| format!("validate corpus file {}", path.display()))?;
        info!(
            "loaded {} newspapers and {} articles from {}",
            corpus.newspapers.len(),
            corpus.articles.len(),
            path.display()
        );
        Ok(corpus)
    }

    /// Build a corpus, rejecting duplicate ids and dangling newspaper
    /// references.
    pub fn from_records(file: CorpusFile) -> Result<Self, CorpusError> {
        let mut newspapers = HashMap::with_capacity(file.newspapers.len());
        for paper in file.newspapers {
            let id = paper.id;
            if newspapers.insert(id, paper).is_some() {
                return Err(CorpusError::DuplicateId {
                    kind: "newspaper",
                    id,
                });
            }
        }

        let articles = DashMap::with_capacity(file.articles.len());
        for article in file.articles {
            if !newspapers.contains_key(&article.newspaper_id) {
                return Err(CorpusError::UnknownNewspaper {
                    article: article.id,
                    newspaper: article.newspaper_id,
                });
            }
            let id = article.id;
            if articles.insert(id, article).is_some() {
                return Err(CorpusError::DuplicateId { kind: "article", id });
            }
        }

        Ok(Self {
            newspapers,
            articles,
        })
    }

    /// Current state as a corpus file, records ordered by id.
    pub fn snapshot(&self) -> CorpusFile {
        let mut newspapers: Vec<Newspaper> = self.newspapers.values().cloned().collect();
        newspapers.sort_by_key(|paper| paper.id);
        let mut articles: Vec<Article> = self
            .articles
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        articles.sort_by_key(|article| article.id);
        CorpusFile {
            newspapers,
            articles,
        }
    }

    /// Write the current state to `path`, replacing it atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.snapshot()).context("serialize corpus")?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, json)
            .with_context(|| format!("write corpus file {}", staging.display()))?;
        fs::rename(&staging, path)
            .with_context(|| format!("replace corpus file {}", path.display()))?;
        Ok(())
    }

    pub fn article(&self, id: u64) -> Option<Article> {
        self.articles.get(&id).map(|entry| entry.value().clone())
    }

    pub fn newspaper(&self, id: u64) -> Option<&Newspaper> {
        self.newspapers.get(&id)
    }

    /// All newspapers ordered by title.
    pub fn newspapers(&self) -> Vec<&Newspaper> {
        let mut papers: Vec<&Newspaper> = self.newspapers.values().collect();
        papers.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        papers
    }

    pub fn article_count(&self) -> usize {
        self.articles.len()
    }

    /// Articles matching `filter`, newest year first, then by newspaper title
    /// and id. Articles without a year come last.
    pub fn articles_in(&self, filter: &ArticleFilter) -> Vec<Article> {
        let mut selected: Vec<Article> = self
            .articles
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        selected.sort_by_cached_key(|article| {
            (
                Reverse(article.published_year),
                self.newspaper_title(article.newspaper_id).to_string(),
                article.id,
            )
        });
        selected
    }

    fn newspaper_title(&self, id: u64) -> &str {
        self.newspapers
            .get(&id)
            .map_or("", |paper| paper.title.as_str())
    }
}
