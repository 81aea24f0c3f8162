use serde::{Deserialize, Serialize};
use zahri_types::Language;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Newspaper {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub published_year: Option<u16>,
    #[serde(default)]
    pub issue_number: Option<i32>,
}

/// A stored article. `content` is the raw text, annotation markers included.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    pub newspaper_id: u64,
    pub content: String,
    #[serde(default = "default_language")]
    pub language: Language,
    #[serde(default)]
    pub published_year: Option<u16>,
    #[serde(default)]
    pub link: Option<String>,
}

fn default_language() -> Language {
    Language::Uzbek
}

impl Article {
    /// Whitespace-separated word count of the raw content.
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// On-disk layout of a corpus file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CorpusFile {
    #[serde(default)]
    pub newspapers: Vec<Newspaper>,
    #[serde(default)]
    pub articles: Vec<Article>,
}

/// Article selection by language, year and newspaper. Unset fields match
/// everything.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ArticleFilter {
    pub language: Option<Language>,
    pub year: Option<u16>,
    pub newspaper_id: Option<u64>,
}

impl ArticleFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    pub fn year(mut self, year: u16) -> Self {
        self.year = Some(year);
        self
    }

    pub fn newspaper(mut self, newspaper_id: u64) -> Self {
        self.newspaper_id = Some(newspaper_id);
        self
    }

    pub fn matches(&self, article: &Article) -> bool {
        self.language.is_none_or(|lang| article.language == lang)
            && self.year.is_none_or(|year| article.published_year == Some(year))
            && self
                .newspaper_id
                .is_none_or(|id| article.newspaper_id == id)
    }
}
