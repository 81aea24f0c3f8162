use serde::Serialize;
use tracing::debug;
use zahri_text::{CORPUS_CONTEXT_PADDING, normalize_apostrophes, query_variants, search_word};
use zahri_types::{Language, Location};

use crate::Corpus;
use crate::records::ArticleFilter;

/// Hits for one article.
#[derive(Clone, Debug, Serialize)]
pub struct SearchHit {
    pub article_id: u64,
    pub title: String,
    pub newspaper: String,
    pub published_year: Option<u16>,
    pub frequency: usize,
    pub locations: Vec<Location>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct SearchResult {
    pub query: String,
    pub results: Vec<SearchHit>,
    pub total_frequency: usize,
}

impl Corpus {
    /// Search articles of one language, optionally restricted to a year.
    ///
    /// A year that does not parse is ignored rather than rejected. Articles
    /// are preselected by a case-insensitive substring match against every
    /// apostrophe spelling of the query, mixed glyphs included, then
    /// token-searched with the normalized query.
    pub fn search(&self, query: &str, language: Language, year: Option<&str>) -> SearchResult {
        self.search_with_padding(query, language, year, CORPUS_CONTEXT_PADDING)
    }

    pub fn search_with_padding(
        &self,
        query: &str,
        language: Language,
        year: Option<&str>,
        padding: usize,
    ) -> SearchResult {
        let query = query.trim();
        if query.is_empty() {
            return SearchResult::default();
        }

        let mut filter = ArticleFilter::all().language(language);
        if let Some(raw_year) = year {
            match raw_year.trim().parse::<u16>() {
                Ok(parsed) => filter = filter.year(parsed),
                Err(_) => debug!(year = raw_year, "ignoring unparseable year filter"),
            }
        }

        let variants = query_variants(&query.to_lowercase());
        let normalized = normalize_apostrophes(query);

        let mut results = Vec::new();
        let mut total_frequency = 0;
        for article in self.articles_in(&filter) {
            let content = article.content.to_lowercase();
            if !variants.iter().any(|variant| content.contains(variant.as_str())) {
                continue;
            }
            let found = search_word(&article.content, &normalized, padding);
            total_frequency += found.frequency;
            results.push(SearchHit {
                article_id: article.id,
                title: article.title,
                newspaper: self.newspaper_title(article.newspaper_id).to_string(),
                published_year: article.published_year,
                frequency: found.frequency,
                locations: found.locations,
            });
        }

        debug!(
            query,
            articles = results.len(),
            total_frequency,
            "corpus search finished"
        );
        SearchResult {
            query: query.to_string(),
            results,
            total_frequency,
        }
    }
}
