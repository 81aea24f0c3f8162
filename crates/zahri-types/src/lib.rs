//! Shared value types for the Zahri newspaper corpus.
//!
//! Article text carries inline annotations: male names in `[`…`]`, female
//! names in `^^`…`^^` and toponyms in `$$`…`$$`. [`AnnotationKind`] owns that
//! delimiter grammar; [`Language`] tags each article; [`MatchType`],
//! [`Location`] and [`WordSearch`] describe token search hits; and
//! [`WordFrequency`] / [`NameCounts`] carry aggregate statistics.
//!
//! Every type serializes to the JSON shapes the HTTP layer returns.
//!
//! ```rust
//! use zahri_types::{AnnotationKind, Language};
//!
//! let kind = AnnotationKind::parse("female").unwrap();
//! assert_eq!((kind.open(), kind.close()), ("^^", "^^"));
//! assert_eq!(Language::parse("2"), Some(Language::Uzbek));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Inline annotation marker kinds found in raw article text.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Male,
    Female,
    Toponym,
}

impl AnnotationKind {
    /// All kinds, in the order the scanner tries them at a given position.
    pub const ALL: [AnnotationKind; 3] = [
        AnnotationKind::Male,
        AnnotationKind::Female,
        AnnotationKind::Toponym,
    ];

    /// Parse a kind name (`male`, `female`, `toponym`), ignoring ASCII case
    /// and surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" => Some(AnnotationKind::Male),
            "female" => Some(AnnotationKind::Female),
            "toponym" => Some(AnnotationKind::Toponym),
            _ => None,
        }
    }

    /// Opening marker as stored in raw text.
    pub fn open(self) -> &'static str {
        match self {
            AnnotationKind::Male => "[",
            AnnotationKind::Female => "^^",
            AnnotationKind::Toponym => "$$",
        }
    }

    /// Closing marker as stored in raw text.
    pub fn close(self) -> &'static str {
        match self {
            AnnotationKind::Male => "]",
            AnnotationKind::Female => "^^",
            AnnotationKind::Toponym => "$$",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnnotationKind::Male => "male",
            AnnotationKind::Female => "female",
            AnnotationKind::Toponym => "toponym",
        }
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Article language. The numeric codes match the stored corpus data.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Uzbek,
}

impl Language {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Language::English),
            2 => Some(Language::Uzbek),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Language::English => 1,
            Language::Uzbek => 2,
        }
    }

    /// Accepts either the numeric code or the language name.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(code) = raw.parse::<u8>() {
            return Self::from_code(code);
        }
        match raw.to_ascii_lowercase().as_str() {
            "english" | "en" => Some(Language::English),
            "uzbek" | "uz" => Some(Language::Uzbek),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Language::English => "English",
            Language::Uzbek => "Uzbek",
        })
    }
}

/// How a token matched a search query. `Exact` orders before `Partial`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Partial,
}

/// One search hit: 1-based running match number plus the surrounding tokens.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub count: usize,
    pub context: String,
    #[serde(rename = "type")]
    pub match_type: MatchType,
}

/// Per-text search outcome.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct WordSearch {
    pub frequency: usize,
    pub locations: Vec<Location>,
}

impl WordSearch {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A normalized word and how often it occurred.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct WordFrequency {
    pub word: String,
    pub count: u64,
}

/// Per-kind annotation tallies.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct NameCounts {
    pub male: usize,
    pub female: usize,
    pub toponym: usize,
}

impl NameCounts {
    pub fn get(&self, kind: AnnotationKind) -> usize {
        match kind {
            AnnotationKind::Male => self.male,
            AnnotationKind::Female => self.female,
            AnnotationKind::Toponym => self.toponym,
        }
    }

    pub fn add(&mut self, kind: AnnotationKind, n: usize) {
        match kind {
            AnnotationKind::Male => self.male += n,
            AnnotationKind::Female => self.female += n,
            AnnotationKind::Toponym => self.toponym += n,
        }
    }

    pub fn total(&self) -> usize {
        self.male + self.female + self.toponym
    }
}
