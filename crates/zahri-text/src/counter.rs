use std::collections::HashMap;

use zahri_types::WordFrequency;

use crate::normalize::cleanse;

/// Number of words kept in the running top list.
pub const TOP_WORDS: usize = 10;

/// Streaming word frequency counter with a bounded top list.
///
/// The top list is updated incrementally on every observed word rather than
/// re-sorted, so membership is approximate: a word pushed out on a tie is not
/// reconsidered until it is seen again. The list itself always stays sorted by
/// descending count. Use [`WordCounter::merge`] to combine counters built on
/// separate threads; it ranks the merged table with a full sort.
#[derive(Clone, Debug, Default)]
pub struct WordCounter {
    freq: HashMap<String, u64>,
    total: u64,
    top: Vec<String>,
}

impl WordCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every whitespace-separated word of every text.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counter = Self::new();
        for text in texts {
            counter.observe_text(text.as_ref());
        }
        counter
    }

    pub fn observe_text(&mut self, text: &str) {
        for word in text.split_whitespace() {
            self.observe(word);
        }
    }

    /// Record one occurrence of `word` after normalization. Words that
    /// normalize to nothing are ignored.
    pub fn observe(&mut self, word: &str) {
        let word = cleanse(word);
        if word.is_empty() {
            return;
        }
        let count = {
            let slot = self.freq.entry(word.clone()).or_insert(0);
            *slot += 1;
            *slot
        };
        self.total += 1;
        self.promote(word, count);
    }

    fn promote(&mut self, word: String, count: u64) {
        // The word's own slot, if ranked, already satisfies the comparison,
        // so an insertion point at or before it is always found.
        let insert_at = self
            .top
            .iter()
            .position(|ranked| self.count(ranked) <= count);

        match insert_at {
            Some(index) => {
                if let Some(old) = self.top.iter().position(|ranked| *ranked == word) {
                    self.top.remove(old);
                }
                self.top.insert(index, word);
                self.top.truncate(TOP_WORDS);
            }
            None => {
                if self.top.len() < TOP_WORDS && !self.top.contains(&word) {
                    self.top.push(word);
                }
            }
        }
    }

    pub fn count(&self, word: &str) -> u64 {
        self.freq.get(word).copied().unwrap_or(0)
    }

    pub fn total_words(&self) -> u64 {
        self.total
    }

    pub fn top_words(&self) -> &[String] {
        &self.top
    }

    pub fn table(&self) -> &HashMap<String, u64> {
        &self.freq
    }

    /// Top list, total word count and the full frequency table.
    pub fn snapshot(&self) -> (&[String], u64, &HashMap<String, u64>) {
        (&self.top, self.total, &self.freq)
    }

    /// Top list paired with counts.
    pub fn top_frequencies(&self) -> Vec<WordFrequency> {
        self.top
            .iter()
            .map(|word| WordFrequency {
                word: word.clone(),
                count: self.count(word),
            })
            .collect()
    }

    /// The whole table, most frequent first, ties in alphabetical order.
    pub fn frequencies(&self) -> Vec<WordFrequency> {
        let mut items: Vec<WordFrequency> = self
            .freq
            .iter()
            .map(|(word, count)| WordFrequency {
                word: word.clone(),
                count: *count,
            })
            .collect();
        items.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
        items
    }

    /// Sum the tables of several counters and rank the result exactly.
    pub fn merge<I>(counters: I) -> Self
    where
        I: IntoIterator<Item = WordCounter>,
    {
        let mut merged = Self::new();
        for counter in counters {
            merged.total += counter.total;
            for (word, count) in counter.freq {
                *merged.freq.entry(word).or_insert(0) += count;
            }
        }
        merged.top = merged
            .frequencies()
            .into_iter()
            .take(TOP_WORDS)
            .map(|item| item.word)
            .collect();
        merged
    }
}
