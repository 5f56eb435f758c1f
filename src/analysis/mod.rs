//! Text analysis for harvested articles
//!
//! An [`Analyzer`] turns an article body and its description into a tag
//! list, a short extractive summary and a readability [`Assessment`]. The
//! crawler treats it as a pure function: no side effects and no state shared
//! with the orchestrator.

mod readability;
mod text;

pub use readability::{assess, humanize_duration, reading_time, Assessment};

use std::collections::HashMap;

/// Number of summary sentences kept per article
pub const SUMMARY_SENTENCES: usize = 3;

/// Maximum number of tags derived from a description
pub const MAX_TAGS: usize = 10;

/// Output of analyzing one article
#[derive(Debug, Clone, PartialEq)]
pub struct TextAnalysis {
    pub tags: Vec<String>,
    pub summary: Vec<String>,
    pub assessment: Assessment,
}

/// Analyzes an article body together with its description
pub trait Analyzer: Send + Sync {
    fn analyze(&self, body: &str, description: &str) -> TextAnalysis;
}

/// Frequency-based analyzer
///
/// Tags are the most frequent topical words of the description. The summary
/// is built from the body sentences whose words occur most often across the
/// whole body, returned in document order.
#[derive(Debug, Clone)]
pub struct DefaultAnalyzer {
    summary_sentences: usize,
    max_tags: usize,
}

impl DefaultAnalyzer {
    pub fn new(summary_sentences: usize, max_tags: usize) -> Self {
        Self {
            summary_sentences,
            max_tags,
        }
    }
}

impl Default for DefaultAnalyzer {
    fn default() -> Self {
        Self::new(SUMMARY_SENTENCES, MAX_TAGS)
    }
}

impl Analyzer for DefaultAnalyzer {
    fn analyze(&self, body: &str, description: &str) -> TextAnalysis {
        TextAnalysis {
            tags: extract_tags(description, self.max_tags),
            summary: summarize(body, self.summary_sentences),
            assessment: assess(body),
        }
    }
}

/// Lower-cased topical words of `text`, most frequent first
fn topical_words(text: &str) -> Vec<String> {
    text::words(text)
        .into_iter()
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() >= 3)
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .filter(|w| !text::is_stop_word(w))
        .collect()
}

fn word_frequencies(words: &[String]) -> HashMap<&str, usize> {
    let mut frequencies = HashMap::new();
    for word in words {
        *frequencies.entry(word.as_str()).or_insert(0) += 1;
    }
    frequencies
}

/// Distinct topical words of `text`, ranked by frequency then first appearance
pub fn extract_tags(text: &str, limit: usize) -> Vec<String> {
    let words = topical_words(text);
    let frequencies = word_frequencies(&words);

    let mut ranked: Vec<(usize, &str)> = Vec::new();
    for (position, word) in words.iter().enumerate() {
        if !ranked.iter().any(|(_, seen)| *seen == word.as_str()) {
            ranked.push((position, word.as_str()));
        }
    }
    ranked.sort_by(|(pos_a, a), (pos_b, b)| {
        frequencies[b]
            .cmp(&frequencies[a])
            .then_with(|| pos_a.cmp(pos_b))
    });

    ranked
        .into_iter()
        .take(limit)
        .map(|(_, word)| word.to_string())
        .collect()
}

/// Picks the `count` most weighted sentences of `text`, in document order
pub fn summarize(text: &str, count: usize) -> Vec<String> {
    let sentences = text::split_sentences(text);
    let words = topical_words(text);
    let frequencies = word_frequencies(&words);

    let mut scored: Vec<(usize, usize)> = sentences
        .iter()
        .enumerate()
        .map(|(index, sentence)| {
            let weight = topical_words(sentence)
                .iter()
                .map(|w| frequencies.get(w.as_str()).copied().unwrap_or(0))
                .sum();
            (index, weight)
        })
        .collect();

    scored.sort_by(|(index_a, weight_a), (index_b, weight_b)| {
        weight_b.cmp(weight_a).then_with(|| index_a.cmp(index_b))
    });

    let mut picked: Vec<usize> = scored.into_iter().take(count).map(|(i, _)| i).collect();
    picked.sort_unstable();

    picked.into_iter().map(|i| sentences[i].clone()).collect()
}
