//! Readability metrics for article bodies

use crate::analysis::text::{count_paragraphs, count_syllables, split_sentences, words};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const WORDS_PER_MINUTE: f64 = 200.0;

/// Readability assessment of an article body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub automated_readability: f64,
    pub coleman_liau: f64,
    pub flesch_kincaid: f64,
    pub num_characters: f64,
    pub num_complex_words: f64,
    pub num_paragraphs: f64,
    pub num_polysyl_words: f64,
    pub num_sentences: f64,
    pub num_syllables: f64,
    pub num_words: f64,
    pub reading_time: String,
}

/// Computes the readability assessment of `text`
pub fn assess(text: &str) -> Assessment {
    let sentences = split_sentences(text);
    let tokens = words(text);

    let mut num_characters = 0usize;
    let mut num_syllables = 0usize;
    let mut num_polysyl_words = 0usize;
    let mut num_complex_words = 0usize;

    for word in &tokens {
        num_characters += word.chars().filter(|c| c.is_alphanumeric()).count();

        let syllables = count_syllables(word);
        num_syllables += syllables;

        if syllables >= 3 {
            num_polysyl_words += 1;
            // proper nouns are not counted as complex
            let capitalized = word.chars().next().is_some_and(char::is_uppercase);
            if !capitalized {
                num_complex_words += 1;
            }
        }
    }

    let num_words = tokens.len() as f64;
    let num_sentences = sentences.len() as f64;
    let num_characters = num_characters as f64;
    let num_syllables = num_syllables as f64;

    let (flesch_kincaid, automated_readability, coleman_liau) =
        if num_words > 0.0 && num_sentences > 0.0 {
            let words_per_sentence = num_words / num_sentences;
            (
                0.39 * words_per_sentence + 11.8 * (num_syllables / num_words) - 15.59,
                4.71 * (num_characters / num_words) + 0.5 * words_per_sentence - 21.43,
                0.0588 * (num_characters / num_words * 100.0)
                    - 0.296 * (num_sentences / num_words * 100.0)
                    - 15.8,
            )
        } else {
            (0.0, 0.0, 0.0)
        };

    Assessment {
        automated_readability,
        coleman_liau,
        flesch_kincaid,
        num_characters,
        num_complex_words: num_complex_words as f64,
        num_paragraphs: count_paragraphs(text) as f64,
        num_polysyl_words: num_polysyl_words as f64,
        num_sentences,
        num_syllables,
        num_words,
        reading_time: humanize_duration(reading_time(num_words)),
    }
}

/// Estimated reading time at 200 words per minute, truncated to whole seconds
pub fn reading_time(num_words: f64) -> Duration {
    let seconds = 60.0 * (num_words / WORDS_PER_MINUTE);
    Duration::from_secs(seconds.max(0.0) as u64)
}

/// Formats a duration as "N seconds", "N min", "H hours M min" or
/// "D days H hours M minutes"
pub fn humanize_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let minutes = total_secs / 60;
    let hours = minutes / 60;

    if total_secs < 60 {
        format!("{} seconds", total_secs)
    } else if minutes < 60 {
        format!("{} min", minutes)
    } else if hours < 24 {
        format!("{} hours {} min", hours, minutes % 60)
    } else {
        format!(
            "{} days {} hours {} minutes",
            hours / 24,
            hours % 24,
            minutes % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assess_counts() {
        let text = "The cat sat on the mat. The dog ran away.\n\nIt was a beautiful afternoon.";
        let assessment = assess(text);

        assert_eq!(assessment.num_sentences, 3.0);
        assert_eq!(assessment.num_words, 15.0);
        assert_eq!(assessment.num_paragraphs, 2.0);
        assert_eq!(assessment.num_polysyl_words, 2.0);
        assert!(assessment.num_syllables >= assessment.num_words);
        assert_eq!(assessment.reading_time, "4 seconds");
    }

    #[test]
    fn test_assess_empty_text() {
        let assessment = assess("");
        assert_eq!(assessment.num_words, 0.0);
        assert_eq!(assessment.flesch_kincaid, 0.0);
        assert_eq!(assessment.reading_time, "0 seconds");
    }

    #[test]
    fn test_simple_text_scores_lower_than_dense_text() {
        let simple = assess("The cat sat. The dog ran. We had fun.");
        let dense = assess(
            "Parliamentary deliberations regarding constitutional amendments \
             necessitated considerable international consultation.",
        );
        assert!(simple.flesch_kincaid < dense.flesch_kincaid);
        assert!(simple.automated_readability < dense.automated_readability);
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time(200.0), Duration::from_secs(60));
        assert_eq!(reading_time(100.0), Duration::from_secs(30));
        assert_eq!(reading_time(0.0), Duration::ZERO);
    }

    #[test]
    fn test_humanize_duration() {
        assert_eq!(humanize_duration(Duration::from_secs(42)), "42 seconds");
        assert_eq!(humanize_duration(Duration::from_secs(5 * 60 + 10)), "5 min");
        assert_eq!(
            humanize_duration(Duration::from_secs(2 * 3600 + 15 * 60)),
            "2 hours 15 min"
        );
        assert_eq!(
            humanize_duration(Duration::from_secs(26 * 3600 + 5 * 60)),
            "1 days 2 hours 5 minutes"
        );
    }
}
