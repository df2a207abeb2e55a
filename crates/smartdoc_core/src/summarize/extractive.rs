//! crates/smartdoc_core/src/summarize/extractive.rs
//!
//! Frequency-scored sentence extraction. This is the terminal provider of the chain:
//! it is deterministic, needs no network, and always succeeds on non-empty text.

use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;

use super::{SummarizeError, Summarizer, SummaryMetrics, SummaryResult};
use crate::domain::SummaryLength;

pub const EXTRACTIVE_PROVIDER: &str = "extractive_fallback";

const SENTENCE_SEPARATOR: &str = ". ";
const MIN_FREQUENCY_WORD_CHARS: usize = 4;
const SHORT_SENTENCE_WORDS: usize = 5;
const LONG_SENTENCE_WORDS: usize = 50;
const SHORT_SENTENCE_PENALTY: i64 = -10;
const LONG_SENTENCE_PENALTY: i64 = -5;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w]").expect("non-word pattern is valid"));

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractiveSummarizer;

/// The sentences picked for a summary, already joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extract {
    pub text: String,
    pub sentences_selected: usize,
}

impl ExtractiveSummarizer {
    pub fn new() -> Self {
        Self
    }

    /// Selects the highest-scoring sentences of `text` in document order.
    ///
    /// Returns `None` when `text` is empty or only whitespace.
    pub fn extract(&self, text: &str, length: SummaryLength) -> Option<Extract> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        let normalized = WHITESPACE_RUN.replace_all(trimmed, " ");
        let sentences: Vec<&str> = normalized.split(SENTENCE_SEPARATOR).collect();
        let frequencies = word_frequencies(&normalized);

        // (score, position) for every sentence.
        let mut scored: Vec<(i64, usize)> = sentences
            .iter()
            .enumerate()
            .map(|(position, sentence)| (score_sentence(sentence, &frequencies), position))
            .collect();

        // Highest score first; among equal scores the later sentence wins.
        scored.sort_by(|a, b| b.cmp(a));

        let selected_count = length.sentence_budget().min(sentences.len());
        let mut selected: Vec<usize> = scored
            .iter()
            .take(selected_count)
            .map(|&(_, position)| position)
            .collect();
        selected.sort_unstable();

        let mut summary = selected
            .iter()
            .map(|&position| sentences[position])
            .collect::<Vec<_>>()
            .join(SENTENCE_SEPARATOR);
        if !summary.ends_with('.') {
            summary.push('.');
        }

        Some(Extract {
            text: summary,
            sentences_selected: selected_count,
        })
    }
}

fn normalize_word(word: &str) -> String {
    NON_WORD.replace_all(&word.to_lowercase(), "").into_owned()
}

fn word_frequencies(text: &str) -> HashMap<String, i64> {
    let mut frequencies = HashMap::new();
    for word in text.split_whitespace() {
        let word = normalize_word(word);
        if word.chars().count() >= MIN_FREQUENCY_WORD_CHARS {
            *frequencies.entry(word).or_insert(0) += 1;
        }
    }
    frequencies
}

fn score_sentence(sentence: &str, frequencies: &HashMap<String, i64>) -> i64 {
    let words: Vec<&str> = sentence.split_whitespace().collect();
    let score: i64 = words
        .iter()
        .map(|word| frequencies.get(&normalize_word(word)).copied().unwrap_or(0))
        .sum();

    let penalty = if words.len() < SHORT_SENTENCE_WORDS {
        SHORT_SENTENCE_PENALTY
    } else if words.len() > LONG_SENTENCE_WORDS {
        LONG_SENTENCE_PENALTY
    } else {
        0
    };
    score + penalty
}

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    fn name(&self) -> &str {
        EXTRACTIVE_PROVIDER
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(5)
    }

    async fn summarize(&self, text: &str, length: SummaryLength) -> SummaryResult {
        match self.extract(text, length) {
            Some(extract) => SummaryResult::success(extract.text, EXTRACTIVE_PROVIDER, length)
                .with_metrics(SummaryMetrics {
                    sentences_selected: Some(extract.sentences_selected),
                    ..SummaryMetrics::default()
                }),
            None => SummaryResult::failure(&SummarizeError::EmptyInput, length),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_sentences(count: usize) -> String {
        (0..count)
            .map(|i| format!("Sentence number {i} talks about reading documents carefully"))
            .collect::<Vec<_>>()
            .join(". ")
    }

    #[test]
    fn short_summary_keeps_top_three_in_document_order() {
        let text = "Cats are mammals. Cats have fur. The quick brown fox jumps. Foxes are wild.";
        let extract = ExtractiveSummarizer::new()
            .extract(text, SummaryLength::Short)
            .unwrap();

        assert_eq!(extract.sentences_selected, 3);
        assert_eq!(
            extract.text,
            "Cats are mammals. Cats have fur. The quick brown fox jumps."
        );
    }

    #[test]
    fn long_summary_selects_eight_of_many() {
        let text = numbered_sentences(12);
        let extract = ExtractiveSummarizer::new()
            .extract(&text, SummaryLength::Long)
            .unwrap();

        assert_eq!(extract.sentences_selected, 8);
        assert_eq!(extract.text.matches("Sentence number").count(), 8);
    }

    #[test]
    fn selection_is_capped_by_available_sentences() {
        let text = "Rust programs compile to native code quickly. \
                    Ownership rules prevent data races at compile time.";
        for length in [SummaryLength::Short, SummaryLength::Medium, SummaryLength::Long] {
            let extract = ExtractiveSummarizer::new().extract(text, length).unwrap();
            assert_eq!(extract.sentences_selected, 2);
            assert_eq!(extract.text, text);
        }
    }

    #[test]
    fn ties_prefer_later_sentences_then_restore_order() {
        let text = numbered_sentences(6);
        let extract = ExtractiveSummarizer::new()
            .extract(&text, SummaryLength::Short)
            .unwrap();

        // Every sentence scores the same, so the last three win.
        assert!(extract.text.starts_with("Sentence number 3"));
        assert!(extract.text.contains("Sentence number 4"));
        assert!(extract
            .text
            .ends_with("Sentence number 5 talks about reading documents carefully."));
    }

    #[test]
    fn very_long_sentences_are_penalized() {
        let long_sentence = vec!["filler"; 60].join(" ");
        let text = format!(
            "{long_sentence}. Budget planning needs careful review today. \
             Budget review happens every quarter here"
        );
        let extract = ExtractiveSummarizer::new()
            .extract(&text, SummaryLength::Short)
            .unwrap();
        // Three sentences exist, so all are selected regardless of score.
        assert_eq!(extract.sentences_selected, 3);

        let frequencies = word_frequencies(&text);
        assert_eq!(frequencies.get("filler"), Some(&60));
        assert_eq!(score_sentence(&long_sentence, &frequencies), 60 * 60 - 5);
    }

    #[test]
    fn whitespace_is_collapsed_before_splitting() {
        let text = "First   line\nof text here today.\n\nSecond\tline of text here today.";
        let extract = ExtractiveSummarizer::new()
            .extract(text, SummaryLength::Medium)
            .unwrap();
        assert_eq!(
            extract.text,
            "First line of text here today. Second line of text here today."
        );
    }

    #[test]
    fn output_is_deterministic() {
        let text = numbered_sentences(10);
        let summarizer = ExtractiveSummarizer::new();
        let first = summarizer.extract(&text, SummaryLength::Medium);
        let second = summarizer.extract(&text, SummaryLength::Medium);
        assert_eq!(first, second);
    }

    #[test]
    fn blank_text_yields_nothing() {
        assert!(ExtractiveSummarizer::new()
            .extract("   \n\t ", SummaryLength::Short)
            .is_none());
    }

    #[tokio::test]
    async fn summarize_reports_provider_and_sentence_count() {
        let result = ExtractiveSummarizer::new()
            .summarize(
                "One two three four five six. Seven eight nine ten eleven.",
                SummaryLength::Long,
            )
            .await;

        assert!(result.is_success());
        assert_eq!(result.provider_used.as_deref(), Some(EXTRACTIVE_PROVIDER));
        assert_eq!(result.metrics.sentences_selected, Some(2));
    }
}
