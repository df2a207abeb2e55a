//! crates/smartdoc_core/src/summarize/chunked.rs
//!
//! Map-reduce summarization for models with a small input window: the document is cut
//! into word-aligned chunks, each chunk is summarized on its own, and the pieces are
//! joined (and condensed once more when the join is still too long).

use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};

use super::{SummarizeError, Summarizer, SummaryMetrics, SummaryResult, DEFAULT_PROVIDER_TIMEOUT};
use crate::domain::SummaryLength;

/// Chunks are closed before they reach this many characters.
pub const MAX_CHUNK_CHARS: usize = 1024;
/// Chunks with fewer words than this are kept verbatim.
pub const MIN_SUMMARIZED_CHUNK_WORDS: usize = 50;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// A model that condenses one passage into a bounded number of words.
#[async_trait]
pub trait ChunkModel: Send + Sync {
    fn model_name(&self) -> &str;

    async fn check_availability(&self) -> Result<(), SummarizeError> {
        Ok(())
    }

    async fn summarize_chunk(
        &self,
        chunk: &str,
        min_words: usize,
        max_words: usize,
    ) -> Result<String, SummarizeError>;
}

pub struct ChunkedSummarizer<M> {
    name: String,
    model: M,
    timeout: Duration,
}

impl<M: ChunkModel> ChunkedSummarizer<M> {
    pub fn new(name: impl Into<String>, model: M) -> Self {
        Self {
            name: name.into(),
            model,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn summarize_chunks(&self, text: &str, length: SummaryLength) -> SummaryResult {
        let normalized = WHITESPACE_RUN.replace_all(text.trim(), " ");
        let chunks = split_into_chunks(&normalized, MAX_CHUNK_CHARS);
        let (min_words, max_words) = length.word_window();

        let mut pieces = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let word_count = chunk.split_whitespace().count();
            if word_count < MIN_SUMMARIZED_CHUNK_WORDS {
                pieces.push(chunk.clone());
                continue;
            }

            let chunk_min = min_words.min(word_count / 4);
            let chunk_max = max_words.min(word_count / 2);
            let result = self.model.summarize_chunk(chunk, chunk_min, chunk_max).await;
            match result {
                Ok(piece) => pieces.push(piece.trim().to_string()),
                Err(e) => {
                    warn!(
                        provider = %self.name,
                        error = %e,
                        "Chunk summarization failed, keeping leading sentences"
                    );
                    pieces.push(leading_sentences(chunk, 3));
                }
            }
        }

        let mut summary = pieces.join(" ");
        if chunks.len() > 1 && summary.split_whitespace().count() > max_words {
            debug!(provider = %self.name, "Condensing joined chunk summaries");
            match self.model.summarize_chunk(&summary, min_words, max_words).await {
                Ok(condensed) => summary = condensed.trim().to_string(),
                Err(e) => {
                    warn!(
                        provider = %self.name,
                        error = %e,
                        "Second pass failed, keeping joined summaries"
                    );
                }
            }
        }

        SummaryResult::success(summary, self.model.model_name(), length).with_metrics(
            SummaryMetrics {
                chunks_processed: Some(chunks.len()),
                ..SummaryMetrics::default()
            },
        )
    }
}

/// Splits whitespace-separated `text` into chunks shorter than `max_chars`.
///
/// A word that would push a chunk to `max_chars` starts the next chunk. A word longer
/// than the limit ends up alone in its chunk; no chunk is ever empty.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        current.push(word);
        current_len += word.chars().count() + 1;

        if current_len >= max_chars {
            let overflow = current.pop().unwrap_or(word);
            if !current.is_empty() {
                chunks.push(current.join(" "));
            }
            current = vec![overflow];
            current_len = overflow.chars().count();
        }
    }

    if !current.is_empty() {
        chunks.push(current.join(" "));
    }
    chunks
}

fn leading_sentences(chunk: &str, count: usize) -> String {
    let mut sentences = chunk.split(". ").take(count).collect::<Vec<_>>().join(". ");
    sentences.push('.');
    sentences
}

#[async_trait]
impl<M: ChunkModel> Summarizer for ChunkedSummarizer<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn check_availability(&self) -> Result<(), SummarizeError> {
        self.model.check_availability().await
    }

    async fn summarize(&self, text: &str, length: SummaryLength) -> SummaryResult {
        if text.trim().is_empty() {
            return SummaryResult::failure(&SummarizeError::EmptyInput, length);
        }
        self.summarize_chunks(text, length).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingModel {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ChunkModel for CountingModel {
        fn model_name(&self) -> &str {
            "counting-model"
        }

        async fn summarize_chunk(
            &self,
            _chunk: &str,
            _min_words: usize,
            max_words: usize,
        ) -> Result<String, SummarizeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SummarizeError::provider("counting-model", "boom"));
            }
            Ok(format!("condensed to {max_words}"))
        }
    }

    fn words(count: usize, word: &str) -> String {
        vec![word; count].join(" ")
    }

    #[test]
    fn chunks_stay_under_the_limit() {
        let text = words(400, "abcdefgh");
        let chunks = split_into_chunks(&text, MAX_CHUNK_CHARS);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() < MAX_CHUNK_CHARS);
        }
        let rejoined: usize = chunks.iter().map(|c| c.split_whitespace().count()).sum();
        assert_eq!(rejoined, 400);
    }

    #[test]
    fn oversized_word_gets_its_own_chunk() {
        let giant = "x".repeat(MAX_CHUNK_CHARS + 10);
        let chunks = split_into_chunks(&format!("{giant} tail"), MAX_CHUNK_CHARS);
        assert_eq!(chunks, vec![giant, "tail".to_string()]);
    }

    #[tokio::test]
    async fn short_documents_are_returned_verbatim() {
        let summarizer = ChunkedSummarizer::new(
            "secondary",
            CountingModel { calls: AtomicUsize::new(0), fail: false },
        );
        let result = summarizer.summarize("A handful of words only.", SummaryLength::Short).await;

        assert!(result.is_success());
        assert_eq!(result.summary_text, "A handful of words only.");
        assert_eq!(result.metrics.chunks_processed, Some(1));
        assert_eq!(summarizer.model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn long_chunks_go_through_the_model() {
        let summarizer = ChunkedSummarizer::new(
            "secondary",
            CountingModel { calls: AtomicUsize::new(0), fail: false },
        );
        let text = words(60, "reading");
        let result = summarizer.summarize(&text, SummaryLength::Short).await;

        assert!(result.is_success());
        // 60 words: max is min(100, 60 / 2).
        assert_eq!(result.summary_text, "condensed to 30");
        assert_eq!(result.provider_used.as_deref(), Some("counting-model"));
    }

    #[tokio::test]
    async fn failed_chunks_fall_back_to_leading_sentences() {
        let summarizer = ChunkedSummarizer::new(
            "secondary",
            CountingModel { calls: AtomicUsize::new(0), fail: true },
        );
        let sentence = words(12, "alpha");
        let text = [sentence.as_str(); 5].join(". ");
        let result = summarizer.summarize(&text, SummaryLength::Medium).await;

        assert!(result.is_success());
        assert_eq!(result.summary_text, [sentence.as_str(); 3].join(". ") + ".");
    }
}
