//! services/api/src/adapters/secondary_llm.rs
//!
//! The optional secondary local provider: a small summarization model served by the same
//! Ollama runtime, driven chunk by chunk through `ChunkedSummarizer`.

use async_trait::async_trait;
use smartdoc_core::summarize::chunked::{ChunkModel, ChunkedSummarizer};
use smartdoc_core::summarize::prompt::build_chunk_prompt;
use smartdoc_core::summarize::SummarizeError;
use std::time::Duration;

use super::local_llm::OllamaClient;

pub const SECONDARY_PROVIDER: &str = "secondary_local";

/// One Ollama model used as a per-chunk condenser.
pub struct OllamaChunkModel {
    client: OllamaClient,
    model: String,
}

impl OllamaChunkModel {
    pub fn new(client: OllamaClient, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl ChunkModel for OllamaChunkModel {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn check_availability(&self) -> Result<(), SummarizeError> {
        self.client.ensure_model(SECONDARY_PROVIDER, &self.model).await
    }

    async fn summarize_chunk(
        &self,
        chunk: &str,
        min_words: usize,
        max_words: usize,
    ) -> Result<String, SummarizeError> {
        // Roughly two tokens per word of output.
        let num_predict = u32::try_from(max_words.saturating_mul(2)).unwrap_or(u32::MAX);
        let reply = self
            .client
            .generate(
                SECONDARY_PROVIDER,
                &self.model,
                &build_chunk_prompt(chunk, min_words, max_words),
                num_predict,
            )
            .await?;

        let text = reply.response.trim();
        if text.is_empty() {
            return Err(SummarizeError::provider(
                SECONDARY_PROVIDER,
                "model returned an empty chunk summary",
            ));
        }
        Ok(text.to_string())
    }
}

/// Builds the secondary provider for the fallback chain.
///
/// `timeout` bounds the whole chunked run; each chunk request is still bounded by the
/// client's own per-request timeout.
pub fn secondary_summarizer(
    client: OllamaClient,
    model: String,
    timeout: Duration,
) -> ChunkedSummarizer<OllamaChunkModel> {
    ChunkedSummarizer::new(SECONDARY_PROVIDER, OllamaChunkModel::new(client, model))
        .with_timeout(timeout)
}
