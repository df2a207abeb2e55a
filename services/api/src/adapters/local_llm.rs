//! services/api/src/adapters/local_llm.rs
//!
//! This module contains the adapter for the local LLM served by Ollama.
//! It implements the `Summarizer` port by issuing HTTP requests directly to the
//! runtime's `/api/tags` and `/api/generate` endpoints.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use smartdoc_core::domain::SummaryLength;
use smartdoc_core::summarize::prompt::{build_prompt, TEMPERATURE};
use smartdoc_core::summarize::{SummarizeError, Summarizer, SummaryMetrics, SummaryResult};
use std::time::Duration;
use tracing::debug;

pub const LOCAL_PROVIDER: &str = "ollama";

/// Bound on the model-listing probe, independent of the generation timeout.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

//=========================================================================================
// Ollama HTTP Client
//=========================================================================================

/// A thin client for the parts of the Ollama API the summarizers use.
#[derive(Clone)]
pub struct OllamaClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

/// The non-streaming reply of `/api/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub eval_count: Option<u32>,
    /// Nanoseconds.
    #[serde(default)]
    pub total_duration: Option<u64>,
}

impl OllamaClient {
    /// Creates a client whose generation requests give up after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent("smartdoc/summary")
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn map_request_error(&self, provider: &str, error: reqwest::Error) -> SummarizeError {
        if error.is_timeout() {
            SummarizeError::Timeout {
                provider: provider.to_string(),
                after: self.timeout,
            }
        } else if error.is_connect() {
            SummarizeError::configuration(
                provider,
                format!(
                    "Ollama not reachable at {} (start it with `ollama serve`): {error}",
                    self.base_url
                ),
            )
        } else {
            SummarizeError::provider(provider, format!("Error connecting to Ollama: {error}"))
        }
    }

    /// Names of the models pulled into the local runtime.
    pub async fn list_models(&self, provider: &str) -> Result<Vec<String>, SummarizeError> {
        let response = self
            .http
            .get(format!("{}/api/tags", self.base_url))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map_err(|e| self.map_request_error(provider, e))?;

        if !response.status().is_success() {
            return Err(SummarizeError::configuration(
                provider,
                format!("Ollama responded with status {}", response.status()),
            ));
        }

        let tags: TagsResponse = response.json().await.map_err(|e| {
            SummarizeError::provider(provider, format!("Malformed model list from Ollama: {e}"))
        })?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Fails unless `model` is available in the local runtime.
    pub async fn ensure_model(&self, provider: &str, model: &str) -> Result<(), SummarizeError> {
        let models = self.list_models(provider).await?;
        if models.iter().any(|m| m == model) {
            debug!(%provider, %model, "Ollama model available");
            Ok(())
        } else {
            Err(SummarizeError::configuration(
                provider,
                format!("Ollama connected, but {model} not found. Available models: {models:?}"),
            ))
        }
    }

    /// Runs a single non-streaming generation.
    pub async fn generate(
        &self,
        provider: &str,
        model: &str,
        prompt: &str,
        num_predict: u32,
    ) -> Result<GenerateResponse, SummarizeError> {
        let payload = json!({
            "model": model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": TEMPERATURE,
                "num_predict": num_predict,
            }
        });

        let response = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.map_request_error(provider, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizeError::provider(
                provider,
                format!("Ollama request failed with status {status}: {body}"),
            ));
        }

        response.json::<GenerateResponse>().await.map_err(|e| {
            SummarizeError::provider(provider, format!("Malformed Ollama response: {e}"))
        })
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `Summarizer` with a model served by a local Ollama.
#[derive(Clone)]
pub struct OllamaSummarizer {
    client: OllamaClient,
    model: String,
}

impl OllamaSummarizer {
    pub fn new(client: OllamaClient, model: String) -> Self {
        Self { client, model }
    }

    async fn generate_summary(
        &self,
        text: &str,
        length: SummaryLength,
    ) -> Result<SummaryResult, SummarizeError> {
        let reply = self
            .client
            .generate(LOCAL_PROVIDER, &self.model, &build_prompt(text, length), length.max_tokens())
            .await?;

        let summary = reply.response.trim();
        if summary.is_empty() {
            return Err(SummarizeError::provider(LOCAL_PROVIDER, "Ollama returned empty response"));
        }

        Ok(
            SummaryResult::success(summary, format!("ollama/{}", self.model), length).with_metrics(
                SummaryMetrics {
                    tokens_used: reply.eval_count,
                    processing_time_secs: reply
                        .total_duration
                        .map(|ns| ns as f64 / 1_000_000_000.0),
                    ..SummaryMetrics::default()
                },
            ),
        )
    }
}

//=========================================================================================
// `Summarizer` Trait Implementation
//=========================================================================================

#[async_trait]
impl Summarizer for OllamaSummarizer {
    fn name(&self) -> &str {
        LOCAL_PROVIDER
    }

    fn timeout(&self) -> Duration {
        self.client.timeout() + PROBE_TIMEOUT
    }

    async fn check_availability(&self) -> Result<(), SummarizeError> {
        self.client.ensure_model(LOCAL_PROVIDER, &self.model).await
    }

    async fn summarize(&self, text: &str, length: SummaryLength) -> SummaryResult {
        self.generate_summary(text, length)
            .await
            .unwrap_or_else(|e| SummaryResult::failure(&e, length))
    }
}
