//! services/api/src/adapters/cloud_llm.rs
//!
//! This module contains the adapter for the cloud summarization LLM.
//! It implements the `Summarizer` port from the `core` crate on top of OpenAI chat
//! completions, walking a list of models until one of them answers.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use smartdoc_core::domain::SummaryLength;
use smartdoc_core::summarize::prompt::{build_prompt, SYSTEM_PROMPT, TEMPERATURE};
use smartdoc_core::summarize::{SummarizeError, Summarizer, SummaryMetrics, SummaryResult};
use std::time::Duration;
use tracing::warn;

pub const CLOUD_PROVIDER: &str = "openai";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `Summarizer` using OpenAI chat completions.
///
/// Without a client (no API key configured) the provider reports itself unavailable.
#[derive(Clone)]
pub struct OpenAiSummarizer {
    client: Option<Client<OpenAIConfig>>,
    models: Vec<String>,
    timeout: Duration,
}

/// A successful completion from one model.
struct Completion {
    text: String,
    total_tokens: Option<u32>,
}

impl OpenAiSummarizer {
    /// Creates a new `OpenAiSummarizer` that tries `models` in order.
    pub fn new(
        client: Option<Client<OpenAIConfig>>,
        models: Vec<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            models,
            timeout,
        }
    }

    async fn complete(
        &self,
        client: &Client<OpenAIConfig>,
        model: &str,
        text: &str,
        length: SummaryLength,
    ) -> Result<Completion, OpenAIError> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(build_prompt(text, length))
                .build()?
                .into(),
        ];

        #[allow(deprecated)]
        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .max_tokens(length.max_tokens())
            .temperature(TEMPERATURE)
            .build()?;

        let response = client.chat().create(request).await?;
        let total_tokens = response.usage.as_ref().map(|usage| usage.total_tokens);

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        Ok(Completion { text, total_tokens })
    }
}

//=========================================================================================
// `Summarizer` Trait Implementation
//=========================================================================================

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    fn name(&self) -> &str {
        CLOUD_PROVIDER
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn check_availability(&self) -> Result<(), SummarizeError> {
        if self.client.is_none() {
            return Err(SummarizeError::configuration(
                CLOUD_PROVIDER,
                "OpenAI API key not configured. Set OPENAI_API_KEY to enable it.",
            ));
        }
        if self.models.is_empty() {
            return Err(SummarizeError::configuration(CLOUD_PROVIDER, "no models configured"));
        }
        Ok(())
    }

    async fn summarize(&self, text: &str, length: SummaryLength) -> SummaryResult {
        let Some(client) = self.client.as_ref() else {
            return SummaryResult::failure(
                &SummarizeError::configuration(CLOUD_PROVIDER, "OpenAI API key not configured."),
                length,
            );
        };

        let mut last_error: Option<String> = None;
        for model in &self.models {
            match self.complete(client, model, text, length).await {
                Ok(completion) if !completion.text.is_empty() => {
                    return SummaryResult::success(completion.text, model.as_str(), length)
                        .with_metrics(SummaryMetrics {
                            tokens_used: completion.total_tokens,
                            ..SummaryMetrics::default()
                        });
                }
                Ok(_) => {
                    warn!(%model, "Model returned an empty completion");
                    last_error = Some(format!("{model} returned an empty completion"));
                }
                Err(e) => {
                    warn!(%model, error = %e, "Model failed, trying the next one");
                    last_error = Some(e.to_string());
                }
            }
        }

        let mut reason = "Failed to generate summary with all available models.".to_string();
        if let Some(last) = last_error {
            reason.push_str(&format!(" Last error: {last}"));
        }
        SummaryResult::failure(&SummarizeError::provider(CLOUD_PROVIDER, reason), length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use smartdoc_core::summarize::ResultStatus;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion_body(model: &str, content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": model,
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 40, "completion_tokens": 12, "total_tokens": 52 }
        })
    }

    fn error_body(message: &str) -> serde_json::Value {
        json!({
            "error": {
                "message": message,
                "type": "invalid_request_error",
                "param": null,
                "code": "model_not_found"
            }
        })
    }

    fn summarizer_for(server: &MockServer, models: &[&str]) -> OpenAiSummarizer {
        let config = OpenAIConfig::new()
            .with_api_key("sk-test")
            .with_api_base(server.uri());
        OpenAiSummarizer::new(
            Some(Client::with_config(config)),
            models.iter().map(|m| m.to_string()).collect(),
            Duration::from_secs(10),
        )
    }

    #[tokio::test]
    async fn first_model_success_is_returned() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body("gpt-4o-mini", "  Cloud summary.  ")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = summarizer_for(&server, &["gpt-4o-mini", "gpt-4"])
            .summarize("Some document.", SummaryLength::Short)
            .await;

        assert!(result.is_success());
        assert_eq!(result.summary_text, "Cloud summary.");
        assert_eq!(result.provider_used.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(result.metrics.tokens_used, Some(52));
    }

    #[tokio::test]
    async fn failing_model_falls_back_to_next() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({ "model": "gpt-4o-mini" })))
            .respond_with(ResponseTemplate::new(404).set_body_json(error_body("no such model")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "model": "gpt-3.5-turbo",
                "temperature": 0.3,
                "max_tokens": 1000
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body("gpt-3.5-turbo", "Backup summary.")),
            )
            .mount(&server)
            .await;

        let result = summarizer_for(&server, &["gpt-4o-mini", "gpt-3.5-turbo"])
            .summarize("Some document.", SummaryLength::Long)
            .await;

        assert!(result.is_success());
        assert_eq!(result.provider_used.as_deref(), Some("gpt-3.5-turbo"));
    }

    #[tokio::test]
    async fn all_models_failing_preserves_last_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(error_body("quota exhausted")))
            .expect(2)
            .mount(&server)
            .await;

        let result = summarizer_for(&server, &["gpt-4o-mini", "gpt-4"])
            .summarize("Some document.", SummaryLength::Medium)
            .await;

        assert_eq!(result.status, ResultStatus::Error);
        assert!(result.summary_text.contains("all available models"));
        assert!(result.summary_text.contains("quota exhausted"));
    }

    #[tokio::test]
    async fn empty_completions_count_as_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion_body("gpt-4o-mini", "")),
            )
            .mount(&server)
            .await;

        let result = summarizer_for(&server, &["gpt-4o-mini"])
            .summarize("Some document.", SummaryLength::Medium)
            .await;

        assert_eq!(result.status, ResultStatus::Error);
        assert!(result.summary_text.contains("empty completion"));
    }

    #[tokio::test]
    async fn missing_key_is_a_configuration_failure() {
        let summarizer =
            OpenAiSummarizer::new(None, vec!["gpt-4o-mini".into()], Duration::from_secs(1));

        assert!(matches!(
            summarizer.check_availability().await,
            Err(SummarizeError::Configuration { .. })
        ));
        let result = summarizer.summarize("text", SummaryLength::Short).await;
        assert_eq!(result.status, ResultStatus::Error);
    }
}
