pub mod cloud_llm;
pub mod db;
pub mod email;
pub mod extractor;
pub mod local_llm;
pub mod secondary_llm;

pub use cloud_llm::OpenAiSummarizer;
pub use db::DbAdapter;
pub use email::SendGridEmailAdapter;
pub use extractor::DocumentExtractor;
pub use local_llm::{OllamaClient, OllamaSummarizer};

use async_openai::{config::OpenAIConfig, Client};
use smartdoc_core::summarize::{SummarizationChain, Summarizer};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ApiError;

/// Assembles the provider chain in priority order: cloud, local, then the optional
/// secondary local model. The extractive fallback is always appended by the chain.
pub fn build_summarization_chain(config: &Config) -> Result<SummarizationChain, ApiError> {
    let openai_client = match config.openai_api_key.as_deref() {
        Some(key) => {
            let mut openai_config = OpenAIConfig::new().with_api_key(key);
            if let Some(base) = config.openai_api_base.as_deref() {
                openai_config = openai_config.with_api_base(base);
            }
            Some(Client::with_config(openai_config))
        }
        None => {
            warn!("OPENAI_API_KEY not set, the cloud provider will be skipped");
            None
        }
    };
    let cloud = OpenAiSummarizer::new(
        openai_client,
        config.cloud_models.clone(),
        config.cloud_timeout,
    );

    let ollama_client = OllamaClient::new(&config.ollama_base_url, config.local_timeout)
        .map_err(|e| ApiError::Internal(format!("Failed to build the Ollama HTTP client: {e}")))?;
    let local = OllamaSummarizer::new(ollama_client.clone(), config.ollama_model.clone());

    let mut providers: Vec<Arc<dyn Summarizer>> = vec![Arc::new(cloud), Arc::new(local)];
    if config.secondary_local_enabled {
        providers.push(Arc::new(secondary_llm::secondary_summarizer(
            ollama_client,
            config.secondary_local_model.clone(),
            config.secondary_local_timeout,
        )));
    }

    let chain = SummarizationChain::new(providers);
    info!(providers = ?chain.provider_names(), "Summarization chain ready");
    Ok(chain)
}
