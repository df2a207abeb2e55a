//! crates/smartdoc_core/src/summarize/chain.rs
//!
//! Drives the ordered list of providers. Each provider gets one bounded attempt; the
//! first success wins, and the extractive summarizer closes the chain so that any
//! non-empty document ends up with a summary.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{info, warn};

use super::{
    ExtractiveSummarizer, ProviderAttempt, SummarizeError, Summarizer, SummaryResult,
};
use crate::domain::SummaryLength;

pub struct SummarizationChain {
    providers: Vec<Arc<dyn Summarizer>>,
    fallback: ExtractiveSummarizer,
}

impl SummarizationChain {
    /// Creates a chain that tries `providers` in order before the extractive fallback.
    pub fn new(providers: Vec<Arc<dyn Summarizer>>) -> Self {
        Self {
            providers,
            fallback: ExtractiveSummarizer::new(),
        }
    }

    /// Provider names in the order they are tried, fallback included.
    pub fn provider_names(&self) -> Vec<String> {
        self.providers
            .iter()
            .map(|p| p.name().to_string())
            .chain(std::iter::once(self.fallback.name().to_string()))
            .collect()
    }

    /// Summarizes `text`. Returns an error result only when `text` is blank.
    pub async fn summarize(&self, text: &str, length: SummaryLength) -> SummaryResult {
        if text.trim().is_empty() {
            warn!("Rejected summarization request with empty document text");
            return SummaryResult::failure(&SummarizeError::EmptyInput, length);
        }

        let mut attempts = Vec::with_capacity(self.providers.len() + 1);

        for provider in &self.providers {
            let name = provider.name().to_string();
            info!(provider = %name, length = %length, "Trying summarization provider");

            let result = attempt(provider.as_ref(), text, length).await;
            if result.is_success() {
                info!(
                    provider = %name,
                    model = ?result.provider_used,
                    "Summarization provider succeeded"
                );
                attempts.push(ProviderAttempt {
                    provider: name,
                    succeeded: true,
                    reason: None,
                });
                return with_attempts(result, attempts);
            }

            warn!(
                provider = %name,
                reason = %result.summary_text,
                "Summarization provider failed, falling through"
            );
            attempts.push(ProviderAttempt {
                provider: name,
                succeeded: false,
                reason: Some(result.summary_text),
            });
        }

        info!("Using extractive fallback summarization");
        let result = self.fallback.summarize(text, length).await;
        attempts.push(ProviderAttempt {
            provider: self.fallback.name().to_string(),
            succeeded: result.is_success(),
            reason: None,
        });
        with_attempts(result, attempts)
    }
}

/// One bounded attempt: availability probe, then the summary itself.
async fn attempt(provider: &dyn Summarizer, text: &str, length: SummaryLength) -> SummaryResult {
    let budget = provider.timeout();
    let run = async {
        if let Err(e) = provider.check_availability().await {
            return SummaryResult::failure(&e, length);
        }
        provider.summarize(text, length).await
    };

    match tokio::time::timeout(budget, AssertUnwindSafe(run).catch_unwind()).await {
        Ok(Ok(result)) if result.is_success() && result.summary_text.trim().is_empty() => {
            SummaryResult::failure(
                &SummarizeError::provider(provider.name(), "returned an empty summary"),
                length,
            )
        }
        Ok(Ok(result)) => result,
        Ok(Err(_)) => SummaryResult::failure(
            &SummarizeError::provider(provider.name(), "panicked during summarization"),
            length,
        ),
        Err(_) => SummaryResult::failure(
            &SummarizeError::Timeout {
                provider: provider.name().to_string(),
                after: budget,
            },
            length,
        ),
    }
}

fn with_attempts(mut result: SummaryResult, attempts: Vec<ProviderAttempt>) -> SummaryResult {
    result.metrics.attempts = attempts;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedSummarizer;
    use crate::summarize::{ResultStatus, EXTRACTIVE_PROVIDER};
    use std::time::Duration;

    const TEXT: &str = "Solar panels convert sunlight into electricity. \
                        Batteries store the surplus for the night. \
                        Grid operators balance supply and demand.";

    fn chain_of(providers: &[&Arc<ScriptedSummarizer>]) -> SummarizationChain {
        SummarizationChain::new(
            providers
                .iter()
                .map(|p| Arc::clone(*p) as Arc<dyn Summarizer>)
                .collect(),
        )
    }

    #[tokio::test]
    async fn empty_input_is_rejected_before_any_provider() {
        let cloud = Arc::new(ScriptedSummarizer::succeeding("cloud", "summary"));
        let chain = chain_of(&[&cloud]);

        let result = chain.summarize("  \n\t", SummaryLength::Short).await;

        assert_eq!(result.status, ResultStatus::Error);
        assert_eq!(result.summary_text, SummarizeError::EmptyInput.to_string());
        assert_eq!(cloud.calls(), 0);
        assert!(result.metrics.attempts.is_empty());
    }

    #[tokio::test]
    async fn first_success_wins() {
        let cloud = Arc::new(ScriptedSummarizer::succeeding("cloud", "cloud summary"));
        let local = Arc::new(ScriptedSummarizer::succeeding("local", "local summary"));
        let chain = chain_of(&[&cloud, &local]);

        let result = chain.summarize(TEXT, SummaryLength::Medium).await;

        assert!(result.is_success());
        assert_eq!(result.summary_text, "cloud summary");
        assert_eq!(local.calls(), 0);
        assert_eq!(result.metrics.attempts.len(), 1);
    }

    #[tokio::test]
    async fn cloud_failure_falls_through_to_local_once() {
        let cloud = Arc::new(ScriptedSummarizer::failing("cloud", "all models failed"));
        let local = Arc::new(ScriptedSummarizer::succeeding("local", "local summary"));
        let chain = chain_of(&[&cloud, &local]);

        let result = chain.summarize(TEXT, SummaryLength::Long).await;

        assert!(result.is_success());
        assert_eq!(result.summary_text, "local summary");
        assert_eq!(cloud.calls(), 1);
        assert_eq!(local.calls(), 1);

        let attempts = &result.metrics.attempts;
        assert_eq!(attempts[0].provider, "cloud");
        assert!(!attempts[0].succeeded);
        assert!(attempts[0].reason.as_deref().unwrap().contains("all models failed"));
        assert!(attempts[1].succeeded);
    }

    #[tokio::test]
    async fn unavailable_providers_are_skipped() {
        let local = Arc::new(ScriptedSummarizer::unavailable("local", "service not running"));
        let chain = chain_of(&[&local]);

        let result = chain.summarize(TEXT, SummaryLength::Short).await;

        assert!(result.is_success());
        assert_eq!(result.provider_used.as_deref(), Some(EXTRACTIVE_PROVIDER));
        assert_eq!(local.calls(), 0);
        assert!(result.metrics.attempts[0]
            .reason
            .as_deref()
            .unwrap()
            .contains("service not running"));
    }

    #[tokio::test]
    async fn all_failures_end_in_extractive_success() {
        let cloud = Arc::new(ScriptedSummarizer::failing("cloud", "401"));
        let local = Arc::new(ScriptedSummarizer::failing("local", "connection refused"));
        let secondary = Arc::new(ScriptedSummarizer::failing("secondary", "not installed"));
        let chain = chain_of(&[&cloud, &local, &secondary]);

        let result = chain.summarize(TEXT, SummaryLength::Short).await;

        assert!(result.is_success());
        assert_eq!(result.provider_used.as_deref(), Some(EXTRACTIVE_PROVIDER));
        assert_eq!(result.metrics.sentences_selected, Some(3));
        assert_eq!(result.metrics.attempts.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_providers_time_out() {
        let slow = Arc::new(ScriptedSummarizer::hanging("slow", Duration::from_secs(2)));
        let local = Arc::new(ScriptedSummarizer::succeeding("local", "local summary"));
        let chain = chain_of(&[&slow, &local]);

        let result = chain.summarize(TEXT, SummaryLength::Medium).await;

        assert_eq!(result.summary_text, "local summary");
        assert!(result.metrics.attempts[0]
            .reason
            .as_deref()
            .unwrap()
            .contains("timed out after 2s"));
    }

    #[tokio::test]
    async fn blank_success_is_treated_as_failure() {
        let cloud = Arc::new(ScriptedSummarizer::succeeding("cloud", "   "));
        let chain = chain_of(&[&cloud]);

        let result = chain.summarize(TEXT, SummaryLength::Medium).await;

        assert_eq!(result.provider_used.as_deref(), Some(EXTRACTIVE_PROVIDER));
    }

    #[test]
    fn provider_names_end_with_fallback() {
        let cloud = Arc::new(ScriptedSummarizer::succeeding("cloud", "x"));
        let chain = chain_of(&[&cloud]);
        assert_eq!(chain.provider_names(), vec!["cloud", EXTRACTIVE_PROVIDER]);
    }
}
