//! crates/smartdoc_core/src/summarize/mod.rs
//!
//! The summarization provider chain and the types every provider shares.
//!
//! A provider never fails with an `Err`: whatever goes wrong inside it is folded into a
//! [`SummaryResult`] whose status is [`ResultStatus::Error`], and the chain moves on to
//! the next provider.

pub mod chain;
pub mod chunked;
pub mod extractive;
pub mod prompt;

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::SummaryLength;

pub use chain::SummarizationChain;
pub use chunked::{ChunkModel, ChunkedSummarizer};
pub use extractive::{ExtractiveSummarizer, EXTRACTIVE_PROVIDER};

/// Bound applied to a provider that does not declare its own.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(60);

//=========================================================================================
// Errors
//=========================================================================================

/// Everything that can go wrong while producing a summary.
///
/// Only `EmptyInput` is ever visible to callers of the chain; the other variants are
/// absorbed by falling through to the next provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SummarizeError {
    #[error("No document text provided for summarization.")]
    EmptyInput,
    #[error("{provider} failed: {reason}")]
    Provider { provider: String, reason: String },
    #[error("{provider} is not configured: {reason}")]
    Configuration { provider: String, reason: String },
    #[error("{provider} timed out after {}s", .after.as_secs())]
    Timeout { provider: String, after: Duration },
}

impl SummarizeError {
    pub fn provider(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        SummarizeError::Provider {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn configuration(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        SummarizeError::Configuration {
            provider: provider.into(),
            reason: reason.into(),
        }
    }
}

//=========================================================================================
// Results
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    Success,
    Error,
}

impl ResultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultStatus::Success => "success",
            ResultStatus::Error => "error",
        }
    }
}

/// One provider step taken by the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderAttempt {
    pub provider: String,
    pub succeeded: bool,
    pub reason: Option<String>,
}

/// Provider-specific figures attached to a result. Every field is optional because no
/// provider reports all of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryMetrics {
    pub tokens_used: Option<u32>,
    pub processing_time_secs: Option<f64>,
    pub chunks_processed: Option<usize>,
    pub sentences_selected: Option<usize>,
    /// Filled in by the chain, in the order providers were tried.
    pub attempts: Vec<ProviderAttempt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryResult {
    /// The summary on success, a human-readable reason otherwise.
    pub summary_text: String,
    pub status: ResultStatus,
    pub provider_used: Option<String>,
    pub length: SummaryLength,
    pub metrics: SummaryMetrics,
}

impl SummaryResult {
    pub fn success(
        summary_text: impl Into<String>,
        provider_used: impl Into<String>,
        length: SummaryLength,
    ) -> Self {
        Self {
            summary_text: summary_text.into(),
            status: ResultStatus::Success,
            provider_used: Some(provider_used.into()),
            length,
            metrics: SummaryMetrics::default(),
        }
    }

    pub fn failure(error: &SummarizeError, length: SummaryLength) -> Self {
        Self {
            summary_text: error.to_string(),
            status: ResultStatus::Error,
            provider_used: None,
            length,
            metrics: SummaryMetrics::default(),
        }
    }

    pub fn with_metrics(mut self, metrics: SummaryMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ResultStatus::Success
    }
}

//=========================================================================================
// Provider Port
//=========================================================================================

/// A summarization backend.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Short identifier used in logs and attempt records.
    fn name(&self) -> &str;

    /// Upper bound on a single attempt, availability check included.
    fn timeout(&self) -> Duration {
        DEFAULT_PROVIDER_TIMEOUT
    }

    /// Cheap advisory probe run by the chain before `summarize`. A failure skips the
    /// provider; a success does not guarantee `summarize` will succeed.
    async fn check_availability(&self) -> Result<(), SummarizeError> {
        Ok(())
    }

    /// Produces a summary. Must not panic; failures are reported through the result.
    async fn summarize(&self, text: &str, length: SummaryLength) -> SummaryResult;
}
