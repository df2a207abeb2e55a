//! crates/smartdoc_core/src/workflow.rs
//!
//! The summarize-a-document use case: load the document, refuse to summarize it
//! twice, run the provider chain, persist the summary and notify the owner.

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{NewSummary, Summary, SummaryLength, SummaryStatus, User};
use crate::notification::SummaryNotification;
use crate::ports::{DatabaseService, EmailService, PortResult};
use crate::summarize::SummarizationChain;

/// What happened to a summarize request.
#[derive(Debug, Clone)]
pub enum SummarizeOutcome {
    Completed {
        summary: Summary,
        provider_used: Option<String>,
    },
    /// The document already had a summary; nothing was generated.
    AlreadyExists { summary_id: Uuid },
    /// The chain could not produce a summary. Nothing was stored.
    Failed { reason: String },
}

/// How long a summary notification may take before it is abandoned.
pub const DEFAULT_NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct SummaryWorkflow {
    db: Arc<dyn DatabaseService>,
    chain: Arc<SummarizationChain>,
    email: Arc<dyn EmailService>,
    notification_timeout: Duration,
}

impl SummaryWorkflow {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        chain: Arc<SummarizationChain>,
        email: Arc<dyn EmailService>,
    ) -> Self {
        Self {
            db,
            chain,
            email,
            notification_timeout: DEFAULT_NOTIFICATION_TIMEOUT,
        }
    }

    pub fn with_notification_timeout(mut self, timeout: Duration) -> Self {
        self.notification_timeout = timeout;
        self
    }

    /// Summarizes one of `user`'s documents.
    ///
    /// Fails with `PortError::NotFound` if the document does not exist or belongs to
    /// someone else. The existence check and the insert are not atomic: two
    /// concurrent requests for the same document can both create a summary.
    pub async fn summarize_document(
        &self,
        user: &User,
        document_id: Uuid,
        length: SummaryLength,
    ) -> PortResult<SummarizeOutcome> {
        let document = self.db.get_document(document_id, user.id).await?;

        if let Some(existing) = self.db.get_summary_by_document(document_id, user.id).await? {
            info!(%document_id, summary_id = %existing.id, "Summary already exists");
            return Ok(SummarizeOutcome::AlreadyExists {
                summary_id: existing.id,
            });
        }

        let result = self.chain.summarize(&document.original_text, length).await;
        if !result.is_success() {
            warn!(%document_id, reason = %result.summary_text, "Summarization failed");
            return Ok(SummarizeOutcome::Failed {
                reason: result.summary_text,
            });
        }

        let summary = self
            .db
            .create_summary(&NewSummary {
                document_id,
                summary_text: result.summary_text,
                summary_length: length,
                status: SummaryStatus::Completed,
            })
            .await?;
        info!(
            %document_id,
            summary_id = %summary.id,
            provider = ?result.provider_used,
            "Summary stored"
        );

        if user.email_notifications {
            self.notify(user, document_id, &document.filename, &summary.summary_text)
                .await;
        }

        Ok(SummarizeOutcome::Completed {
            summary,
            provider_used: result.provider_used,
        })
    }

    /// Emails the summary to its owner. Never fails the request; a slow mail API is
    /// abandoned after `notification_timeout`.
    async fn notify(&self, user: &User, document_id: Uuid, filename: &str, summary_text: &str) {
        let notification = SummaryNotification::new(filename, summary_text);
        let send = self
            .email
            .send_email(&user.email, &notification.subject, &notification.html_body);

        match tokio::time::timeout(self.notification_timeout, send).await {
            Ok(status) if (200..300).contains(&status) => {
                info!(%document_id, status, "Summary notification sent");
            }
            Ok(status) => error!(%document_id, status, "Failed to send summary notification"),
            Err(_) => error!(
                %document_id,
                timeout = ?self.notification_timeout,
                "Summary notification timed out"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewDocument, NewUser, Role};
    use crate::mock::{InMemoryDatabase, RecordingEmailService, ScriptedSummarizer};
    use crate::ports::PortError;
    use crate::summarize::Summarizer;
    use async_trait::async_trait;

    /// A mail API that never answers in time.
    struct StalledEmailService;

    #[async_trait]
    impl EmailService for StalledEmailService {
        async fn send_email(&self, _to: &str, _subject: &str, _html_body: &str) -> u16 {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            202
        }
    }

    struct Fixture {
        db: Arc<InMemoryDatabase>,
        email: Arc<RecordingEmailService>,
        provider: Arc<ScriptedSummarizer>,
        workflow: SummaryWorkflow,
    }

    fn fixture(provider: ScriptedSummarizer, email_status: u16) -> Fixture {
        let db = Arc::new(InMemoryDatabase::new());
        let email = Arc::new(RecordingEmailService::with_status(email_status));
        let provider = Arc::new(provider);
        let chain = Arc::new(SummarizationChain::new(vec![
            Arc::clone(&provider) as Arc<dyn Summarizer>
        ]));
        let workflow = SummaryWorkflow::new(db.clone(), chain, email.clone());
        Fixture {
            db,
            email,
            provider,
            workflow,
        }
    }

    async fn user(db: &InMemoryDatabase, username: &str, notifications: bool) -> User {
        let user = db
            .create_user(&NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                hashed_password: "hash".to_string(),
                role: Role::User,
            })
            .await
            .unwrap();
        db.set_email_notifications(user.id, notifications).await.unwrap();
        db.get_user_by_id(user.id).await.unwrap()
    }

    async fn document(db: &InMemoryDatabase, owner: &User, text: &str) -> Uuid {
        db.create_document(
            owner.id,
            &NewDocument {
                filename: "report.pdf".to_string(),
                original_text: text.to_string(),
                file_type: "application/pdf".to_string(),
                file_size: Some(1024),
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn completes_and_notifies() {
        let f = fixture(ScriptedSummarizer::succeeding("cloud", "A fine summary."), 202);
        let owner = user(&f.db, "alice", true).await;
        let doc = document(&f.db, &owner, "Some long document text.").await;

        let outcome = f
            .workflow
            .summarize_document(&owner, doc, SummaryLength::Short)
            .await
            .unwrap();

        match outcome {
            SummarizeOutcome::Completed { summary, provider_used } => {
                assert_eq!(summary.summary_text, "A fine summary.");
                assert_eq!(summary.summary_length, SummaryLength::Short);
                assert_eq!(summary.status, SummaryStatus::Completed);
                assert_eq!(provider_used.as_deref(), Some("cloud"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let sent = f.email.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "alice@example.com");
        assert!(sent[0].html_body.contains("A fine summary."));
    }

    #[tokio::test]
    async fn second_request_returns_existing_summary() {
        let f = fixture(ScriptedSummarizer::succeeding("cloud", "Summary."), 202);
        let owner = user(&f.db, "bob", false).await;
        let doc = document(&f.db, &owner, "Document text.").await;

        let first = f
            .workflow
            .summarize_document(&owner, doc, SummaryLength::Medium)
            .await
            .unwrap();
        let second = f
            .workflow
            .summarize_document(&owner, doc, SummaryLength::Long)
            .await
            .unwrap();

        let first_id = match first {
            SummarizeOutcome::Completed { summary, .. } => summary.id,
            other => panic!("unexpected outcome: {other:?}"),
        };
        assert!(matches!(
            second,
            SummarizeOutcome::AlreadyExists { summary_id } if summary_id == first_id
        ));
        assert_eq!(f.provider.calls(), 1);
        assert_eq!(f.db.list_summaries(owner.id).await.unwrap().len(), 1);
        assert!(f.email.sent().is_empty());
    }

    #[tokio::test]
    async fn other_users_documents_are_not_found() {
        let f = fixture(ScriptedSummarizer::succeeding("cloud", "Summary."), 202);
        let owner = user(&f.db, "carol", true).await;
        let intruder = user(&f.db, "mallory", true).await;
        let doc = document(&f.db, &owner, "Private text.").await;

        let err = f
            .workflow
            .summarize_document(&intruder, doc, SummaryLength::Medium)
            .await
            .unwrap_err();

        assert!(matches!(err, PortError::NotFound(_)));
        assert_eq!(f.provider.calls(), 0);
    }

    #[tokio::test]
    async fn blank_documents_fail_without_storing() {
        let f = fixture(ScriptedSummarizer::succeeding("cloud", "Summary."), 202);
        let owner = user(&f.db, "dave", true).await;
        let doc = document(&f.db, &owner, "   ").await;

        let outcome = f
            .workflow
            .summarize_document(&owner, doc, SummaryLength::Medium)
            .await
            .unwrap();

        assert!(matches!(outcome, SummarizeOutcome::Failed { .. }));
        assert!(f.db.list_summaries(owner.id).await.unwrap().is_empty());
        assert_eq!(f.provider.calls(), 0);
    }

    #[tokio::test]
    async fn email_failures_do_not_fail_the_request() {
        let f = fixture(ScriptedSummarizer::failing("cloud", "down"), 500);
        let owner = user(&f.db, "erin", true).await;
        let doc = document(
            &f.db,
            &owner,
            "Email delivery may fail. The summary must still be stored. Nobody should notice.",
        )
        .await;

        let outcome = f
            .workflow
            .summarize_document(&owner, doc, SummaryLength::Short)
            .await
            .unwrap();

        assert!(matches!(outcome, SummarizeOutcome::Completed { .. }));
        assert_eq!(f.email.sent().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_email_is_abandoned_after_the_timeout() {
        let db = Arc::new(InMemoryDatabase::new());
        let chain = Arc::new(SummarizationChain::new(vec![Arc::new(
            ScriptedSummarizer::succeeding("cloud", "Summary."),
        ) as Arc<dyn Summarizer>]));
        let workflow = SummaryWorkflow::new(db.clone(), chain, Arc::new(StalledEmailService))
            .with_notification_timeout(Duration::from_secs(5));
        let owner = user(&db, "frank", true).await;
        let doc = document(&db, &owner, "Text worth mailing.").await;

        let started = tokio::time::Instant::now();
        let outcome = workflow
            .summarize_document(&owner, doc, SummaryLength::Short)
            .await
            .unwrap();

        assert!(matches!(outcome, SummarizeOutcome::Completed { .. }));
        assert!(started.elapsed() < Duration::from_secs(60));
        assert_eq!(db.list_summaries(owner.id).await.unwrap().len(), 1);
    }
}
