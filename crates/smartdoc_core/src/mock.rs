//! In-memory implementations of the ports, for tests.
//!
//! Compiled for this crate's own tests and, through the `mock` feature, for tests in
//! dependent crates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

use crate::domain::{
    Document, NewDocument, NewSummary, NewUser, Summary, User, UserCredentials,
};
use crate::ports::{DatabaseService, EmailService, PortError, PortResult};
use crate::summarize::{SummarizeError, Summarizer, SummaryResult, DEFAULT_PROVIDER_TIMEOUT};
use crate::SummaryLength;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

//=========================================================================================
// Database
//=========================================================================================

#[derive(Default)]
struct Tables {
    users: Vec<(User, String)>,
    sessions: HashMap<String, (Uuid, DateTime<Utc>)>,
    documents: Vec<Document>,
    summaries: Vec<Summary>,
}

/// A `DatabaseService` backed by vectors behind a mutex.
#[derive(Default)]
pub struct InMemoryDatabase {
    tables: Mutex<Tables>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DatabaseService for InMemoryDatabase {
    async fn create_user(&self, new_user: &NewUser) -> PortResult<User> {
        let mut tables = lock(&self.tables);
        if tables
            .users
            .iter()
            .any(|(u, _)| u.username == new_user.username || u.email == new_user.email)
        {
            return Err(PortError::Conflict(
                "Username or email already registered".to_string(),
            ));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            role: new_user.role,
            email_notifications: true,
            created_at: Utc::now(),
        };
        tables
            .users
            .push((user.clone(), new_user.hashed_password.clone()));
        Ok(user)
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        lock(&self.tables)
            .users
            .iter()
            .find(|(u, _)| u.id == user_id)
            .map(|(u, _)| u.clone())
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn get_credentials_by_username(&self, username: &str) -> PortResult<UserCredentials> {
        lock(&self.tables)
            .users
            .iter()
            .find(|(u, _)| u.username == username)
            .map(|(u, hash)| UserCredentials {
                user_id: u.id,
                username: u.username.clone(),
                hashed_password: hash.clone(),
            })
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", username)))
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        Ok(lock(&self.tables).users.iter().map(|(u, _)| u.clone()).collect())
    }

    async fn set_email_notifications(&self, user_id: Uuid, enabled: bool) -> PortResult<()> {
        let mut tables = lock(&self.tables);
        let (user, _) = tables
            .users
            .iter_mut()
            .find(|(u, _)| u.id == user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        user.email_notifications = enabled;
        Ok(())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        lock(&self.tables)
            .sessions
            .insert(session_id.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        match lock(&self.tables).sessions.get(session_id) {
            Some((user_id, expires_at)) if *expires_at > Utc::now() => Ok(*user_id),
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        lock(&self.tables).sessions.remove(session_id);
        Ok(())
    }

    async fn create_document(&self, user_id: Uuid, document: &NewDocument) -> PortResult<Document> {
        let document = Document {
            id: Uuid::new_v4(),
            user_id,
            filename: document.filename.clone(),
            original_text: document.original_text.clone(),
            file_type: document.file_type.clone(),
            file_size: document.file_size,
            upload_time: Utc::now(),
        };
        lock(&self.tables).documents.push(document.clone());
        Ok(document)
    }

    async fn get_document(&self, document_id: Uuid, user_id: Uuid) -> PortResult<Document> {
        lock(&self.tables)
            .documents
            .iter()
            .find(|d| d.id == document_id && d.user_id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Document {} not found", document_id)))
    }

    async fn list_documents(&self, user_id: Uuid) -> PortResult<Vec<Document>> {
        Ok(lock(&self.tables)
            .documents
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_all_documents(&self) -> PortResult<Vec<Document>> {
        Ok(lock(&self.tables).documents.clone())
    }

    async fn delete_document(&self, document_id: Uuid, user_id: Uuid) -> PortResult<()> {
        let mut tables = lock(&self.tables);
        let before = tables.documents.len();
        tables
            .documents
            .retain(|d| !(d.id == document_id && d.user_id == user_id));
        if tables.documents.len() == before {
            return Err(PortError::NotFound(format!("Document {} not found", document_id)));
        }
        tables.summaries.retain(|s| s.document_id != document_id);
        Ok(())
    }

    async fn create_summary(&self, summary: &NewSummary) -> PortResult<Summary> {
        let summary = Summary {
            id: Uuid::new_v4(),
            document_id: summary.document_id,
            summary_text: summary.summary_text.clone(),
            summary_length: summary.summary_length,
            status: summary.status,
            created_at: Utc::now(),
        };
        lock(&self.tables).summaries.push(summary.clone());
        Ok(summary)
    }

    async fn get_summary_by_document(
        &self,
        document_id: Uuid,
        user_id: Uuid,
    ) -> PortResult<Option<Summary>> {
        let tables = lock(&self.tables);
        let owned = tables
            .documents
            .iter()
            .any(|d| d.id == document_id && d.user_id == user_id);
        if !owned {
            return Ok(None);
        }
        Ok(tables
            .summaries
            .iter()
            .find(|s| s.document_id == document_id)
            .cloned())
    }

    async fn list_summaries(&self, user_id: Uuid) -> PortResult<Vec<Summary>> {
        let tables = lock(&self.tables);
        Ok(tables
            .summaries
            .iter()
            .filter(|s| {
                tables
                    .documents
                    .iter()
                    .any(|d| d.id == s.document_id && d.user_id == user_id)
            })
            .cloned()
            .collect())
    }
}

//=========================================================================================
// Email
//=========================================================================================

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Records every email and answers with a fixed status code.
pub struct RecordingEmailService {
    status: u16,
    sent: Mutex<Vec<SentEmail>>,
}

impl RecordingEmailService {
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        lock(&self.sent).clone()
    }
}

impl Default for RecordingEmailService {
    fn default() -> Self {
        Self::with_status(202)
    }
}

#[async_trait]
impl EmailService for RecordingEmailService {
    async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> u16 {
        lock(&self.sent).push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        self.status
    }
}

//=========================================================================================
// Summarizer
//=========================================================================================

#[derive(Debug, Clone)]
enum Script {
    Succeed(String),
    Fail(String),
    Unavailable(String),
    Hang,
}

/// A provider whose behavior is fixed at construction.
pub struct ScriptedSummarizer {
    name: String,
    script: Script,
    timeout: Duration,
    calls: AtomicUsize,
}

impl ScriptedSummarizer {
    fn scripted(name: &str, script: Script) -> Self {
        Self {
            name: name.to_string(),
            script,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn succeeding(name: &str, summary: &str) -> Self {
        Self::scripted(name, Script::Succeed(summary.to_string()))
    }

    pub fn failing(name: &str, reason: &str) -> Self {
        Self::scripted(name, Script::Fail(reason.to_string()))
    }

    /// Fails its availability check, so `summarize` is never reached.
    pub fn unavailable(name: &str, reason: &str) -> Self {
        Self::scripted(name, Script::Unavailable(reason.to_string()))
    }

    /// Never finishes; the chain's timeout of `timeout` cuts it off.
    pub fn hanging(name: &str, timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::scripted(name, Script::Hang)
        }
    }

    /// Number of times `summarize` was entered.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Summarizer for ScriptedSummarizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn check_availability(&self) -> Result<(), SummarizeError> {
        match &self.script {
            Script::Unavailable(reason) => {
                Err(SummarizeError::configuration(&self.name, reason.clone()))
            }
            _ => Ok(()),
        }
    }

    async fn summarize(&self, _text: &str, length: SummaryLength) -> SummaryResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Succeed(summary) => SummaryResult::success(summary.clone(), &self.name, length),
            Script::Fail(reason) | Script::Unavailable(reason) => {
                let error = SummarizeError::provider(&self.name, reason.clone());
                SummaryResult::failure(&error, length)
            }
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                SummaryResult::failure(&SummarizeError::provider(&self.name, "woke up"), length)
            }
        }
    }
}
