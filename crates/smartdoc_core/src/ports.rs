//! crates/smartdoc_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Document, NewDocument, NewSummary, NewUser, Summary, User, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Persistence
//=========================================================================================

/// Storage for users, login sessions, documents and summaries.
///
/// Every document and summary lookup that takes a `user_id` must only return rows
/// owned by that user.
#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---
    /// Fails with `PortError::Conflict` when the username or email is taken.
    async fn create_user(&self, new_user: &NewUser) -> PortResult<User>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    async fn get_credentials_by_username(&self, username: &str) -> PortResult<UserCredentials>;

    async fn list_users(&self) -> PortResult<Vec<User>>;

    async fn set_email_notifications(&self, user_id: Uuid, enabled: bool) -> PortResult<()>;

    // --- Auth Methods ---
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Returns the owning user of an unexpired session.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Document Management ---
    async fn create_document(&self, user_id: Uuid, document: &NewDocument) -> PortResult<Document>;

    async fn get_document(&self, document_id: Uuid, user_id: Uuid) -> PortResult<Document>;

    async fn list_documents(&self, user_id: Uuid) -> PortResult<Vec<Document>>;

    async fn list_all_documents(&self) -> PortResult<Vec<Document>>;

    /// Deletes the document and every summary attached to it.
    async fn delete_document(&self, document_id: Uuid, user_id: Uuid) -> PortResult<()>;

    // --- Summary Management ---
    async fn create_summary(&self, summary: &NewSummary) -> PortResult<Summary>;

    async fn get_summary_by_document(
        &self,
        document_id: Uuid,
        user_id: Uuid,
    ) -> PortResult<Option<Summary>>;

    async fn list_summaries(&self, user_id: Uuid) -> PortResult<Vec<Summary>>;
}

//=========================================================================================
// Notifications
//=========================================================================================

#[async_trait]
pub trait EmailService: Send + Sync {
    /// Sends an HTML email and returns the delivery status code.
    ///
    /// Transport failures are reported as a status code (500), never as an error.
    async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> u16;
}

//=========================================================================================
// Text Extraction
//=========================================================================================

/// Reasons an uploaded file could not be turned into text.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Unsupported file type '{0}'. Please upload DOCX or PDF files only.")]
    UnsupportedType(String),
    #[error("File size too large. Maximum size is {max_bytes} bytes.")]
    TooLarge { max_bytes: usize },
    #[error("Error extracting text from {kind}: {reason}")]
    Malformed { kind: &'static str, reason: String },
}

pub trait TextExtractor: Send + Sync {
    /// Extracts plain text from an uploaded file.
    ///
    /// `declared_size` is the size reported by the client, if any; the byte length of
    /// `bytes` is checked as well.
    fn extract(
        &self,
        bytes: &[u8],
        content_type: &str,
        declared_size: Option<u64>,
    ) -> Result<String, ExtractError>;
}
