//! crates/smartdoc_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

//=========================================================================================
// Users
//=========================================================================================

/// The access level of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Parses a stored role. Anything other than `admin` is a regular user.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::User
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a user - used throughout app.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub email_notifications: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub username: String,
    pub hashed_password: String,
}

/// The fields required to register a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub role: Role,
}

//=========================================================================================
// Documents
//=========================================================================================

/// An uploaded file whose text has been extracted.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filename: String,
    pub original_text: String,
    pub file_type: String,
    pub file_size: Option<i64>,
    pub upload_time: DateTime<Utc>,
}

/// The fields supplied when a document is stored.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub filename: String,
    pub original_text: String,
    pub file_type: String,
    pub file_size: Option<i64>,
}

//=========================================================================================
// Summaries
//=========================================================================================

/// The requested size of a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl SummaryLength {
    /// Normalizes an optional caller-supplied value. Unknown values become `Medium`.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("short") => SummaryLength::Short,
            Some("long") => SummaryLength::Long,
            _ => SummaryLength::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryLength::Short => "short",
            SummaryLength::Medium => "medium",
            SummaryLength::Long => "long",
        }
    }

    /// Generation budget for LLM providers, in tokens.
    pub fn max_tokens(&self) -> u32 {
        match self {
            SummaryLength::Short => 200,
            SummaryLength::Medium => 500,
            SummaryLength::Long => 1000,
        }
    }

    /// Number of sentences picked by the extractive summarizer.
    pub fn sentence_budget(&self) -> usize {
        match self {
            SummaryLength::Short => 3,
            SummaryLength::Medium => 5,
            SummaryLength::Long => 8,
        }
    }

    /// Word window `(min, max)` for chunked summarization.
    pub fn word_window(&self) -> (usize, usize) {
        match self {
            SummaryLength::Short => (30, 100),
            SummaryLength::Medium => (80, 200),
            SummaryLength::Long => (150, 400),
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            SummaryLength::Short => {
                "Provide a concise summary in 2-3 sentences highlighting only the most \
                 important points."
            }
            SummaryLength::Medium => {
                "Provide a comprehensive summary in 1-2 paragraphs covering the main topics \
                 and key details."
            }
            SummaryLength::Long => {
                "Provide a detailed summary with multiple paragraphs, covering all significant \
                 points, arguments, conclusions, and supporting details."
            }
        }
    }
}

impl fmt::Display for SummaryLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The persisted state of a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStatus {
    Completed,
    Failed,
}

impl SummaryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryStatus::Completed => "completed",
            SummaryStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("failed") {
            SummaryStatus::Failed
        } else {
            SummaryStatus::Completed
        }
    }
}

/// A stored summary of a single document.
#[derive(Debug, Clone)]
pub struct Summary {
    pub id: Uuid,
    pub document_id: Uuid,
    pub summary_text: String,
    pub summary_length: SummaryLength,
    pub status: SummaryStatus,
    pub created_at: DateTime<Utc>,
}

/// The fields supplied when a summary is stored.
#[derive(Debug, Clone)]
pub struct NewSummary {
    pub document_id: Uuid,
    pub summary_text: String,
    pub summary_length: SummaryLength,
    pub status: SummaryStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_lengths_normalize_to_medium() {
        assert_eq!(SummaryLength::parse(None), SummaryLength::Medium);
        assert_eq!(SummaryLength::parse(Some("tiny")), SummaryLength::Medium);
        assert_eq!(SummaryLength::parse(Some("")), SummaryLength::Medium);
        assert_eq!(SummaryLength::parse(Some(" LONG ")), SummaryLength::Long);
        assert_eq!(SummaryLength::parse(Some("short")), SummaryLength::Short);
    }

    #[test]
    fn role_parsing_defaults_to_user() {
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse("superuser"), Role::User);
        assert_eq!(Role::User.to_string(), "user");
    }
}
