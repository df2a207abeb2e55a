//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use smartdoc_core::domain::{
    Document, NewDocument, NewSummary, NewUser, Role, Summary, SummaryLength, SummaryStatus,
    User, UserCredentials,
};
use smartdoc_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found_or_unexpected(e: sqlx::Error, what: String) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what),
        _ => unexpected(e),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

const USER_COLUMNS: &str = "id, username, email, role, email_notifications, created_at";
const DOCUMENT_COLUMNS: &str =
    "id, user_id, filename, original_text, file_type, file_size, upload_time";

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    username: String,
    email: String,
    role: String,
    email_notifications: bool,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            role: Role::parse(&self.role),
            email_notifications: self.email_notifications,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    id: Uuid,
    username: String,
    hashed_password: String,
}

#[derive(FromRow)]
struct DocumentRecord {
    id: Uuid,
    user_id: Uuid,
    filename: String,
    original_text: String,
    file_type: String,
    file_size: Option<i64>,
    upload_time: DateTime<Utc>,
}
impl DocumentRecord {
    fn to_domain(self) -> Document {
        Document {
            id: self.id,
            user_id: self.user_id,
            filename: self.filename,
            original_text: self.original_text,
            file_type: self.file_type,
            file_size: self.file_size,
            upload_time: self.upload_time,
        }
    }
}

#[derive(FromRow)]
struct SummaryRecord {
    id: Uuid,
    document_id: Uuid,
    summary_text: String,
    summary_length: String,
    status: String,
    created_at: DateTime<Utc>,
}
impl SummaryRecord {
    fn to_domain(self) -> Summary {
        Summary {
            id: self.id,
            document_id: self.document_id,
            summary_text: self.summary_text,
            summary_length: SummaryLength::parse(Some(&self.summary_length)),
            status: SummaryStatus::parse(&self.status),
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(&self, new_user: &NewUser) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (id, username, email, hashed_password, role) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.hashed_password)
        .bind(new_user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                PortError::Conflict("Username or email already registered".to_string())
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn get_credentials_by_username(&self, username: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, username, hashed_password FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("User {} not found", username)))?;
        Ok(UserCredentials {
            user_id: record.id,
            username: record.username,
            hashed_password: record.hashed_password,
        })
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn set_email_notifications(&self, user_id: Uuid, enabled: bool) -> PortResult<()> {
        let result = sqlx::query("UPDATE users SET email_notifications = $1 WHERE id = $2")
            .bind(enabled)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let user_id: Option<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        user_id.ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn create_document(&self, user_id: Uuid, document: &NewDocument) -> PortResult<Document> {
        let record = sqlx::query_as::<_, DocumentRecord>(&format!(
            "INSERT INTO documents (id, user_id, filename, original_text, file_type, file_size) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {DOCUMENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&document.filename)
        .bind(&document.original_text)
        .bind(&document.file_type)
        .bind(document.file_size)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_document(&self, document_id: Uuid, user_id: Uuid) -> PortResult<Document> {
        let record = sqlx::query_as::<_, DocumentRecord>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1 AND user_id = $2"
        ))
        .bind(document_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("Document {} not found", document_id)))?;
        Ok(record.to_domain())
    }

    async fn list_documents(&self, user_id: Uuid) -> PortResult<Vec<Document>> {
        let records = sqlx::query_as::<_, DocumentRecord>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE user_id = $1 ORDER BY upload_time DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_all_documents(&self) -> PortResult<Vec<Document>> {
        let records = sqlx::query_as::<_, DocumentRecord>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents ORDER BY upload_time DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn delete_document(&self, document_id: Uuid, user_id: Uuid) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        // Summaries go first; the ownership filter on the document guards both deletes.
        sqlx::query(
            "DELETE FROM summaries WHERE document_id = $1 \
             AND EXISTS (SELECT 1 FROM documents WHERE id = $1 AND user_id = $2)",
        )
        .bind(document_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;

        let result = sqlx::query("DELETE FROM documents WHERE id = $1 AND user_id = $2")
            .bind(document_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            tx.rollback().await.map_err(unexpected)?;
            return Err(PortError::NotFound(format!("Document {} not found", document_id)));
        }

        tx.commit().await.map_err(unexpected)?;
        Ok(())
    }

    async fn create_summary(&self, summary: &NewSummary) -> PortResult<Summary> {
        let record = sqlx::query_as::<_, SummaryRecord>(
            "INSERT INTO summaries (id, document_id, summary_text, summary_length, status) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, document_id, summary_text, summary_length, status, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(summary.document_id)
        .bind(&summary.summary_text)
        .bind(summary.summary_length.as_str())
        .bind(summary.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_summary_by_document(
        &self,
        document_id: Uuid,
        user_id: Uuid,
    ) -> PortResult<Option<Summary>> {
        let record = sqlx::query_as::<_, SummaryRecord>(
            "SELECT s.id, s.document_id, s.summary_text, s.summary_length, s.status, s.created_at \
             FROM summaries s JOIN documents d ON d.id = s.document_id \
             WHERE s.document_id = $1 AND d.user_id = $2 \
             ORDER BY s.created_at ASC LIMIT 1",
        )
        .bind(document_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn list_summaries(&self, user_id: Uuid) -> PortResult<Vec<Summary>> {
        let records = sqlx::query_as::<_, SummaryRecord>(
            "SELECT s.id, s.document_id, s.summary_text, s.summary_length, s.status, s.created_at \
             FROM summaries s JOIN documents d ON d.id = s.document_id \
             WHERE d.user_id = $1 ORDER BY s.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}
