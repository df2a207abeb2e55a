//! services/api/src/web/rest.rs
//!
//! Contains the master definition for the OpenAPI specification, the response
//! payloads shared by the REST handlers, and the public root endpoint.

use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use smartdoc_core::domain::{Document, Summary, User};
use smartdoc_core::ports::PortError;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::web::{admin, auth, documents, profile, summaries};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        root_handler,
        auth::register_handler,
        auth::login_handler,
        auth::logout_handler,
        documents::upload_handler,
        documents::extract_text_handler,
        documents::list_documents_handler,
        documents::get_document_handler,
        documents::delete_document_handler,
        summaries::summarize_handler,
        summaries::get_summary_handler,
        summaries::list_summaries_handler,
        profile::get_profile_handler,
        profile::update_notifications_handler,
        admin::list_users_handler,
        admin::list_all_documents_handler,
    ),
    components(
        schemas(
            MessageResponse, UserRead, DocumentRead, SummaryRead,
            auth::RegisterRequest, auth::LoginRequest, auth::AuthResponse,
            documents::FileUploadResponse,
            summaries::SummarizeRequest, summaries::SummarizeResponse,
        )
    ),
    tags(
        (name = "SmartDoc AI API", description = "Document upload and AI summarization endpoints."),
        (name = "auth", description = "Registration and cookie sessions."),
        (name = "admin", description = "Administrator-only listings.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response Structs
//=========================================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// A user account as returned by the API. Never carries the password hash.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserRead {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub email_notifications: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserRead {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role.as_str().to_string(),
            email_notifications: user.email_notifications,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentRead {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filename: String,
    pub original_text: String,
    pub file_type: String,
    pub file_size: Option<i64>,
    pub upload_time: DateTime<Utc>,
}

impl From<Document> for DocumentRead {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            user_id: doc.user_id,
            filename: doc.filename,
            original_text: doc.original_text,
            file_type: doc.file_type,
            file_size: doc.file_size,
            upload_time: doc.upload_time,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryRead {
    pub id: Uuid,
    pub document_id: Uuid,
    pub summary_text: String,
    pub summary_length: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Summary> for SummaryRead {
    fn from(summary: Summary) -> Self {
        Self {
            id: summary.id,
            document_id: summary.document_id,
            summary_text: summary.summary_text,
            summary_length: summary.summary_length.as_str().to_string(),
            status: summary.status.as_str().to_string(),
            created_at: summary.created_at,
        }
    }
}

//=========================================================================================
// Error Mapping
//=========================================================================================

/// Maps a port failure to a response; `not_found` is the message for missing rows.
pub(crate) fn port_error(context: &str, not_found: &str, e: PortError) -> (StatusCode, String) {
    match e {
        PortError::NotFound(_) => (StatusCode::NOT_FOUND, not_found.to_string()),
        PortError::Unauthorized => (
            StatusCode::UNAUTHORIZED,
            "Could not validate credentials".to_string(),
        ),
        other => {
            error!("{}: {:?}", context, other);
            (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
        }
    }
}

//=========================================================================================
// Public Handlers
//=========================================================================================

/// GET / - Welcome message
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service is up", body = MessageResponse))
)]
pub async fn root_handler() -> impl IntoResponse {
    Json(MessageResponse {
        message: "Welcome to SmartDoc AI - Your Intelligent Document Summarization Service!"
            .to_string(),
    })
}
