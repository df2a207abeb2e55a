//! services/api/src/web/summaries.rs
//!
//! Summary generation and retrieval.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use smartdoc_core::domain::{SummaryLength, User};
use smartdoc_core::workflow::SummarizeOutcome;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::rest::{port_error, SummaryRead};
use crate::web::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SummarizeRequest {
    /// `short`, `medium` (default) or `long`. Unknown values fall back to `medium`.
    #[serde(default)]
    pub length: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SummarizeResponse {
    /// `completed` or `already_exists`.
    pub status: String,
    pub summary_id: Option<Uuid>,
    pub message: String,
}

/// Generate the summary of a document.
#[utoipa::path(
    post,
    path = "/summarize/{document_id}",
    params(("document_id" = Uuid, Path, description = "The document to summarize.")),
    request_body = SummarizeRequest,
    responses(
        (
            status = 200,
            description = "Summary generated or already present",
            body = SummarizeResponse
        ),
        (status = 404, description = "Document not found"),
        (status = 500, description = "Every summarization provider failed")
    )
)]
pub async fn summarize_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(document_id): Path<Uuid>,
    Json(req): Json<SummarizeRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let length = SummaryLength::parse(req.length.as_deref());

    let outcome = state
        .workflow
        .summarize_document(&user, document_id, length)
        .await
        .map_err(|e| port_error("Failed to generate summary", "Document not found", e))?;

    let response = match outcome {
        SummarizeOutcome::Completed { summary, .. } => SummarizeResponse {
            status: "completed".to_string(),
            summary_id: Some(summary.id),
            message: "Document summarized successfully".to_string(),
        },
        SummarizeOutcome::AlreadyExists { summary_id } => SummarizeResponse {
            status: "already_exists".to_string(),
            summary_id: Some(summary_id),
            message: "Summary already exists for this document".to_string(),
        },
        SummarizeOutcome::Failed { reason } => {
            error!(%document_id, "Summarization failed: {}", reason);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to generate summary: {reason}"),
            ));
        }
    };
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/summary/{document_id}",
    params(("document_id" = Uuid, Path, description = "The summarized document.")),
    responses(
        (status = 200, description = "The document's summary", body = SummaryRead),
        (status = 404, description = "Summary not found")
    )
)]
pub async fn get_summary_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let summary = state
        .db
        .get_summary_by_document(document_id, user.id)
        .await
        .map_err(|e| port_error("Failed to load summary", "Summary not found", e))?
        .ok_or((StatusCode::NOT_FOUND, "Summary not found".to_string()))?;
    Ok(Json(SummaryRead::from(summary)))
}

/// List the summaries of all the caller's documents.
#[utoipa::path(
    get,
    path = "/summaries",
    responses((status = 200, description = "The caller's summaries", body = [SummaryRead]))
)]
pub async fn list_summaries_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let summaries = state
        .db
        .list_summaries(user.id)
        .await
        .map_err(|e| port_error("Failed to list summaries", "User not found", e))?;
    Ok(Json(summaries.into_iter().map(SummaryRead::from).collect::<Vec<_>>()))
}
