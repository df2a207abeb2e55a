//! services/api/src/web/documents.rs
//!
//! Upload, extraction, listing and deletion of a user's documents.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use bytes::Bytes;
use serde::Serialize;
use smartdoc_core::domain::{NewDocument, User};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::rest::{port_error, DocumentRead};
use crate::web::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct FileUploadResponse {
    pub file_name: String,
    pub extracted_text: String,
}

/// The file part of a multipart upload.
struct Upload {
    file_name: String,
    content_type: String,
    data: Bytes,
}

/// Reads the first file part of the form (`file` by convention).
async fn read_upload(mut multipart: Multipart) -> Result<Upload, (StatusCode, String)> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (StatusCode::BAD_REQUEST, format!("Failed to read multipart data: {}", e))
    })? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await.map_err(|e| {
            (StatusCode::BAD_REQUEST, format!("Failed to read file bytes: {}", e))
        })?;
        return Ok(Upload {
            file_name,
            content_type,
            data,
        });
    }
    Err((
        StatusCode::BAD_REQUEST,
        "Multipart form must include a file".to_string(),
    ))
}

/// Runs the (blocking) extractor off the async runtime.
async fn extract_text(state: &AppState, upload: &Upload) -> Result<String, (StatusCode, String)> {
    let extractor = Arc::clone(&state.extractor);
    let data = upload.data.clone();
    let content_type = upload.content_type.clone();

    tokio::task::spawn_blocking(move || extractor.extract(&data, &content_type, None))
        .await
        .map_err(|e| {
            error!("Extraction task failed: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to extract text".to_string())
        })?
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Upload a PDF or DOCX document and store its text.
#[utoipa::path(
    post,
    path = "/upload",
    request_body(content_type = "multipart/form-data", description = "The document to upload."),
    responses(
        (status = 201, description = "Document stored", body = DocumentRead),
        (status = 400, description = "Unsupported, oversized or unreadable file"),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let upload = read_upload(multipart).await?;
    let text = extract_text(&state, &upload).await?;

    let new_document = NewDocument {
        filename: upload.file_name,
        original_text: text,
        file_type: upload.content_type,
        file_size: i64::try_from(upload.data.len()).ok(),
    };
    let document = state
        .db
        .create_document(user.id, &new_document)
        .await
        .map_err(|e| port_error("Failed to store document", "User not found", e))?;
    info!(document_id = %document.id, user_id = %user.id, "Document uploaded");

    Ok((StatusCode::CREATED, Json(DocumentRead::from(document))))
}

/// Extract the text of a document without storing it.
#[utoipa::path(
    post,
    path = "/extract-text",
    request_body(content_type = "multipart/form-data", description = "The document to read."),
    responses(
        (status = 200, description = "Extracted text", body = FileUploadResponse),
        (status = 400, description = "Unsupported, oversized or unreadable file"),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn extract_text_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let upload = read_upload(multipart).await?;
    let extracted_text = extract_text(&state, &upload).await?;
    Ok(Json(FileUploadResponse {
        file_name: upload.file_name,
        extracted_text,
    }))
}

/// List the caller's documents.
#[utoipa::path(
    get,
    path = "/documents",
    responses(
        (status = 200, description = "The caller's documents", body = [DocumentRead]),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_documents_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let documents = state
        .db
        .list_documents(user.id)
        .await
        .map_err(|e| port_error("Failed to list documents", "User not found", e))?;
    Ok(Json(documents.into_iter().map(DocumentRead::from).collect::<Vec<_>>()))
}

#[utoipa::path(
    get,
    path = "/documents/{document_id}",
    params(("document_id" = Uuid, Path, description = "The document to fetch.")),
    responses(
        (status = 200, description = "The document", body = DocumentRead),
        (status = 404, description = "Document not found")
    )
)]
pub async fn get_document_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let document = state
        .db
        .get_document(document_id, user.id)
        .await
        .map_err(|e| port_error("Failed to load document", "Document not found", e))?;
    Ok(Json(DocumentRead::from(document)))
}

/// Delete a document together with its summary.
#[utoipa::path(
    delete,
    path = "/documents/{document_id}",
    params(("document_id" = Uuid, Path, description = "The document to delete.")),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 404, description = "Document not found")
    )
)]
pub async fn delete_document_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state
        .db
        .delete_document(document_id, user.id)
        .await
        .map_err(|e| port_error("Failed to delete document", "Document not found", e))?;
    info!(%document_id, user_id = %user.id, "Document deleted");
    Ok(StatusCode::NO_CONTENT)
}
