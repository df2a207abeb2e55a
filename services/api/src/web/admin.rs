//! services/api/src/web/admin.rs
//!
//! Administrator-only listings. Access is enforced by `require_admin`.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::web::rest::{port_error, DocumentRead, UserRead};
use crate::web::state::AppState;

#[utoipa::path(
    get,
    path = "/admin/users",
    responses(
        (status = 200, description = "Every registered user", body = [UserRead]),
        (status = 403, description = "Admin access required")
    ),
    tag = "admin"
)]
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let users = state
        .db
        .list_users()
        .await
        .map_err(|e| port_error("Failed to list users", "No users", e))?;
    Ok(Json(users.into_iter().map(UserRead::from).collect::<Vec<_>>()))
}

#[utoipa::path(
    get,
    path = "/admin/documents",
    responses(
        (status = 200, description = "Every stored document", body = [DocumentRead]),
        (status = 403, description = "Admin access required")
    ),
    tag = "admin"
)]
pub async fn list_all_documents_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let documents = state
        .db
        .list_all_documents()
        .await
        .map_err(|e| port_error("Failed to list documents", "No documents", e))?;
    Ok(Json(documents.into_iter().map(DocumentRead::from).collect::<Vec<_>>()))
}
