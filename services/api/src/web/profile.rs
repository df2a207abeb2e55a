//! services/api/src/web/profile.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use smartdoc_core::domain::User;
use std::sync::Arc;
use tracing::info;
use utoipa::IntoParams;

use crate::web::rest::{port_error, MessageResponse, UserRead};
use crate::web::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NotificationQuery {
    /// Whether summary notifications should be emailed.
    pub enabled: bool,
}

#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "The logged-in user", body = UserRead),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn get_profile_handler(Extension(user): Extension<User>) -> impl IntoResponse {
    Json(UserRead::from(user))
}

/// Turn summary notification emails on or off.
#[utoipa::path(
    put,
    path = "/profile/notifications",
    params(NotificationQuery),
    responses(
        (status = 200, description = "Preference saved", body = MessageResponse),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn update_notifications_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Query(query): Query<NotificationQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state
        .db
        .set_email_notifications(user.id, query.enabled)
        .await
        .map_err(|e| port_error("Failed to update notification settings", "User not found", e))?;
    info!(user_id = %user.id, enabled = query.enabled, "Notification preference updated");

    let state_word = if query.enabled { "enabled" } else { "disabled" };
    Ok(Json(MessageResponse {
        message: format!("Email notifications {state_word}"),
    }))
}
