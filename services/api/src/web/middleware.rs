//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use smartdoc_core::domain::User;
use std::sync::Arc;
use tracing::{error, warn};

use crate::web::auth::session_id_from_headers;
use crate::web::state::AppState;

/// Middleware that validates the auth session cookie and loads the user.
///
/// If valid, inserts the `User` into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_session_id = session_id_from_headers(req.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    let user_id = state
        .db
        .validate_auth_session(auth_session_id)
        .await
        .map_err(|e| {
            warn!("Rejected auth session: {:?}", e);
            StatusCode::UNAUTHORIZED
        })?;

    let user = state.db.get_user_by_id(user_id).await.map_err(|e| {
        error!("Session refers to a missing user: {:?}", e);
        StatusCode::UNAUTHORIZED
    })?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Middleware that only lets administrators through. Must run after `require_auth`.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, (StatusCode, String)> {
    let (user_id, is_admin) = req
        .extensions()
        .get::<User>()
        .map(|user| (user.id, user.is_admin()))
        .ok_or((StatusCode::UNAUTHORIZED, "Could not validate credentials".to_string()))?;

    if !is_admin {
        warn!(%user_id, "Non-admin user denied access to {}", req.uri().path());
        return Err((StatusCode::FORBIDDEN, "Admin access required".to_string()));
    }
    Ok(next.run(req).await)
}
