//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user registration, login, and logout.

use crate::web::rest::UserRead;
use crate::web::state::AppState;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use smartdoc_core::domain::{NewUser, Role};
use smartdoc_core::ports::PortError;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

/// Name of the cookie carrying the auth session id.
pub const SESSION_COOKIE: &str = "session";
const SESSION_DAYS: i64 = 30;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// `user` (default) or `admin`.
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub username: String,
}

//=========================================================================================
// Cookie Helpers
//=========================================================================================

/// Returns the auth session id from the request's `Cookie` header.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then_some(value)
        })
}

fn session_cookie(session_id: &str) -> String {
    format!(
        "{SESSION_COOKIE}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        session_id,
        Duration::days(SESSION_DAYS).num_seconds()
    )
}

fn validate_registration(req: &RegisterRequest) -> Result<(), String> {
    if req.username.trim().is_empty() {
        return Err("Username must not be empty".to_string());
    }
    if req.password.is_empty() {
        return Err("Password must not be empty".to_string());
    }
    let email_ok = req
        .email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !email_ok {
        return Err("Invalid email address".to_string());
    }
    Ok(())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/register - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created successfully", body = UserRead),
        (status = 400, description = "Invalid request or username/email already registered"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    validate_registration(&req).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let salt = SaltString::generate(&mut OsRng);
    let hashed_password = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password".to_string())
        })?
        .to_string();

    let new_user = NewUser {
        username: req.username.trim().to_string(),
        email: req.email.trim().to_string(),
        hashed_password,
        role: req.role.as_deref().map(Role::parse).unwrap_or_default(),
    };

    let user = state.db.create_user(&new_user).await.map_err(|e| match e {
        PortError::Conflict(_) => (
            StatusCode::BAD_REQUEST,
            "Username or email already registered".to_string(),
        ),
        other => {
            error!("Failed to create user: {:?}", other);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create user".to_string())
        }
    })?;
    info!(user_id = %user.id, role = %user.role, "User registered");

    Ok((StatusCode::CREATED, Json(UserRead::from(user))))
}

/// POST /auth/login - Login with an existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let invalid = || (StatusCode::UNAUTHORIZED, "Incorrect username or password".to_string());

    let credentials = state
        .db
        .get_credentials_by_username(&req.username)
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => invalid(),
            other => {
                error!("Failed to load credentials: {:?}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Authentication error".to_string())
            }
        })?;

    let parsed_hash = PasswordHash::new(&credentials.hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Authentication error".to_string())
    })?;
    if Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(invalid());
    }

    let auth_session_id = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::days(SESSION_DAYS);
    state
        .db
        .create_auth_session(&auth_session_id, credentials.user_id, expires_at)
        .await
        .map_err(|e| {
            error!("Failed to create auth session: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session".to_string())
        })?;

    let response = AuthResponse {
        user_id: credentials.user_id,
        username: credentials.username,
    };
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&auth_session_id))],
        Json(response),
    ))
}

/// POST /auth/logout - Logout and invalidate the session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    ),
    tag = "auth"
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let auth_session_id = session_id_from_headers(&headers)
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    state
        .db
        .delete_auth_session(auth_session_id)
        .await
        .map_err(|e| {
            error!("Failed to delete auth session: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to logout".to_string())
        })?;

    let cleared = format!("{SESSION_COOKIE}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0");
    Ok((StatusCode::OK, [(header::SET_COOKIE, cleared)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn register(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: None,
        }
    }

    #[test]
    fn session_id_is_found_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc-123; lang=en"),
        );

        assert_eq!(session_id_from_headers(&headers), Some("abc-123"));
    }

    #[test]
    fn empty_or_missing_session_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_id_from_headers(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("session=; sessionx=1"));
        assert_eq!(session_id_from_headers(&headers), None);
    }

    #[test]
    fn session_cookie_is_http_only_for_thirty_days() {
        let cookie = session_cookie("abc");
        assert!(cookie.starts_with("session=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=2592000"));
    }

    #[test]
    fn registration_requires_plausible_fields() {
        assert!(validate_registration(&register("ada", "ada@example.com", "pw")).is_ok());
        assert!(validate_registration(&register(" ", "ada@example.com", "pw")).is_err());
        assert!(validate_registration(&register("ada", "ada.example.com", "pw")).is_err());
        assert!(validate_registration(&register("ada", "ada@localhost", "pw")).is_err());
        assert!(validate_registration(&register("ada", "ada@example.com", "")).is_err());
    }
}
