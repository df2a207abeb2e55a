pub mod admin;
pub mod auth;
pub mod documents;
pub mod middleware;
pub mod profile;
pub mod rest;
pub mod state;
pub mod summaries;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use middleware::{require_admin, require_auth};
pub use rest::ApiDoc;
pub use state::AppState;

/// Upper bound on a request body. Documents are held to a smaller limit by the extractor.
pub const MAX_REQUEST_BYTES: usize = 10 * 1024 * 1024;

/// Builds the full HTTP router: public, authenticated and admin routes plus Swagger UI.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/", get(rest::root_handler))
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler));

    let admin_routes = Router::new()
        .route("/admin/users", get(admin::list_users_handler))
        .route("/admin/documents", get(admin::list_all_documents_handler))
        .route_layer(axum_middleware::from_fn(require_admin));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/upload", post(documents::upload_handler))
        .route("/extract-text", post(documents::extract_text_handler))
        .route("/documents", get(documents::list_documents_handler))
        .route(
            "/documents/{document_id}",
            get(documents::get_document_handler).delete(documents::delete_document_handler),
        )
        .route("/summarize/{document_id}", post(summaries::summarize_handler))
        .route("/summary/{document_id}", get(summaries::get_summary_handler))
        .route("/summaries", get(summaries::list_summaries_handler))
        .route("/profile", get(profile::get_profile_handler))
        .route("/profile/notifications", put(profile::update_notifications_handler))
        .merge(admin_routes)
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .with_state(app_state);

    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
