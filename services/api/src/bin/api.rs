//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{build_summarization_chain, DbAdapter, DocumentExtractor, SendGridEmailAdapter},
    config::{Config, ConfigError},
    error::ApiError,
    web::{self, state::AppState},
};
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use smartdoc_core::workflow::SummaryWorkflow;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let chain = Arc::new(build_summarization_chain(&config)?);
    let email_adapter = SendGridEmailAdapter::new(
        &config.email_api_url,
        config.email_api_key.clone(),
        config.email_from.clone(),
        config.email_timeout,
    )
    .map_err(|e| ApiError::Internal(format!("Failed to build the email HTTP client: {e}")))?;
    let extractor = Arc::new(DocumentExtractor::new(config.max_upload_bytes));
    let workflow = Arc::new(
        SummaryWorkflow::new(db_adapter.clone(), chain, Arc::new(email_adapter))
            .with_notification_timeout(config.email_timeout),
    );

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(db_adapter, extractor, workflow));

    let cors_origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ConfigError::InvalidValue("CORS_ORIGIN".to_string(), e.to_string())
    })?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let app = web::router(app_state).layer(cors);

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
