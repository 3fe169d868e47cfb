//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{LocalNotificationStore, MemoryDocumentStore, PgDocumentStore},
    config::Config,
    error::ApiError,
    web::{rest::ApiDoc, router, state::AppState},
};
use axum::http::{header::{ACCEPT, CONTENT_TYPE}, HeaderValue, Method};
use axum::{extract::DefaultBodyLimit, Router};
use medtrack_core::{DocumentStore, PermissionState, SystemClock};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting reminder service...");

    // --- 2. Pick the Document Store ---
    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            let db_store = PgDocumentStore::new(db_pool);
            info!("Running database migrations...");
            db_store.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(db_store)
        }
        None => {
            warn!("DATABASE_URL is not set; dose records are kept in memory only");
            Arc::new(MemoryDocumentStore::new())
        }
    };

    // --- 3. Wire the Reminder Workflow ---
    // The OS prompt has not been shown yet; the simulated user accepts it.
    let notifications = Arc::new(LocalNotificationStore::new(
        PermissionState::Prompt,
        PermissionState::Granted,
    ));
    let app_state = AppState::assemble(
        &config,
        notifications,
        store,
        Arc::new(SystemClock),
    )
    .await?;

    // --- 4. Create the Web Router ---
    let allowed_origin = config
        .allowed_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid ALLOWED_ORIGIN: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    let app = Router::new()
        .merge(router(app_state))
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(cors)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
