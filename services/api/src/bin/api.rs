//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        db::PgStore, gateway::SnapGateway, model::GeminiModel, renderer::ChromiumRenderer,
    },
    config::Config,
    error::ApiError,
    web::{
        callback_handler, current_handler, export_handler, pay_handler, state::AppState,
        upload_handler, ApiDoc,
    },
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
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
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(PgStore::new(db_pool));
    info!("Running database migrations...");
    store.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let gateway = Arc::new(SnapGateway::new(
        config.gateway_url.clone(),
        config.gateway_server_key.clone(),
        config.base_url.clone(),
    ));
    let model = Arc::new(GeminiModel::new(
        config.gemini_api_key.clone(),
        config.report_model.clone(),
    ));
    let renderer = Arc::new(ChromiumRenderer::new());

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        store,
        gateway,
        model,
        renderer,
        config: config.clone(),
    });

    // --- 5. Create the Web Router ---
    let api_router = Router::new()
        .route("/api/current", get(current_handler))
        .route("/api/upload", post(upload_handler))
        .route("/api/pay", post(pay_handler))
        .route("/api/callback", post(callback_handler))
        .route("/api/export", post(export_handler))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

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
