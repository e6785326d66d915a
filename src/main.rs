//! Depot Server - Warehouse Borrowing Management System
//!
//! A Rust REST API server for warehouse borrowing administration.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use depot_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("depot_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Depot Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository);

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Item type catalog
        .route("/item-types", get(api::item_types::list_item_types))
        .route("/item-types", post(api::item_types::create_item_type))
        .route("/item-types/:id", get(api::item_types::get_item_type))
        .route("/item-types/:id", put(api::item_types::update_item_type))
        .route("/item-types/:id", delete(api::item_types::delete_item_type))
        // Borrowing requests
        .route("/requests", get(api::requests::list_requests))
        .route("/requests", post(api::requests::submit_request))
        .route("/requests/overdue", get(api::requests::list_overdue_requests))
        .route("/requests/:id", get(api::requests::get_request))
        .route("/requests/:id", delete(api::requests::delete_request))
        .route("/requests/:id/approve", post(api::requests::approve_request))
        .route("/requests/:id/reject", post(api::requests::reject_request))
        .route("/requests/:id/close", post(api::requests::close_request))
        // Transaction ledger
        .route("/requests/:id/borrow", post(api::requests::borrow_items))
        .route("/requests/:id/return", post(api::requests::return_items))
        .route("/requests/:id/outstanding", get(api::requests::get_outstanding))
        .route("/requests/:id/transactions", get(api::requests::list_transactions))
        // Return items and damage reports
        .route("/return-items/:id", put(api::returns::update_return_item))
        .route("/return-items/:id", delete(api::returns::delete_return_item))
        .route("/return-items/:id/damage-report", post(api::returns::file_damage_report))
        .route("/damage-reports/:id", get(api::returns::get_damage_report))
        .route("/requests/:id/damage-reports", get(api::returns::list_damage_reports))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
