//! # Barbershop API
//!
//! HTTP surface of the barbershop booking service: the public booking flow
//! under `/api` and the staff panel under `/panel`.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Translate requests into booking and reporting calls
//! - **Middleware**: Error mapping
//! - **Config**: Environment configuration
//!
//! Handlers only see the store traits, so the router runs the same over
//! PostgreSQL and over the in-memory store used in tests.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    BoxError, Router,
    error_handling::HandleErrorLayer,
    http::{HeaderValue, StatusCode},
};
use barbershop_core::{
    booking::BookingService,
    clock::{Clock, SystemClock},
    reporting::ReportingService,
    store::Stores,
};
use barbershop_db::{DbPool, PgStore};
use eyre::Result;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    pub booking: BookingService,
    pub reporting: ReportingService,
}

impl ApiState {
    pub fn new(stores: Stores, clock: Arc<dyn Clock>) -> Self {
        Self {
            booking: BookingService::new(stores.clone(), clock.clone()),
            reporting: ReportingService::new(stores, clock),
        }
    }
}

/// All routes with request tracing attached. Used by the server and by tests.
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Client booking flow
        .merge(routes::public::routes())
        // Staff panel
        .merge(routes::panel::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_origin(origins)
        .allow_credentials(true)
}

async fn handle_timeout(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "Request timed out".to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unhandled internal error: {}", err),
        )
    }
}

/// Starts the API server over PostgreSQL
///
/// Sets up logging, wires the store and the shop clock, configures routes
/// and serves until the process stops.
pub async fn start_server(config: config::ApiConfig, db_pool: DbPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let store = Arc::new(PgStore::new(db_pool));
    let clock = Arc::new(SystemClock::new(config.timezone));
    let state = Arc::new(ApiState::new(Stores::shared(store), clock));
    info!("Shop clock running in {}", config.timezone);

    let app = build_router(state);

    // Apply CORS configuration if origins are specified
    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)),
        None => app,
    };

    // Add request timeout middleware
    let app = app.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_timeout))
            .timeout(Duration::from_secs(config.request_timeout)),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
