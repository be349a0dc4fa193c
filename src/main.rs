//! Member Picker Backend
//!
//! Fetches a community's member directory from the upstream platform API, caches it,
//! and serves filtered views, random picks and summary statistics over REST.

mod api;
mod auth;
mod cache;
mod client;
mod config;
mod errors;
mod filters;
mod models;
mod picker;
mod sampler;
mod stats;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cache::SystemClock;
use client::DirectoryClient;
use config::Config;
use picker::Picker;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub picker: Arc<Picker>,
}

impl AppState {
    /// Build the state for a configuration, using the wall clock.
    pub fn from_config(config: &Config) -> Result<Self, errors::PickerError> {
        let client = DirectoryClient::from_config(config)?;
        let picker = Picker::new(client, config.cache_ttl, Arc::new(SystemClock));

        Ok(Self {
            picker: Arc::new(picker),
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Member Picker Backend");
    tracing::info!("Upstream members endpoint: {}", config.upstream_url);
    tracing::info!(
        "Page size: {}, cache TTL: {:?}, request timeout: {:?}",
        config.page_size,
        config.cache_ttl,
        config.request_timeout
    );
    tracing::info!("Bind address: {}", config.bind_addr);

    let state = AppState::from_config(&config)?;

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes; each handler extracts and checks the community token itself
    let api_routes = Router::new()
        .route("/token", get(api::probe_token))
        .route("/members/filter", post(api::filter_members))
        .route("/members/sample", post(api::sample_members))
        .route("/members/search", post(api::search_members))
        .route("/stats", get(api::get_stats))
        .route("/cache", delete(api::clear_cache));

    // Health check (no token required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
