//! Route configuration and setup

use crate::error::error_details_middleware;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use lumen_core::constants::API_PREFIX;
use lumen_core::Config;
use lumen_infra::request_id_middleware;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries, part headers and text fields on top of the file cap.
const MULTIPART_OVERHEAD_BYTES: usize = 2 * 1024 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let upload_body_limit = config
        .max_upload_size_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let api_routes = Router::new()
        .route(
            "/upload",
            post(handlers::upload::upload_image).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route("/contact", post(handlers::contact::submit_contact));

    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest(API_PREFIX, api_routes)
        .nest_service("/uploads", ServeDir::new(config.local_storage_path()))
        .layer(axum::middleware::from_fn_with_state(
            !config.is_production(),
            error_details_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    tracing::info!(
        upload_limit_bytes = config.max_upload_size_bytes(),
        "Routes configured"
    );

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
