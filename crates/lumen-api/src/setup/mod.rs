//! Application setup: services, routes and server startup.

pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use lumen_core::Config;
use lumen_storage::LocalStorage;

use crate::services::EmailService;
use crate::state::AppState;
use crate::upload::UploadGateway;

/// Build application state and router from configuration.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router), anyhow::Error> {
    let storage = LocalStorage::new(
        config.local_storage_path(),
        config.local_storage_base_url().to_string(),
    )
    .await
    .context("Failed to initialize local storage")?;

    tracing::info!(
        path = %config.local_storage_path(),
        base_url = %config.local_storage_base_url(),
        "Local storage initialized"
    );

    let gateway = UploadGateway::images(config.max_upload_size_bytes());
    let email = EmailService::from_config(&config);

    let state = Arc::new(AppState::new(
        config.clone(),
        gateway,
        Arc::new(storage),
        email,
    ));

    let router = routes::setup_routes(&config, state.clone())?;
    Ok((state, router))
}
