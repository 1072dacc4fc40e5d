use lumen_api::setup;
use lumen_core::Config;
use lumen_infra::{init_telemetry, LogFormat};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    init_telemetry("lumen-api", LogFormat::from_env())
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    // Initialize the application (storage, services, routes)
    let (_state, router) = setup::initialize_app(config.clone()).await?;

    // Start the server
    setup::server::start_server(&config, router).await?;

    Ok(())
}
