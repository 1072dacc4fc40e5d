//! Test helpers: build the router over a temporary upload directory.
//!
//! Run from workspace root: `cargo test -p lumen-api`.

pub mod fixtures;

use axum_test::TestServer;
use lumen_api::setup;
use lumen_core::constants::API_PREFIX;
use lumen_core::{Config, SiteConfig};
use tempfile::TempDir;

/// API path prefix for tests (e.g. `/api/upload`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}

/// Test application: server plus the directory backing local storage.
pub struct TestApp {
    pub server: TestServer,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

fn test_config(storage_path: &str, extra: &[(&str, &str)]) -> Config {
    let mut pairs: Vec<(String, String)> = vec![
        ("LOCAL_STORAGE_PATH".to_string(), storage_path.to_string()),
        (
            "LOCAL_STORAGE_BASE_URL".to_string(),
            "http://localhost:5000/uploads".to_string(),
        ),
    ];
    pairs.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));

    let site = SiteConfig::from_lookup(|key| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    })
    .expect("Failed to build test config");
    Config(Box::new(site))
}

/// Setup test app with default limits and the stub mail service.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(&[]).await
}

/// Setup test app with extra configuration keys.
pub async fn setup_test_app_with(extra: &[(&str, &str)]) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage_path = temp_dir
        .path()
        .to_str()
        .expect("Temp dir path is not UTF-8")
        .to_string();

    let config = test_config(&storage_path, extra);
    let (_state, router) = setup::initialize_app(config)
        .await
        .expect("Failed to initialize app");

    let server = TestServer::new(router).expect("Failed to create test server");
    TestApp { server, temp_dir }
}
