use std::path::{Path, PathBuf};

use anyhow::Context;
use lumen_api_client::FileTokenStore;
use reqwest::multipart::{Form, Part};

/// Multipart field the upload endpoint reads the image from.
pub const UPLOAD_FIELD: &str = "image";

/// MIME type for a local file, guessed from its extension.
pub fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Build the upload form for a local file.
pub async fn image_form(path: &Path) -> anyhow::Result<Form> {
    if path
        .components()
        .any(|c| c == std::path::Component::ParentDir)
    {
        return Err(anyhow::anyhow!("Invalid input: {}", path.display()));
    }
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();
    let part = Part::bytes(data)
        .file_name(filename)
        .mime_str(&guess_mime(path))
        .context("Invalid MIME type")?;

    Ok(Form::new().part(UPLOAD_FIELD, part))
}

/// Token store at `--token-file`, or the per-user default location.
pub fn token_store(token_file: Option<PathBuf>) -> anyhow::Result<FileTokenStore> {
    let path = token_file
        .or_else(FileTokenStore::default_path)
        .context("No config directory found; pass --token-file")?;
    Ok(FileTokenStore::new(path))
}

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays JSON.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}
