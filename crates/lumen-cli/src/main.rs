//! Lumen CLI: command-line client for the Lumen API.
//!
//! Base URL from `--api-url`, LUMEN_API_URL or API_URL. The bearer token is kept in a
//! JSON file written by `lumen login`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use lumen_api_client::{api_url_from_env, ApiClient};
use lumen_cli::{image_form, init_tracing, token_store};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "lumen", about = "Lumen API CLI")]
struct Cli {
    /// API base URL (defaults to API_URL, then http://localhost:5000/api)
    #[arg(long, env = "LUMEN_API_URL", global = true)]
    api_url: Option<String>,
    /// Token file location
    #[arg(long, global = true)]
    token_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a bearer token for later requests
    Login {
        token: String,
    },
    /// Forget the stored token
    Logout,
    /// Upload an image
    Upload {
        /// Path to the image file
        file: PathBuf,
    },
    /// Send a contact form message
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
    },
    /// GET an endpoint and print the JSON response
    Get {
        /// Endpoint relative to the base URL
        endpoint: String,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let store = token_store(cli.token_file)?;
    let api_url = cli.api_url.unwrap_or_else(api_url_from_env);
    let client = || {
        ApiClient::new(api_url.clone(), Arc::new(store.clone()))
            .context("Failed to create API client")
    };

    match cli.command {
        Commands::Login { token } => {
            store.set(&token).context("Failed to store token")?;
            print_json(&json!({ "message": "Logged in", "token_file": store.path() }))?;
        }
        Commands::Logout => {
            store.clear().context("Failed to remove token")?;
            print_json(&json!({ "message": "Logged out" }))?;
        }
        Commands::Upload { file } => {
            let form = image_form(&file).await?;
            let response: Value = client()?.upload("/upload", form).await?;
            print_json(&response)?;
        }
        Commands::Contact {
            name,
            email,
            message,
        } => {
            let body = json!({ "name": name, "email": email, "message": message });
            let response: Value = client()?.post_json("/contact", &body).await?;
            print_json(&response)?;
        }
        Commands::Get { endpoint } => {
            let response: Value = client()?.get(&endpoint).await?;
            print_json(&response)?;
        }
    }

    Ok(())
}
