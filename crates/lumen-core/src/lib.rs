//! Lumen Core Library
//!
//! Error types, configuration and constants shared by every Lumen crate.

pub mod config;
pub mod constants;
pub mod error;

// Re-export commonly used types
pub use config::{BaseConfig, Config, SiteConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
