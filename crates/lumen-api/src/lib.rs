//! Lumen API Library
//!
//! HTTP backend of the Lumen site: the image upload gateway, the contact form and
//! application setup.

pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod upload;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
pub use upload::{GatewayError, UploadError, UploadGateway, UploadedFile};
