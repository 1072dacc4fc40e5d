use reqwest::StatusCode;
use thiserror::Error;

/// Message used when a failed JSON request carries no usable error body.
pub const DEFAULT_REQUEST_ERROR: &str = "Something went wrong";
/// Message used when a failed upload carries no usable error body.
pub const DEFAULT_UPLOAD_ERROR: &str = "Upload failed";

/// Failure of a single API call. Displays as the human-readable message only.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered outside 200-299.
    #[error("{message}")]
    Http { status: StatusCode, message: String },

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A success response whose body was not the expected JSON.
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status of the failed response, when there was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Network(err) => err.status(),
            ApiError::Decode(_) => None,
        }
    }
}

/// Pull the message out of an error body: `message`, then `msg`, then the default.
pub(crate) fn error_message(body: &[u8], default: &str) -> String {
    let parsed: serde_json::Value =
        serde_json::from_slice(body).unwrap_or_else(|_| serde_json::json!({}));
    ["message", "msg"]
        .iter()
        .find_map(|key| {
            parsed
                .get(key)
                .and_then(|v| v.as_str())
                .filter(|m| !m.is_empty())
        })
        .unwrap_or(default)
        .to_string()
}
