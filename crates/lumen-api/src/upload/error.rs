//! Upload failures and their translation into HTTP responses.
//!
//! Every failure raised while accepting an upload is an `UploadError` variant. The
//! translation step classifies by variant, never by message text: upload failures
//! become `400 {"message": ...}`, anything else is handed back untouched for the
//! generic `AppError` renderer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lumen_core::AppError;
use lumen_storage::StorageError;
use serde::{Deserialize, Serialize};

use crate::error::HttpAppError;

const BYTES_PER_MB: usize = 1024 * 1024;

/// Failure raised by the upload gateway. Exactly one variant per rejected request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    /// The file exceeded the configured byte limit.
    #[error("upload exceeded {limit} bytes")]
    SizeExceeded { limit: usize },

    /// The declared MIME type was refused by the validator.
    #[error("{reason}")]
    TypeRejected { mime_type: String, reason: String },

    /// Any other failure surfaced by the multipart layer.
    #[error("{0}")]
    Transport(String),
}

impl UploadError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            UploadError::SizeExceeded { .. } => "size-exceeded",
            UploadError::TypeRejected { .. } => "type-rejected",
            UploadError::Transport(_) => "upload-transport-error",
        }
    }

    pub fn client_message(&self) -> String {
        match self {
            UploadError::SizeExceeded { limit } => {
                if *limit >= BYTES_PER_MB && limit % BYTES_PER_MB == 0 {
                    format!("File too large. Maximum size is {}MB.", limit / BYTES_PER_MB)
                } else {
                    format!("File too large. Maximum size is {} bytes.", limit)
                }
            }
            UploadError::TypeRejected { reason, .. } => reason.clone(),
            UploadError::Transport(detail) => format!("Upload error: {}", detail),
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

/// JSON body returned for rejected uploads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadErrorBody {
    pub message: String,
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        tracing::debug!(kind = self.kind(), error = %self, "Upload rejected");
        let body = UploadErrorBody {
            message: self.client_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Error type of handlers that sit behind the upload gateway.
#[derive(Debug)]
pub enum GatewayError {
    Upload(UploadError),
    Other(AppError),
}

impl From<UploadError> for GatewayError {
    fn from(err: UploadError) -> Self {
        GatewayError::Upload(err)
    }
}

impl From<AppError> for GatewayError {
    fn from(err: AppError) -> Self {
        GatewayError::Other(err)
    }
}

impl From<StorageError> for GatewayError {
    fn from(err: StorageError) -> Self {
        GatewayError::Other(HttpAppError::from(err).0)
    }
}

/// Turn an upload failure into its HTTP response.
///
/// Errors that did not originate in the upload layer come back as `Err`, unchanged,
/// so the caller can pass them on to the generic error handler.
pub fn translate_failure(err: GatewayError) -> Result<Response, AppError> {
    match err {
        GatewayError::Upload(upload) => Ok(upload.into_response()),
        GatewayError::Other(other) => Err(other),
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match translate_failure(self) {
            Ok(response) => response,
            Err(other) => HttpAppError(other).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_exceeded_message_is_fixed() {
        let err = UploadError::SizeExceeded {
            limit: 10 * 1024 * 1024,
        };
        assert_eq!(err.client_message(), "File too large. Maximum size is 10MB.");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), "size-exceeded");
    }

    #[test]
    fn size_limits_below_a_megabyte_are_reported_in_bytes() {
        let err = UploadError::SizeExceeded { limit: 512 * 1024 };
        assert_eq!(err.client_message(), "File too large. Maximum size is 524288 bytes.");

        let err = UploadError::SizeExceeded {
            limit: 3 * 1024 * 1024 + 1,
        };
        assert_eq!(err.client_message(), "File too large. Maximum size is 3145729 bytes.");
    }

    #[test]
    fn type_rejected_uses_validator_reason() {
        let err = UploadError::TypeRejected {
            mime_type: "text/plain".to_string(),
            reason: "Only image files are allowed".to_string(),
        };
        assert_eq!(err.client_message(), "Only image files are allowed");
    }

    #[test]
    fn transport_errors_are_wrapped() {
        let err = UploadError::Transport("stream ended early".to_string());
        assert_eq!(err.client_message(), "Upload error: stream ended early");
    }

    #[test]
    fn upload_errors_translate_to_bad_request() {
        let response = translate_failure(GatewayError::Upload(UploadError::SizeExceeded {
            limit: 10 * 1024 * 1024,
        }))
        .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unrelated_errors_pass_through_unchanged() {
        let result = translate_failure(GatewayError::Other(AppError::Storage(
            "disk full".to_string(),
        )));
        match result {
            Err(AppError::Storage(msg)) => assert_eq!(msg, "disk full"),
            other => panic!("expected pass-through, got {:?}", other.map(|r| r.status())),
        }
    }

    #[test]
    fn gateway_error_renders_unrelated_errors_with_their_own_status() {
        let response =
            GatewayError::Other(AppError::Internal("boom".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
