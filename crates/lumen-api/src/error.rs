//! HTTP error response conversion
//!
//! Generic error handler for everything that is not an upload rejection.
//!
//! **Preferred handler pattern:** Return `Result<impl IntoResponse, HttpAppError>`. Use
//! `AppError` (or types that implement `Into<AppError>`) for errors so they render
//! consistently (status, body, logging). Upload handlers return `GatewayError` instead,
//! which falls back to this renderer for non-upload failures.

use axum::{
    body::Body,
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use lumen_core::{AppError, ErrorMetadata, LogLevel};
use lumen_storage::StorageError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// JSON body of a generic error. `message` matches the upload rejection body so clients
/// read both the same way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rule: IntoResponse and AppError are both foreign to this crate)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::UploadFailed(msg) => AppError::Storage(msg),
            StorageError::DeleteFailed(msg) => AppError::Storage(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        };
        HttpAppError(app)
    }
}

/// Convert JSON body deserialization failures into a 400 with our ErrorResponse format.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that returns our ErrorResponse format (400 + JSON) on deserialization failure.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = ErrorResponse {
            message: app_error.client_message(),
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            details: None,
            error_type: None,
        };
        let detailed = (!app_error.is_sensitive()).then(|| ErrorResponse {
            details: Some(app_error.detailed_message()),
            error_type: Some(app_error.error_type().to_string()),
            ..body.clone()
        });

        let mut response = (status, Json(body)).into_response();
        // Picked up by `error_details_middleware` when details may be shown.
        if let Some(detailed) = detailed {
            response.extensions_mut().insert(detailed);
        }
        response
    }
}

/// Swap error bodies for their detailed form when `show_details` is set.
///
/// The router installs this with `!config.is_production()`, so production responses
/// never carry details. Sensitive errors never attach a detailed body at all.
pub async fn error_details_middleware(
    State(show_details): State<bool>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let Some(detailed) = response.extensions_mut().remove::<ErrorResponse>() else {
        return response;
    };
    if !show_details {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    match serde_json::to_vec(&detailed) {
        Ok(bytes) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to serialize detailed error body");
            (parts.status, Json(ErrorResponse { details: None, error_type: None, ..detailed }))
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_map_to_app_errors() {
        let err = HttpAppError::from(StorageError::InvalidKey("bad".to_string()));
        assert!(matches!(err.0, AppError::InvalidInput(_)));

        let err = HttpAppError::from(StorageError::UploadFailed("disk".to_string()));
        assert!(matches!(err.0, AppError::Storage(_)));
    }

    #[test]
    fn into_response_uses_metadata_status() {
        let response = HttpAppError(AppError::NotFound("missing".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = HttpAppError(AppError::Storage("disk".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn detailed_body_attached_only_for_non_sensitive_errors() {
        let response = HttpAppError(AppError::NotFound("missing".to_string())).into_response();
        let detailed = response.extensions().get::<ErrorResponse>().unwrap();
        assert_eq!(detailed.error_type.as_deref(), Some("NotFound"));

        let response = HttpAppError(AppError::Storage("disk".to_string())).into_response();
        assert!(response.extensions().get::<ErrorResponse>().is_none());
    }

    fn app(show_details: bool) -> axum::Router {
        async fn failing() -> Result<(), HttpAppError> {
            Err(AppError::BadRequest("No image file provided".to_string()).into())
        }
        axum::Router::new()
            .route("/fail", axum::routing::get(failing))
            .layer(axum::middleware::from_fn_with_state(
                show_details,
                error_details_middleware,
            ))
    }

    #[tokio::test]
    async fn details_shown_outside_production() {
        let server = axum_test::TestServer::new(app(true)).unwrap();
        let body: serde_json::Value = server.get("/fail").await.json();
        assert_eq!(body["message"], "No image file provided");
        assert_eq!(body["error_type"], "BadRequest");
        assert!(body["details"].as_str().unwrap().contains("No image file provided"));
    }

    #[tokio::test]
    async fn details_hidden_in_production() {
        let server = axum_test::TestServer::new(app(false)).unwrap();
        let response = server.get("/fail").await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "BAD_REQUEST");
        assert!(body.get("details").is_none());
        assert!(body.get("error_type").is_none());
    }
}
