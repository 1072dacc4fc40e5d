use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use lumen_core::AppError;
use serde::Deserialize;
use validator::Validate;

use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    pub message: String,
}

/// Contact form handler. Forwards the message to the configured recipient.
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<ContactRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), HttpAppError> {
    request.validate().map_err(AppError::from)?;
    if request.name.trim().is_empty() || request.message.trim().is_empty() {
        return Err(AppError::InvalidInput("Name and message must not be blank".to_string()).into());
    }

    let recipients: Vec<String> = state
        .config
        .contact_recipient()
        .map(|r| vec![r.to_string()])
        .unwrap_or_default();

    let subject = format!("Website contact from {}", request.name.trim());
    let body = format!(
        "Name: {}\nEmail: {}\n\n{}",
        request.name.trim(),
        request.email,
        request.message
    );

    state
        .email
        .send(&recipients, &subject, &body, Some(&request.email))
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "message": "Message received" })),
    ))
}
