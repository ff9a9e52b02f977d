use axum::extract::multipart::Field;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use crate::api::response::{multipart_error, ApiError, AppMultipart, Envelope};
use crate::submission::{self, SubmitError};
use crate::validation::{SubscriptionForm, UploadedFile};
use crate::AppState;

const SUCCESS_MESSAGE: &str = "Form submitted successfully! Redirecting…";

// ============================================================================
// Handlers
// ============================================================================

pub async fn submit_subscription(
    State(state): State<Arc<AppState>>,
    AppMultipart(mut multipart): AppMultipart,
) -> Result<Json<Envelope>, ApiError> {
    let mut form = SubscriptionForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "payment_screenshot" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().map(|s| s.to_string());
                let data = field.bytes().await.map_err(multipart_error)?;

                form.payment_screenshot = Some(UploadedFile {
                    file_name,
                    content_type,
                    data,
                });
            }
            "name" => form.name = Some(text(field).await?),
            "telegram" => form.telegram = Some(text(field).await?),
            "instagram" => form.instagram = Some(text(field).await?),
            "phone" => form.phone = Some(text(field).await?),
            "csrf_token" => form.csrf_token = Some(text(field).await?),
            _ => {
                // Ignore unknown fields
            }
        }
    }

    match submission::submit(&state, form).await {
        Ok(submitted) => Ok(Envelope::redirect(SUCCESS_MESSAGE, submitted.redirect)),
        Err(SubmitError::Validation(errors)) => {
            tracing::debug!(fields = ?errors.fields().collect::<Vec<_>>(), "Rejected submission");
            Err(ApiError::invalid(errors))
        }
        Err(e @ (SubmitError::Upload(_) | SubmitError::Storage(_))) => {
            tracing::error!(error = %e, "Failed to store submission");
            Err(ApiError::internal("Failed to store submission"))
        }
        Err(SubmitError::Notification(_)) => {
            Err(ApiError::internal("Failed to send notification"))
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

async fn text(field: Field<'_>) -> Result<String, ApiError> {
    field.text().await.map_err(multipart_error)
}
