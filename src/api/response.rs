use axum::extract::multipart::MultipartRejection;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::validation::ValidationErrors;

// ============================================================================
// Response envelope
// ============================================================================

/// `{success, message, errors?, redirect?}` body shared by every JSON response.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl Envelope {
    pub fn redirect(message: impl Into<String>, redirect: impl Into<String>) -> Json<Envelope> {
        Json(Envelope {
            success: true,
            message: message.into(),
            errors: None,
            redirect: Some(redirect.into()),
        })
    }

    fn failure(message: String, errors: Option<ValidationErrors>) -> Json<Envelope> {
        Json(Envelope {
            success: false,
            message,
            errors,
            redirect: None,
        })
    }
}

// ============================================================================
// Unified error type for handlers
// ============================================================================

/// Error rendered as a `success: false` envelope with the given status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub errors: Option<ValidationErrors>,
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Envelope::failure(self.message, self.errors)).into_response()
    }
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
            errors: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 400 carrying per-field messages.
    pub fn invalid(errors: ValidationErrors) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: "Form validation failed".to_string(),
            errors: Some(errors),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

// ============================================================================
// Custom extractors (reject with enveloped ApiError)
// ============================================================================

/// Drop-in replacement for `axum::extract::Multipart` that rejects with an envelope.
pub struct AppMultipart(pub Multipart);

#[axum::async_trait]
impl<S> FromRequest<S> for AppMultipart
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, ApiError> {
        match Multipart::from_request(req, state).await {
            Ok(multipart) => Ok(AppMultipart(multipart)),
            Err(rejection) => {
                let message = match rejection {
                    MultipartRejection::InvalidBoundary(_) => {
                        "Expected a multipart/form-data request body".to_string()
                    }
                    other => other.body_text(),
                };
                Err(ApiError::bad_request(message))
            }
        }
    }
}

/// Map a multipart read failure, keeping the body-limit status.
pub fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("Request payload exceeds the maximum upload size")
    } else {
        ApiError::bad_request(format!("Invalid multipart data: {}", e.body_text()))
    }
}
