use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::api::response::ApiError;
use crate::uploads::UploadError;
use crate::AppState;

/// Serve a stored screenshot by file name.
/// Route: GET /static/uploads/:name
pub async fn serve_upload(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    // Stored names are flat; anything else cannot be ours
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
        return Err(ApiError::not_found("File not found"));
    }

    let data = state.uploads.read(&name).await.map_err(|e| match e {
        UploadError::NotFound(_) => ApiError::not_found("File not found"),
        _ => ApiError::internal(format!("Failed to retrieve file: {e}")),
    })?;

    let mime = mime_guess::from_path(&name).first_or_octet_stream();
    let mut response = (StatusCode::OK, data).into_response();
    let headers = response.headers_mut();

    headers.insert(
        header::CONTENT_TYPE,
        mime.essence_str()
            .parse()
            .unwrap_or(header::HeaderValue::from_static("application/octet-stream")),
    );

    if let Ok(value) = format!("inline; filename=\"{name}\"").parse() {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    // Uploads are write-once
    headers.insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("public, max-age=3600"),
    );

    Ok(response)
}
