use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, header},
    response::IntoResponse,
};
use tracing::warn;

use courier_mail::MailError;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/attachments/{id}/download. Streams the stored payload back with
/// its original filename and content type.
pub async fn download_attachment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let file = state
        .mail
        .download_attachment(&id)
        .await?
        .ok_or(MailError::NotFound("Attachment file"))?;

    let mut headers = HeaderMap::new();
    let content_type = HeaderValue::from_str(&file.content_type).unwrap_or_else(|_| {
        warn!("Attachment {} has unusable content type '{}'", id, file.content_type);
        HeaderValue::from_static("application/octet-stream")
    });
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(file.size));
    if let Ok(disposition) = HeaderValue::from_str(&content_disposition(&file.filename)) {
        headers.insert(header::CONTENT_DISPOSITION, disposition);
    }

    Ok((headers, Body::from(file.body)))
}

/// RFC 5987 `attachment` disposition; the filename is percent-encoded UTF-8.
pub fn content_disposition(filename: &str) -> String {
    format!("attachment; filename*=UTF-8''{}", urlencoding::encode(filename))
}
