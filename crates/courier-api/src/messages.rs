use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, warn};

use courier_mail::MailError;
use courier_types::api::{ApiResponse, SendEmailResponse};

use crate::error::ApiError;
use crate::state::AppState;
use crate::validate::{read_form, validate};

/// POST /api/send-email. Takes a multipart form with `subject`, `content`, repeated
/// `recipients` and optional repeated `attachments` files.
pub async fn send_email(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_form(multipart).await?;
    let mail = validate(form).map_err(|details| {
        warn!("Rejected send-email form: {} invalid fields", details.len());
        ApiError::Validation(details)
    })?;

    let id = state.mail.send_email(mail).await?;
    info!("Accepted message {}", id);

    Ok((
        StatusCode::ACCEPTED,
        Json(SendEmailResponse { ok: true, id }),
    ))
}

/// GET /api/messages. Summaries only.
pub async fn list_messages(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let messages = state.mail.get_mails().await?;
    Ok(Json(ApiResponse::ok(messages)))
}

/// GET /api/messages/{id}
pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state
        .mail
        .get_one_mail(&id)
        .await?
        .ok_or(MailError::NotFound("Message"))?;
    Ok(Json(ApiResponse::ok(message)))
}

/// DELETE /api/messages/{id}. Removes the message row only.
pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.mail.delete_mail(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(MailError::NotFound("Message").into())
    }
}
