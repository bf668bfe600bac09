use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use courier_mail::MailError;
use courier_types::api::{ErrorResponse, FieldError, ValidationErrorResponse};

/// Everything a handler can fail with, rendered as a JSON error body.
#[derive(Debug)]
pub enum ApiError {
    Mail(MailError),
    Validation(Vec<FieldError>),
    BadRequest(String),
    /// The request body ran past the configured size limit.
    BodyTooLarge(String),
}

impl From<MailError> for ApiError {
    fn from(err: MailError) -> Self {
        ApiError::Mail(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                Json(ValidationErrorResponse::new(details)),
            )
                .into_response(),
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(message, "BAD_REQUEST")),
            )
                .into_response(),
            ApiError::BodyTooLarge(message) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(ErrorResponse::new(message, "PAYLOAD_TOO_LARGE")),
            )
                .into_response(),
            ApiError::Mail(err) => {
                let status = StatusCode::from_u16(err.status())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let message = match &err {
                    MailError::Storage(cause) => {
                        error!("Storage failure: {:#}", cause);
                        "An unexpected error occurred".to_string()
                    }
                    other => other.to_string(),
                };
                (status, Json(ErrorResponse::new(message, err.code()))).into_response()
            }
        }
    }
}
