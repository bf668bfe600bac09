use serde::{Deserialize, Serialize};

// -- Envelopes --

/// Successful response body: `{ "ok": true, "result": ... }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(result: T) -> Self {
        Self { ok: true, result }
    }
}

/// Error body carrying a stable machine-readable code.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
            code: code.into(),
        }
    }
}

// -- Send --

#[derive(Debug, Serialize, Deserialize)]
pub struct SendEmailResponse {
    pub ok: bool,
    pub id: String,
}

/// One rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationErrorResponse {
    pub ok: bool,
    pub error: String,
    pub code: String,
    pub details: Vec<FieldError>,
}

impl ValidationErrorResponse {
    pub fn new(details: Vec<FieldError>) -> Self {
        Self {
            ok: false,
            error: "Validation failed".into(),
            code: "VALIDATION_FAILED".into(),
            details,
        }
    }
}
