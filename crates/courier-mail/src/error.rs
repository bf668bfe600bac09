use thiserror::Error;

/// Classified failure of a mail operation.
///
/// Every variant carries a stable code and a recommended HTTP status so the
/// request layer can render it without re-deriving semantics.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Maximum {max} recipients allowed, got {count}")]
    LimitExceeded { count: usize, max: usize },

    #[error("Attachment '{filename}' is {size} bytes, maximum file size is {max} bytes")]
    PayloadTooLarge { filename: String, size: u64, max: u64 },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Internal storage error")]
    Storage(#[source] anyhow::Error),
}

impl MailError {
    /// Forward an error that is already classified, wrap anything else as a
    /// storage failure.
    pub fn classify(err: anyhow::Error) -> Self {
        match err.downcast::<MailError>() {
            Ok(classified) => classified,
            Err(other) => MailError::Storage(other),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            MailError::LimitExceeded { .. } => "LIMIT_EXCEEDED",
            MailError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            MailError::NotFound(_) => "NOT_FOUND",
            MailError::Storage(_) => "INTERNAL_STORAGE_ERROR",
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            MailError::LimitExceeded { .. } => 400,
            MailError::PayloadTooLarge { .. } => 413,
            MailError::NotFound(_) => 404,
            MailError::Storage(_) => 500,
        }
    }
}
