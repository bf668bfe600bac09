use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use bytes::Bytes;
use validator::ValidateEmail;

use courier_mail::{
    AttachmentUpload, MAX_ATTACHMENT_SIZE, MAX_RECIPIENTS, MAX_SUBJECT_CHARS, OutgoingMail,
    dedupe_recipients,
};
use courier_types::api::FieldError;

use crate::error::ApiError;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Raw send-email form as submitted, before any checks.
#[derive(Debug, Default)]
pub struct SendEmailForm {
    pub subject: Option<String>,
    pub content: Option<String>,
    pub recipients: Vec<String>,
    pub attachments: Vec<AttachmentUpload>,
}

/// Collect the multipart fields `subject`, `content`, `recipients` (repeated)
/// and `attachments` (repeated files). Unknown fields are ignored, and so are
/// empty file inputs.
pub async fn read_form(mut multipart: Multipart) -> Result<SendEmailForm, ApiError> {
    let mut form = SendEmailForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "subject" => form.subject = Some(read_text(field).await?),
            "content" => form.content = Some(read_text(field).await?),
            "recipients" => form.recipients.push(read_text(field).await?),
            "attachments" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let body: Bytes = field.bytes().await.map_err(multipart_error)?;

                if filename.is_empty() && body.is_empty() {
                    continue;
                }
                form.attachments
                    .push(AttachmentUpload::new(filename, content_type, body));
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field.text().await.map_err(multipart_error)
}

/// A body cut off by the request size limit is a payload problem, anything
/// else is a malformed form.
fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::BodyTooLarge(err.body_text())
    } else {
        ApiError::BadRequest(err.body_text())
    }
}

/// Check every field and report all problems at once.
pub fn validate(form: SendEmailForm) -> Result<OutgoingMail, Vec<FieldError>> {
    let mut errors = Vec::new();

    let subject = form.subject.unwrap_or_default();
    if subject.is_empty() {
        errors.push(FieldError::new("subject", "Subject must not be empty"));
    } else if subject.chars().count() > MAX_SUBJECT_CHARS {
        errors.push(FieldError::new(
            "subject",
            format!("Subject must be at most {} characters", MAX_SUBJECT_CHARS),
        ));
    }

    let content = form.content.unwrap_or_default();
    if content.is_empty() {
        errors.push(FieldError::new("content", "Content must not be empty"));
    }

    if form.recipients.is_empty() {
        errors.push(FieldError::new(
            "recipients",
            "At least one recipient must be provided",
        ));
    }
    for (i, addr) in form.recipients.iter().enumerate() {
        if !addr.validate_email() {
            errors.push(FieldError::new(
                format!("recipients[{}]", i),
                "Invalid email address",
            ));
        }
    }
    if dedupe_recipients(&form.recipients).len() > MAX_RECIPIENTS {
        errors.push(FieldError::new(
            "recipients",
            format!("Maximum of {} recipients allowed", MAX_RECIPIENTS),
        ));
    }

    for (i, file) in form.attachments.iter().enumerate() {
        if file.size() > MAX_ATTACHMENT_SIZE {
            errors.push(FieldError::new(
                format!("attachments[{}]", i),
                "Max file size is 4MB",
            ));
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(OutgoingMail {
        subject,
        content,
        recipients: form.recipients,
        attachments: form.attachments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(subject: &str, content: &str, recipients: &[&str]) -> SendEmailForm {
        SendEmailForm {
            subject: Some(subject.to_string()),
            content: Some(content.to_string()),
            recipients: recipients.iter().map(|s| s.to_string()).collect(),
            attachments: vec![],
        }
    }

    fn fields(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_valid_form_passes() {
        let mail = validate(form("Hi", "Body", &["a@x.com"])).unwrap();
        assert_eq!(mail.subject, "Hi");
        assert_eq!(mail.recipients, vec!["a@x.com"]);
    }

    #[test]
    fn test_reports_every_problem() {
        let errors = validate(form("", "", &[])).unwrap_err();
        assert_eq!(fields(&errors), vec!["subject", "content", "recipients"]);
    }

    #[test]
    fn test_subject_length_counts_chars() {
        let exact = "é".repeat(MAX_SUBJECT_CHARS);
        assert!(validate(form(&exact, "Body", &["a@x.com"])).is_ok());

        let over = "a".repeat(MAX_SUBJECT_CHARS + 1);
        let errors = validate(form(&over, "Body", &["a@x.com"])).unwrap_err();
        assert_eq!(fields(&errors), vec!["subject"]);
    }

    #[test]
    fn test_recipient_limit_uses_distinct_addresses() {
        assert!(validate(form("Hi", "Body", &["a@x.com", "a@x.com", "b@x.com", "c@x.com"])).is_ok());

        let errors =
            validate(form("Hi", "Body", &["a@x.com", "b@x.com", "c@x.com", "d@x.com"])).unwrap_err();
        assert_eq!(errors[0].message, "Maximum of 3 recipients allowed");
    }

    #[test]
    fn test_invalid_addresses_are_indexed() {
        let errors = validate(form("Hi", "Body", &["a@x.com", "nope"])).unwrap_err();
        assert_eq!(fields(&errors), vec!["recipients[1]"]);
    }

    #[test]
    fn test_oversized_attachment() {
        let mut f = form("Hi", "Body", &["a@x.com"]);
        f.attachments.push(AttachmentUpload::new(
            "big.bin",
            "application/octet-stream",
            Bytes::from(vec![0u8; MAX_ATTACHMENT_SIZE as usize + 1]),
        ));
        let errors = validate(f).unwrap_err();
        assert_eq!(errors[0].message, "Max file size is 4MB");
    }

    #[test]
    fn test_address_syntax() {
        let errors = validate(form(
            "Hi",
            "Body",
            &["first.last+tag@mail.example.org", "@x.com", "a@x..com"],
        ))
        .unwrap_err();
        assert_eq!(fields(&errors), vec!["recipients[1]", "recipients[2]"]);

        let errors = validate(form("Hi", "Body", &["a b@x.com"])).unwrap_err();
        assert_eq!(fields(&errors), vec!["recipients[0]"]);
    }
}
