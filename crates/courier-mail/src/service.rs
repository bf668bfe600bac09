use std::sync::Arc;

use courier_db::{RecordStore, Statement};
use courier_storage::ObjectStore;
use courier_types::models::{MessageSummary, MessageView};
use tracing::{info, warn};

use crate::batch::Rollback;
use crate::error::MailError;
use crate::ids::IdGenerator;
use crate::mail::{
    AttachmentDownload, AttachmentUpload, MAX_ATTACHMENT_SIZE, MAX_RECIPIENTS, OutgoingMail,
    dedupe_recipients,
};
use crate::repositories::{AttachmentRepository, MessageRepository, RecipientRepository};

/// Statements prepared for one send, in commit order: the message, then its
/// attachments, then its recipients.
#[derive(Debug)]
pub struct StagedSend {
    pub message_id: String,
    pub statements: Vec<Statement>,
}

/// Coordinates writes across the record store and the object store, and
/// serves stored mail back.
///
/// Holds no per-call state; one instance is shared by every request.
pub struct MailService {
    records: Arc<dyn RecordStore>,
    messages: MessageRepository,
    attachments: AttachmentRepository,
    recipients: RecipientRepository,
}

impl MailService {
    pub fn new(
        records: Arc<dyn RecordStore>,
        objects: Arc<dyn ObjectStore>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            messages: MessageRepository::new(records.clone(), ids.clone()),
            attachments: AttachmentRepository::new(records.clone(), objects, ids.clone()),
            recipients: RecipientRepository::new(records.clone(), ids),
            records,
        }
    }

    /// Store a message with its recipients and attachments. Returns the new
    /// message id.
    ///
    /// Limits are checked before anything is written. Payloads written before
    /// a later failure are deleted again before the error is returned; the
    /// record store is untouched because the batch never committed.
    pub async fn send_email(&self, mail: OutgoingMail) -> Result<String, MailError> {
        let recipients = dedupe_recipients(&mail.recipients);
        check_limits(&recipients, &mail.attachments)?;

        let mut rollback = Rollback::new();
        let outcome = match self.stage(&mail, &recipients, &mut rollback).await {
            Ok(staged) => self.commit(staged).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(message_id) => {
                info!(
                    "Stored message {}: {} recipients, {} attachments",
                    message_id,
                    recipients.len(),
                    mail.attachments.len()
                );
                Ok(message_id)
            }
            Err(err) => {
                match &err {
                    MailError::Storage(cause) => warn!("Send failed: {:#}", cause),
                    other => warn!("Send failed: {}", other),
                }
                if !rollback.is_empty() {
                    let written = rollback.keys().len();
                    let removed = rollback.compensate(&self.attachments).await;
                    warn!("Compensation removed {}/{} uploaded attachments", removed, written);
                }
                Err(err)
            }
        }
    }

    /// Prepare every statement for a send. Attachment payloads are written
    /// here; each written key is recorded in `rollback` as soon as it exists.
    pub async fn stage(
        &self,
        mail: &OutgoingMail,
        recipients: &[String],
        rollback: &mut Rollback,
    ) -> Result<StagedSend, MailError> {
        let message = self.messages.create_batch(&mail.subject, &mail.content);
        let message_id = message.id;
        let mut statements = Vec::with_capacity(1 + mail.attachments.len() + recipients.len());
        statements.push(message.statement);

        for upload in &mail.attachments {
            let attachment = self
                .attachments
                .create_batch(&message_id, upload)
                .await
                .map_err(MailError::classify)?;
            if let Some(key) = attachment.object_key {
                rollback.record(key);
            }
            statements.push(attachment.statement);
        }

        for email in recipients {
            statements.push(self.recipients.create_batch(&message_id, email).statement);
        }

        Ok(StagedSend {
            message_id,
            statements,
        })
    }

    async fn commit(&self, staged: StagedSend) -> Result<String, MailError> {
        self.records
            .batch(staged.statements)
            .await
            .map_err(MailError::classify)?;
        Ok(staged.message_id)
    }

    /// Every stored message, without recipients or attachments.
    pub async fn get_mails(&self) -> Result<Vec<MessageSummary>, MailError> {
        self.messages.find_all().await.map_err(MailError::classify)
    }

    /// A message with its recipients and attachments, or `None` if it does
    /// not exist.
    pub async fn get_one_mail(&self, id: &str) -> Result<Option<MessageView>, MailError> {
        let Some(summary) = self.messages.find_by_id(id).await.map_err(MailError::classify)? else {
            return Ok(None);
        };

        let (attachments, recipients) = tokio::try_join!(
            self.attachments.find_all_by_message_id(id),
            self.recipients.find_all_by_message_id(id),
        )
        .map_err(MailError::classify)?;

        Ok(Some(MessageView::new(summary, attachments, recipients)))
    }

    pub async fn download_attachment(
        &self,
        attachment_id: &str,
    ) -> Result<Option<AttachmentDownload>, MailError> {
        self.attachments
            .get_file(attachment_id)
            .await
            .map_err(MailError::classify)
    }

    /// Delete the message row only. Recipients, attachment rows and payloads
    /// are kept. Returns false if the message did not exist.
    pub async fn delete_mail(&self, id: &str) -> Result<bool, MailError> {
        let deleted = self.messages.delete(id).await.map_err(MailError::classify)?;
        if deleted {
            info!("Deleted message {}", id);
        }
        Ok(deleted)
    }
}

/// Recipient-count and attachment-size limits. `recipients` must already be
/// de-duplicated.
pub fn check_limits(recipients: &[String], attachments: &[AttachmentUpload]) -> Result<(), MailError> {
    if recipients.len() > MAX_RECIPIENTS {
        return Err(MailError::LimitExceeded {
            count: recipients.len(),
            max: MAX_RECIPIENTS,
        });
    }

    if let Some(file) = attachments.iter().find(|f| f.size() > MAX_ATTACHMENT_SIZE) {
        return Err(MailError::PayloadTooLarge {
            filename: file.filename.clone(),
            size: file.size(),
            max: MAX_ATTACHMENT_SIZE,
        });
    }

    Ok(())
}
