use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use courier_db::models::AttachmentRow;
use courier_db::{RecordStore, Statement};
use courier_storage::{ObjectMetadata, ObjectStore};
use courier_types::models::AttachmentView;
use tracing::{debug, warn};

use crate::batch::BatchResponse;
use crate::ids::IdGenerator;
use crate::mail::{AttachmentDownload, AttachmentUpload};

/// Object-store key for an attachment payload.
///
/// Path separators in the filename are replaced so the key always has
/// exactly four segments.
pub fn object_key(message_id: &str, attachment_id: &str, filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();
    format!("attachments/messages/{}/{}_{}", message_id, attachment_id, safe)
}

pub struct AttachmentRepository {
    records: Arc<dyn RecordStore>,
    objects: Arc<dyn ObjectStore>,
    ids: Arc<dyn IdGenerator>,
}

impl AttachmentRepository {
    pub fn new(
        records: Arc<dyn RecordStore>,
        objects: Arc<dyn ObjectStore>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            records,
            objects,
            ids,
        }
    }

    /// Write the payload to the object store, then prepare the metadata
    /// insert. The returned `object_key` already exists when this returns.
    pub async fn create_batch(
        &self,
        message_id: &str,
        upload: &AttachmentUpload,
    ) -> Result<BatchResponse> {
        let attachment_id = self.ids.next_id();
        let key = object_key(message_id, &attachment_id, &upload.filename);
        let uploaded_at = Utc::now().timestamp_millis();

        let metadata = ObjectMetadata::with_content_type(upload.content_type.as_str())
            .insert("attachmentId", attachment_id.as_str())
            .insert("messageId", message_id)
            .insert("originalFilename", upload.filename.as_str())
            .insert("uploadedAt", uploaded_at.to_string());

        self.objects.put(&key, upload.body.clone(), metadata).await?;
        debug!("Uploaded attachment {} ({} bytes) to {}", attachment_id, upload.size(), key);

        let statement = Statement::new(
            "INSERT INTO attachments (id, message_id, filename, content_type, size, object_key, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(attachment_id.clone())
        .bind(message_id.to_string())
        .bind(upload.filename.clone())
        .bind(upload.content_type.clone())
        .bind(upload.size() as i64)
        .bind(key.clone())
        .bind(uploaded_at);

        Ok(BatchResponse::new(attachment_id, statement).with_object_key(key))
    }

    pub async fn find_all_by_message_id(&self, message_id: &str) -> Result<Vec<AttachmentView>> {
        let rows = self
            .records
            .all(Statement::new("SELECT * FROM attachments WHERE message_id = ?1").bind(message_id.to_string()))
            .await?;

        rows.iter()
            .map(|r| {
                let row = AttachmentRow::from_row(r)?;
                Ok(AttachmentView {
                    download_url: AttachmentView::download_url(&row.id),
                    id: row.id,
                    filename: row.filename,
                    content_type: row.content_type,
                    size: row.size,
                })
            })
            .collect()
    }

    /// Remove a payload from the object store. The metadata row, if any, is
    /// left alone.
    pub async fn delete(&self, object_key: &str) -> Result<()> {
        self.objects.delete(object_key).await
    }

    /// Metadata row joined with its payload. `None` if either is missing.
    pub async fn get_file(&self, attachment_id: &str) -> Result<Option<AttachmentDownload>> {
        let Some(row) = self
            .records
            .first(Statement::new("SELECT * FROM attachments WHERE id = ?1").bind(attachment_id.to_string()))
            .await?
        else {
            return Ok(None);
        };
        let row = AttachmentRow::from_row(&row)?;

        let Some(object) = self.objects.get(&row.object_key).await? else {
            warn!("Attachment {} references missing object {}", row.id, row.object_key);
            return Ok(None);
        };

        Ok(Some(AttachmentDownload {
            filename: row.filename,
            content_type: row.content_type,
            size: row.size,
            body: object.body,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_scheme() {
        assert_eq!(
            object_key("m1", "a1", "notes.txt"),
            "attachments/messages/m1/a1_notes.txt"
        );
    }

    #[test]
    fn test_object_key_flattens_separators() {
        assert_eq!(
            object_key("m1", "a1", "../../etc/passwd"),
            "attachments/messages/m1/a1_.._.._etc_passwd"
        );
        assert!(courier_storage::validate_key(&object_key("m1", "a1", "a\\b")).is_ok());
    }
}
