use std::sync::Arc;

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use courier_db::models::MessageRow;
use courier_db::{RecordStore, Statement};
use courier_types::models::MessageSummary;

use crate::batch::BatchResponse;
use crate::ids::IdGenerator;

pub struct MessageRepository {
    records: Arc<dyn RecordStore>,
    ids: Arc<dyn IdGenerator>,
}

impl MessageRepository {
    pub fn new(records: Arc<dyn RecordStore>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { records, ids }
    }

    /// Prepare the insert for a new message. `sent_at` is fixed here.
    pub fn create_batch(&self, subject: &str, content: &str) -> BatchResponse {
        let id = self.ids.next_id();
        let sent_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let statement = Statement::new(
            "INSERT INTO messages (id, subject, content, sent_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(id.clone())
        .bind(subject.to_string())
        .bind(content.to_string())
        .bind(sent_at);

        BatchResponse::new(id, statement)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<MessageSummary>> {
        let row = self
            .records
            .first(
                Statement::new("SELECT id, subject, content, sent_at FROM messages WHERE id = ?1")
                    .bind(id.to_string()),
            )
            .await?;

        row.map(|r| MessageRow::from_row(&r).map(into_summary))
            .transpose()
    }

    pub async fn find_all(&self) -> Result<Vec<MessageSummary>> {
        let rows = self
            .records
            .all(Statement::new(
                "SELECT id, subject, content, sent_at FROM messages ORDER BY sent_at DESC, id",
            ))
            .await?;

        rows.iter()
            .map(|r| MessageRow::from_row(r).map(into_summary))
            .collect()
    }

    /// Delete the message row. Returns false if no such message existed.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let changed = self
            .records
            .run(Statement::new("DELETE FROM messages WHERE id = ?1").bind(id.to_string()))
            .await?;
        Ok(changed > 0)
    }
}

fn into_summary(row: MessageRow) -> MessageSummary {
    MessageSummary {
        id: row.id,
        subject: row.subject,
        content: row.content,
        sent_at: row.sent_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_db::Database;

    fn repo() -> (MessageRepository, Database) {
        let db = Database::open_in_memory().unwrap();
        let ids = Arc::new(crate::ids::SequentialIds::new("msg"));
        (MessageRepository::new(Arc::new(db.clone()), ids), db)
    }

    #[tokio::test]
    async fn test_create_batch_has_no_side_effect() {
        let (repo, db) = repo();

        let batch = repo.create_batch("Hi", "Body");
        assert_eq!(batch.id, "msg-1");
        assert!(batch.object_key.is_none());
        assert!(repo.find_by_id("msg-1").await.unwrap().is_none());

        db.run(batch.statement).await.unwrap();
        let found = repo.find_by_id("msg-1").await.unwrap().unwrap();
        assert_eq!(found.subject, "Hi");
        assert_eq!(found.content, "Body");
        assert!(chrono::DateTime::parse_from_rfc3339(&found.sent_at).is_ok());
    }

    #[tokio::test]
    async fn test_delete_reports_missing() {
        let (repo, db) = repo();
        db.run(repo.create_batch("Hi", "Body").statement).await.unwrap();

        assert!(repo.delete("msg-1").await.unwrap());
        assert!(!repo.delete("msg-1").await.unwrap());
        assert!(repo.find_all().await.unwrap().is_empty());
    }
}
