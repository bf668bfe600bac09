use std::sync::Arc;

use anyhow::Result;
use courier_db::models::RecipientRow;
use courier_db::{RecordStore, Statement};
use courier_types::models::RecipientView;

use crate::batch::BatchResponse;
use crate::ids::IdGenerator;

pub struct RecipientRepository {
    records: Arc<dyn RecordStore>,
    ids: Arc<dyn IdGenerator>,
}

impl RecipientRepository {
    pub fn new(records: Arc<dyn RecordStore>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { records, ids }
    }

    pub fn create_batch(&self, message_id: &str, email: &str) -> BatchResponse {
        let id = self.ids.next_id();

        let statement =
            Statement::new("INSERT INTO recipients (id, message_id, email) VALUES (?1, ?2, ?3)")
                .bind(id.clone())
                .bind(message_id.to_string())
                .bind(email.to_string());

        BatchResponse::new(id, statement)
    }

    /// Recipients of a message, in no particular order. Empty when none exist.
    pub async fn find_all_by_message_id(&self, message_id: &str) -> Result<Vec<RecipientView>> {
        let rows = self
            .records
            .all(
                Statement::new("SELECT id, message_id, email FROM recipients WHERE message_id = ?1")
                    .bind(message_id.to_string()),
            )
            .await?;

        rows.iter()
            .map(|r| {
                let row = RecipientRow::from_row(r)?;
                Ok(RecipientView {
                    id: row.id,
                    email: row.email,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_db::Database;

    #[tokio::test]
    async fn test_find_all_by_message_id() {
        let db = Database::open_in_memory().unwrap();
        let repo = RecipientRepository::new(
            Arc::new(db.clone()),
            Arc::new(crate::ids::SequentialIds::new("rcp")),
        );

        assert!(repo.find_all_by_message_id("m1").await.unwrap().is_empty());

        db.batch(vec![
            repo.create_batch("m1", "a@x.com").statement,
            repo.create_batch("m1", "b@x.com").statement,
            repo.create_batch("m2", "c@x.com").statement,
        ])
        .await
        .unwrap();

        let mut emails: Vec<String> = repo
            .find_all_by_message_id("m1")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.email)
            .collect();
        emails.sort();
        assert_eq!(emails, vec!["a@x.com", "b@x.com"]);
    }
}
