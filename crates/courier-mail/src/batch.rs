use courier_db::Statement;
use tracing::warn;

use crate::repositories::AttachmentRepository;

/// Result of a repository create step: the identity it generated, the insert
/// that still has to be committed, and for attachments the object key that
/// has already been written.
#[derive(Debug, Clone)]
pub struct BatchResponse {
    pub id: String,
    pub statement: Statement,
    pub object_key: Option<String>,
}

impl BatchResponse {
    pub fn new(id: String, statement: Statement) -> Self {
        Self {
            id,
            statement,
            object_key: None,
        }
    }

    pub fn with_object_key(mut self, key: String) -> Self {
        self.object_key = Some(key);
        self
    }
}

/// Object keys written during one send, in write order. On failure each key
/// is deleted once, independently of the others.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Rollback {
    keys: Vec<String>,
}

impl Rollback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: String) {
        self.keys.push(key);
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Best-effort sweep. A failed delete is logged and skipped, never
    /// retried. Returns how many keys were removed.
    pub async fn compensate(self, attachments: &AttachmentRepository) -> usize {
        let mut removed = 0;
        for key in &self.keys {
            match attachments.delete(key).await {
                Ok(()) => removed += 1,
                Err(e) => warn!("Compensation: failed to delete object {}: {:#}", key, e),
            }
        }
        removed
    }
}
