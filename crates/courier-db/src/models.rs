//! Database row types. These map directly to SQLite rows and are kept apart
//! from the courier-types view models so the DB layer stays independent.

use anyhow::Result;

use crate::statement::Row;

pub struct MessageRow {
    pub id: String,
    pub subject: String,
    pub content: String,
    pub sent_at: String,
}

impl MessageRow {
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            subject: row.get("subject")?,
            content: row.get("content")?,
            sent_at: row.get("sent_at")?,
        })
    }
}

pub struct RecipientRow {
    pub id: String,
    pub message_id: String,
    pub email: String,
}

impl RecipientRow {
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            message_id: row.get("message_id")?,
            email: row.get("email")?,
        })
    }
}

pub struct AttachmentRow {
    pub id: String,
    pub message_id: String,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
    pub object_key: String,
    /// Epoch milliseconds.
    pub created_at: i64,
}

impl AttachmentRow {
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            message_id: row.get("message_id")?,
            filename: row.get("filename")?,
            content_type: row.get("content_type")?,
            size: row.get::<i64>("size")? as u64,
            object_key: row.get("object_key")?,
            created_at: row.get("created_at")?,
        })
    }
}
