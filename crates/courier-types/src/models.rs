use serde::{Deserialize, Serialize};

/// List entry for a stored message. Recipients and attachments are never
/// resolved for the list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSummary {
    pub id: String,
    pub subject: String,
    pub content: String,
    pub sent_at: String,
}

/// A message together with everything it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: String,
    pub subject: String,
    pub content: String,
    pub sent_at: String,
    pub attachments: Vec<AttachmentView>,
    pub recipients: Vec<RecipientView>,
}

impl MessageView {
    pub fn new(
        summary: MessageSummary,
        attachments: Vec<AttachmentView>,
        recipients: Vec<RecipientView>,
    ) -> Self {
        Self {
            id: summary.id,
            subject: summary.subject,
            content: summary.content,
            sent_at: summary.sent_at,
            attachments,
            recipients,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientView {
    pub id: String,
    pub email: String,
}

/// Attachment metadata as exposed to clients. The payload itself is fetched
/// separately through `download_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentView {
    pub id: String,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
    pub download_url: String,
}

impl AttachmentView {
    pub fn download_url(attachment_id: &str) -> String {
        format!("/api/attachments/{}/download", attachment_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_serializes_without_children() {
        let summary = MessageSummary {
            id: "m1".into(),
            subject: "Hi".into(),
            content: "Body".into(),
            sent_at: "2026-01-01T00:00:00Z".into(),
        };

        let json = serde_json::to_value(&summary).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        assert!(obj.contains_key("sentAt"));
        assert!(!obj.contains_key("recipients"));
        assert!(!obj.contains_key("attachments"));
    }

    #[test]
    fn test_attachment_view_uses_camel_case() {
        let view = AttachmentView {
            id: "a1".into(),
            filename: "notes.txt".into(),
            content_type: "text/plain".into(),
            size: 10,
            download_url: AttachmentView::download_url("a1"),
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["contentType"], "text/plain");
        assert_eq!(json["downloadUrl"], "/api/attachments/a1/download");
    }
}
