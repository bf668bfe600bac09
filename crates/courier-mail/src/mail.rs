use std::collections::HashSet;

use bytes::Bytes;

/// Most distinct recipients a single message may have.
pub const MAX_RECIPIENTS: usize = 3;

/// 4 MiB per attachment.
pub const MAX_ATTACHMENT_SIZE: u64 = 4 * 1024 * 1024;

pub const MAX_SUBJECT_CHARS: usize = 200;

/// A composed message ready to be stored.
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub subject: String,
    pub content: String,
    pub recipients: Vec<String>,
    pub attachments: Vec<AttachmentUpload>,
}

#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    pub filename: String,
    pub content_type: String,
    pub body: Bytes,
}

impl AttachmentUpload {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>, body: Bytes) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            body,
        }
    }

    pub fn size(&self) -> u64 {
        self.body.len() as u64
    }
}

/// Attachment payload plus the metadata needed to serve it.
#[derive(Debug, Clone)]
pub struct AttachmentDownload {
    pub filename: String,
    pub content_type: String,
    pub size: u64,
    pub body: Bytes,
}

/// Drop repeated addresses (exact match), keeping first-occurrence order.
pub fn dedupe_recipients(recipients: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(recipients.len());
    recipients
        .iter()
        .filter(|addr| seen.insert(addr.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addrs(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let out = dedupe_recipients(&addrs(&["b@x.com", "a@x.com", "b@x.com", "a@x.com"]));
        assert_eq!(out, addrs(&["b@x.com", "a@x.com"]));
    }

    #[test]
    fn test_dedupe_is_exact_match() {
        let out = dedupe_recipients(&addrs(&["a@x.com", "A@x.com"]));
        assert_eq!(out.len(), 2);
    }
}
