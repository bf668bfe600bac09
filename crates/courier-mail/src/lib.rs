//! Mail core: entity repositories, the send coordinator and the read façade.
//!
//! A send writes attachment payloads to the object store immediately and
//! defers every relational insert into a single atomic batch. If anything
//! fails after the first payload is written, the payloads are deleted again
//! before the error is surfaced.

pub mod batch;
pub mod error;
pub mod ids;
pub mod mail;
pub mod repositories;
pub mod service;

pub use batch::{BatchResponse, Rollback};
pub use error::MailError;
pub use ids::{IdGenerator, SequentialIds, UuidIds};
pub use mail::{
    AttachmentDownload, AttachmentUpload, MAX_ATTACHMENT_SIZE, MAX_RECIPIENTS, MAX_SUBJECT_CHARS,
    OutgoingMail, dedupe_recipients,
};
pub use service::{MailService, StagedSend, check_limits};
