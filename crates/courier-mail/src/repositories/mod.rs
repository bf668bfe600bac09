//! Entity repositories. Each `create_batch` generates a fresh identity and
//! returns a prepared insert; only the attachment repository has a side
//! effect (the payload write) before returning.

pub mod attachment;
pub mod message;
pub mod recipient;

pub use attachment::{AttachmentRepository, object_key};
pub use message::MessageRepository;
pub use recipient::RecipientRepository;
