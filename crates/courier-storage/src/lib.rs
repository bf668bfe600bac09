//! Object store gateway for attachment payloads.
//!
//! Keys are opaque `/`-separated strings. Every call is independent and takes
//! effect immediately; there is no transaction primitive.

pub mod fs;
pub mod memory;

pub use fs::FsObjectStore;
pub use memory::MemoryObjectStore;

use std::collections::BTreeMap;

use anyhow::{Result, bail};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` under `key`, replacing any previous object.
    async fn put(&self, key: &str, body: Bytes, metadata: ObjectMetadata) -> Result<()>;

    /// Fetch an object, or `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<StoredObject>>;

    /// Remove an object. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub content_type: Option<String>,
    #[serde(default)]
    pub custom: BTreeMap<String, String>,
}

impl ObjectMetadata {
    pub fn with_content_type(content_type: impl Into<String>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            custom: BTreeMap::new(),
        }
    }

    pub fn insert(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Bytes,
    pub metadata: ObjectMetadata,
    pub size: u64,
    /// Hex SHA-256 of the body.
    pub etag: String,
}

impl StoredObject {
    pub fn new(body: Bytes, metadata: ObjectMetadata) -> Self {
        Self {
            size: body.len() as u64,
            etag: etag(&body),
            body,
            metadata,
        }
    }
}

pub fn etag(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Reject keys that could escape the store root or alias another key.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        bail!("Object key is empty");
    }
    if key.starts_with('/') || key.contains('\\') || key.contains('\0') {
        bail!("Invalid object key: {}", key);
    }
    if key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
        bail!("Invalid object key segment in: {}", key);
    }
    Ok(())
}
