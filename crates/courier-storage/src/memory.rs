use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use bytes::Bytes;

use crate::{ObjectMetadata, ObjectStore, StoredObject, validate_key};

/// In-process object store. Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        let mut keys: Vec<String> = objects.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, body: Bytes, metadata: ObjectMetadata) -> Result<()> {
        validate_key(key)?;
        let mut objects = self
            .objects
            .lock()
            .map_err(|e| anyhow!("Object store lock poisoned: {}", e))?;
        objects.insert(key.to_string(), StoredObject::new(body, metadata));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>> {
        validate_key(key)?;
        let objects = self
            .objects
            .lock()
            .map_err(|e| anyhow!("Object store lock poisoned: {}", e))?;
        Ok(objects.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        let mut objects = self
            .objects
            .lock()
            .map_err(|e| anyhow!("Object store lock poisoned: {}", e))?;
        objects.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryObjectStore::new();
        store
            .put("k/1", Bytes::from_static(b"hello"), ObjectMetadata::with_content_type("text/plain"))
            .await
            .unwrap();

        let obj = store.get("k/1").await.unwrap().unwrap();
        assert_eq!(&obj.body[..], b"hello");
        assert_eq!(obj.size, 5);
        assert_eq!(obj.metadata.content_type.as_deref(), Some("text/plain"));

        store.delete("k/1").await.unwrap();
        store.delete("k/1").await.unwrap();
        assert!(store.is_empty());
    }
}
