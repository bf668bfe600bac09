use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::{ObjectMetadata, ObjectStore, StoredObject, etag, validate_key};

/// Object store backed by a local directory.
///
/// Each object is a flat file at `{root}/objects/{hash}` plus a JSON sidecar
/// at `{root}/meta/{hash}.json` holding its key, metadata, size and SHA-256
/// etag, where `hash` is the hex SHA-256 of the key. On-disk names therefore
/// have a fixed length whatever the key. The sidecar is written after the
/// payload, so an object without a sidecar is treated as absent.
pub struct FsObjectStore {
    root: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct Sidecar {
    key: String,
    metadata: ObjectMetadata,
    size: u64,
    etag: String,
}

impl FsObjectStore {
    pub async fn new(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(root.join("objects")).await?;
        fs::create_dir_all(root.join("meta")).await?;
        info!("Object storage directory: {}", root.display());
        Ok(Self { root })
    }

    /// Path to the payload file for a key.
    pub fn object_path(&self, key: &str) -> PathBuf {
        self.root.join("objects").join(etag(key.as_bytes()))
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.root
            .join("meta")
            .join(format!("{}.json", etag(key.as_bytes())))
    }

    /// List every key that has both a sidecar and a payload on disk.
    pub async fn list_keys(&self) -> Result<Vec<String>> {
        let mut entries = fs::read_dir(self.root.join("meta")).await?;
        let mut keys = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let raw = fs::read(entry.path()).await?;
            let sidecar: Sidecar = match serde_json::from_slice(&raw) {
                Ok(sidecar) => sidecar,
                Err(e) => {
                    warn!("Skipping unreadable sidecar {}: {}", entry.path().display(), e);
                    continue;
                }
            };
            if fs::try_exists(self.object_path(&sidecar.key)).await? {
                keys.push(sidecar.key);
            }
        }

        keys.sort();
        Ok(keys)
    }
}

async fn write_payload(path: &Path, body: &[u8]) -> Result<()> {
    let mut file = fs::File::create(path)
        .await
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(body).await?;
    file.flush().await?;
    Ok(())
}

async fn remove_if_present(path: &Path) -> std::io::Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &str, body: Bytes, metadata: ObjectMetadata) -> Result<()> {
        validate_key(key)?;

        let path = self.object_path(key);
        let meta_path = self.meta_path(key);

        if let Err(e) = write_payload(&path, &body).await {
            let _ = remove_if_present(&path).await;
            return Err(e);
        }

        let sidecar = Sidecar {
            key: key.to_string(),
            metadata,
            size: body.len() as u64,
            etag: etag(&body),
        };
        let written = match serde_json::to_vec(&sidecar) {
            Ok(raw) => fs::write(&meta_path, raw)
                .await
                .with_context(|| format!("Failed to write metadata for object {}", key)),
            Err(e) => Err(e.into()),
        };

        // A payload without its sidecar must not outlive a failed put.
        if let Err(e) = written {
            if let Err(cleanup) = remove_if_present(&path).await {
                warn!("Failed to remove payload for object {}: {}", key, cleanup);
            }
            return Err(e);
        }

        debug!("Stored object {} ({} bytes)", key, sidecar.size);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>> {
        validate_key(key)?;

        let raw = match fs::read(self.meta_path(key)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let sidecar: Sidecar = serde_json::from_slice(&raw)
            .with_context(|| format!("Corrupt metadata for object {}", key))?;
        if sidecar.key != key {
            bail!("Metadata for object {} belongs to {}", key, sidecar.key);
        }

        let body = match fs::read(self.object_path(key)).await {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Object {} has metadata but no payload", key);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let actual = etag(&body);
        if actual != sidecar.etag {
            bail!(
                "Object {} failed integrity check: expected {}, got {}",
                key,
                sidecar.etag,
                actual
            );
        }

        Ok(Some(StoredObject {
            body: Bytes::from(body),
            metadata: sidecar.metadata,
            size: sidecar.size,
            etag: sidecar.etag,
        }))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;

        if remove_if_present(&self.object_path(key)).await? {
            info!("Deleted object {}", key);
        } else {
            warn!("Object {} already gone", key);
        }
        remove_if_present(&self.meta_path(key)).await?;
        Ok(())
    }
}
