/*!
 * Filesystem blob store.
 *
 * Keys map to relative paths under a root directory, so the cache for one
 * document and language is just a directory of `<fingerprint>.md` files that
 * can be inspected or committed alongside the content.
 */

use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use super::BlobStore;
use crate::errors::StoreError;

/// Distinguishes staging files of concurrent writers in this process
static STAGING_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Blob store rooted at a local directory
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Create a store rooted at `root`; the directory is created lazily on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key to a path under the root, refusing anything that would escape it
    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(key);
        let is_safe = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !is_safe {
            return Err(StoreError::InvalidKey(key.to_string()));
        }

        Ok(self.root.join(relative))
    }

    /// Unique temporary sibling of `path`, per process and per write
    fn staging_path(path: &Path) -> PathBuf {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let sequence = STAGING_COUNTER.fetch_add(1, Ordering::Relaxed);
        path.with_file_name(format!("{}.{}.{}.partial", file_name, std::process::id(), sequence))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        let path = self.path_for(key)?;

        match tokio::fs::read(&path).await {
            Ok(contents) => Ok(Some(Bytes::from(contents))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                Err(StoreError::PermissionDenied {
                    key: key.to_string(),
                    message: e.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write next to the target and rename so readers never see a partial file
        let staging = Self::staging_path(&path);
        tokio::fs::write(&staging, &body).await?;
        if let Err(e) = tokio::fs::rename(&staging, &path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }

        debug!("Stored {} bytes ({}) at {:?}", body.len(), content_type, path);
        Ok(())
    }

    fn name(&self) -> &str {
        "filesystem"
    }
}
