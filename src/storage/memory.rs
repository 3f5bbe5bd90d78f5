/*!
 * In-memory blob store.
 */

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::BlobStore;
use crate::errors::StoreError;

#[derive(Debug, Clone)]
struct StoredBlob {
    body: Bytes,
    content_type: String,
}

/// Blob store backed by a shared map
///
/// Clones share the same map, so a test can keep a handle to inspect what
/// the pipeline wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, StoredBlob>>>,
}

impl MemoryBlobStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }

    /// All keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.blobs.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Content type recorded for `key`
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.blobs.read().get(key).map(|b| b.content_type.clone())
    }

    /// Stored body decoded as UTF-8, for assertions
    pub fn text(&self, key: &str) -> Option<String> {
        self.blobs
            .read()
            .get(key)
            .map(|b| String::from_utf8_lossy(&b.body).into_owned())
    }

    /// Write a value directly, bypassing the trait
    pub fn insert(&self, key: &str, body: impl Into<Bytes>, content_type: &str) {
        self.blobs.write().insert(
            key.to_string(),
            StoredBlob {
                body: body.into(),
                content_type: content_type.to_string(),
            },
        );
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        Ok(self.blobs.read().get(key).map(|b| b.body.clone()))
    }

    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StoreError> {
        self.insert(key, body, content_type);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
