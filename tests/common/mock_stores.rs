/*!
 * Mock blob stores for testing
 *
 * - `RecordingBlobStore` wraps a `MemoryBlobStore` and counts every call
 * - `FailingBlobStore` fails reads, writes or both
 */

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use doclingo::errors::StoreError;
use doclingo::storage::{BlobStore, MemoryBlobStore};

/// Memory store that counts reads and writes
///
/// Clones share the counters and the underlying map.
#[derive(Debug, Clone, Default)]
pub struct RecordingBlobStore {
    inner: MemoryBlobStore,
    gets: Arc<AtomicUsize>,
    puts: Arc<AtomicUsize>,
}

impl RecordingBlobStore {
    /// Create an empty recording store
    pub fn new() -> Self {
        Self::default()
    }

    /// Underlying map, for assertions
    pub fn memory(&self) -> &MemoryBlobStore {
        &self.inner
    }

    /// Number of `get` calls
    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Number of `put` calls
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for RecordingBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(key, body, content_type).await
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Store whose reads and/or writes always fail
#[derive(Debug, Clone)]
pub struct FailingBlobStore {
    inner: MemoryBlobStore,
    fail_reads: bool,
    fail_writes: bool,
}

impl FailingBlobStore {
    /// Both operations fail
    pub fn unreachable() -> Self {
        Self::new(true, true)
    }

    /// Reads fail, writes succeed
    pub fn failing_reads() -> Self {
        Self::new(true, false)
    }

    /// Writes fail, reads succeed
    pub fn failing_writes() -> Self {
        Self::new(false, true)
    }

    fn new(fail_reads: bool, fail_writes: bool) -> Self {
        Self {
            inner: MemoryBlobStore::new(),
            fail_reads,
            fail_writes,
        }
    }

    /// Underlying map, for assertions
    pub fn memory(&self) -> &MemoryBlobStore {
        &self.inner
    }
}

#[async_trait]
impl BlobStore for FailingBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Unreachable(format!("simulated read failure for {}", key)));
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::PermissionDenied {
                key: key.to_string(),
                message: "simulated write failure".to_string(),
            });
        }
        self.inner.put(key, body, content_type).await
    }

    fn name(&self) -> &str {
        "failing"
    }
}
