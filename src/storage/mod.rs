/*!
 * Content-addressed blob storage for translated segments.
 *
 * The pipeline only ever needs two operations from a store: read the bytes
 * under a key, and write bytes under a key with a content type. Backends:
 * - `memory`: process-local map, used by tests and dry runs
 * - `filesystem`: one file per key under a root directory
 * - `sqlite`: single-file database, built on the same connection pattern
 *   the rest of the crate uses for persistence
 * - `http`: remote bucket addressed by `GET`/`PUT {base_url}/{key}`
 */

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{CacheBackend, CacheConfig};
use crate::errors::StoreError;

pub mod filesystem;
pub mod http;
pub mod memory;
pub mod sqlite;

pub use filesystem::FsBlobStore;
pub use http::HttpBlobStore;
pub use memory::MemoryBlobStore;
pub use sqlite::SqliteBlobStore;

/// Content type recorded for every translated segment
pub const MARKDOWN_CONTENT_TYPE: &str = "text/markdown";

/// Common trait for all blob store backends
///
/// A missing key is `Ok(None)`, never an error. Errors are reserved for a
/// store that could not answer.
#[async_trait]
pub trait BlobStore: Send + Sync + Debug {
    /// Read the bytes stored under `key`
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError>;

    /// Store `body` under `key`, replacing any previous value
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StoreError>;

    /// Short backend name for log lines
    fn name(&self) -> &str;
}

/// Build the blob store selected by the cache configuration
pub fn from_config(config: &CacheConfig) -> Result<Arc<dyn BlobStore>, StoreError> {
    let store: Arc<dyn BlobStore> = match config.backend {
        CacheBackend::Memory => Arc::new(MemoryBlobStore::new()),
        CacheBackend::Filesystem => Arc::new(FsBlobStore::new(config.resolved_path()?)),
        CacheBackend::Sqlite => Arc::new(SqliteBlobStore::open(config.resolved_path()?)?),
        CacheBackend::Http => {
            let token = (!config.token.is_empty()).then(|| config.token.clone());
            Arc::new(HttpBlobStore::new(&config.endpoint, token, config.timeout_secs)?)
        }
    };

    Ok(store)
}
