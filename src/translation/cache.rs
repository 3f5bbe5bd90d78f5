/*!
 * Translation caching functionality.
 *
 * Translated segments are stored in a content-addressed blob store under
 * `{prefix}/{document_id}/{language}/{fingerprint}.md`. Store failures are
 * logged here with the offending key and returned to the caller, which
 * treats them as misses (reads) or ignores them (writes).
 */

use bytes::Bytes;
use log::{debug, warn};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

use crate::errors::StoreError;
use crate::storage::{BlobStore, MARKDOWN_CONTENT_TYPE};

use super::fingerprint::Fingerprint;

/// Default key prefix
pub const DEFAULT_CACHE_PREFIX: &str = "translations";

/// Location of one cached segment translation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Namespace inside the store; may be blank
    pub prefix: String,
    /// Document the segment belongs to
    pub document_id: String,
    /// Target language code
    pub language: String,
    /// Segment fingerprint
    pub fingerprint: Fingerprint,
}

impl CacheKey {
    /// Create a new cache key
    pub fn new(prefix: &str, document_id: &str, language: &str, fingerprint: &Fingerprint) -> Self {
        Self {
            prefix: prefix.trim_matches('/').to_string(),
            document_id: document_id.to_string(),
            language: language.to_string(),
            fingerprint: fingerprint.clone(),
        }
    }

    /// Reject components that would escape their directory in a path-like store
    pub fn validate(&self) -> Result<(), StoreError> {
        let safe = |part: &str| {
            !part.is_empty()
                && part != "."
                && part != ".."
                && !part.contains(['/', '\\'])
                && !part.chars().any(char::is_whitespace)
        };

        if safe(&self.document_id) && safe(&self.language) {
            Ok(())
        } else {
            Err(StoreError::InvalidKey(self.to_string()))
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.prefix.is_empty() {
            write!(f, "{}/", self.prefix)?;
        }
        write!(f, "{}/{}/{}.md", self.document_id, self.language, self.fingerprint)
    }
}

/// Running cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads that found an entry
    pub hits: usize,
    /// Reads that found nothing
    pub misses: usize,
    /// Reads that failed
    pub read_errors: usize,
    /// Successful writes
    pub writes: usize,
    /// Failed writes
    pub write_errors: usize,
}

impl CacheStats {
    /// Fraction of successful reads that were hits
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Cache store adapter over a blob store
#[derive(Debug, Clone)]
pub struct TranslationCache {
    /// Backing store
    store: Arc<dyn BlobStore>,
    /// Key prefix
    prefix: String,
    /// Counters shared between clones
    stats: Arc<RwLock<CacheStats>>,
}

impl TranslationCache {
    /// Create a cache over `store` using the default prefix
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self::with_prefix(store, DEFAULT_CACHE_PREFIX)
    }

    /// Create a cache with an explicit key prefix
    pub fn with_prefix(store: Arc<dyn BlobStore>, prefix: &str) -> Self {
        Self {
            store,
            prefix: prefix.trim_matches('/').to_string(),
            stats: Arc::new(RwLock::new(CacheStats::default())),
        }
    }

    /// Key prefix in use
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Name of the backing store
    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// Build the key for a segment
    pub fn key(&self, document_id: &str, language: &str, fingerprint: &Fingerprint) -> CacheKey {
        CacheKey::new(&self.prefix, document_id, language, fingerprint)
    }

    /// Look up a translation; `Ok(None)` is a miss
    pub async fn get(
        &self,
        document_id: &str,
        language: &str,
        fingerprint: &Fingerprint,
    ) -> Result<Option<String>, StoreError> {
        let cache_key = self.key(document_id, language, fingerprint);
        let key = cache_key.to_string();

        let lookup = match cache_key.validate() {
            Ok(()) => self.store.get(&key).await,
            Err(e) => Err(e),
        };
        let result = match lookup {
            Ok(Some(body)) => String::from_utf8(body.to_vec())
                .map(Some)
                .map_err(|e| StoreError::Corrupt {
                    key: key.clone(),
                    message: e.utf8_error().to_string(),
                }),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };

        let mut stats = self.stats.write();
        match &result {
            Ok(Some(_)) => {
                stats.hits += 1;
                debug!("Cache hit for {}", key);
            }
            Ok(None) => {
                stats.misses += 1;
                debug!("Cache miss for {}", key);
            }
            Err(e) => {
                stats.read_errors += 1;
                warn!("Cache read failed for {}: {}", key, e);
            }
        }

        result
    }

    /// Store a translation
    pub async fn put(
        &self,
        document_id: &str,
        language: &str,
        fingerprint: &Fingerprint,
        translated: &str,
    ) -> Result<(), StoreError> {
        let cache_key = self.key(document_id, language, fingerprint);
        let key = cache_key.to_string();
        let body = Bytes::copy_from_slice(translated.as_bytes());

        let result = match cache_key.validate() {
            Ok(()) => self.store.put(&key, body, MARKDOWN_CONTENT_TYPE).await,
            Err(e) => Err(e),
        };

        let mut stats = self.stats.write();
        match &result {
            Ok(()) => {
                stats.writes += 1;
                debug!("Cached translation at {}", key);
            }
            Err(e) => {
                stats.write_errors += 1;
                warn!("Cache write failed for {}: {}", key, e);
            }
        }

        result
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> CacheStats {
        *self.stats.read()
    }
}
