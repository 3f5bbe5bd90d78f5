/*!
 * Tests for the blob store backends
 */

use bytes::Bytes;

use doclingo::app_config::{CacheBackend, CacheConfig};
use doclingo::errors::StoreError;
use doclingo::storage::{self, BlobStore, FsBlobStore, HttpBlobStore, MARKDOWN_CONTENT_TYPE, SqliteBlobStore};

use crate::common::create_temp_dir;

const KEY: &str = "translations/menu/fr/1688ddc51f243a91.md";

/// Test a filesystem round trip through nested directories
#[tokio::test]
async fn test_fsBlobStore_putThenGet_shouldCreateNestedFile() {
    let temp_dir = create_temp_dir().unwrap();
    let store = FsBlobStore::new(temp_dir.path().join("cache"));

    assert!(store.get(KEY).await.unwrap().is_none());
    store
        .put(KEY, Bytes::from_static("Bonjour".as_bytes()), MARKDOWN_CONTENT_TYPE)
        .await
        .unwrap();

    let path = temp_dir.path().join("cache").join(KEY);
    assert!(path.is_file());
    assert_eq!(std::fs::read_to_string(path).unwrap(), "Bonjour");
    assert_eq!(store.get(KEY).await.unwrap(), Some(Bytes::from_static(b"Bonjour")));
}

/// Test that rewriting a key replaces the file and leaves no staging file
#[tokio::test]
async fn test_fsBlobStore_put_twice_shouldReplaceContent() {
    let temp_dir = create_temp_dir().unwrap();
    let store = FsBlobStore::new(temp_dir.path());

    store.put(KEY, Bytes::from("Salut"), MARKDOWN_CONTENT_TYPE).await.unwrap();
    store.put(KEY, Bytes::from("Bonjour"), MARKDOWN_CONTENT_TYPE).await.unwrap();

    assert_eq!(store.get(KEY).await.unwrap(), Some(Bytes::from("Bonjour")));
    let entries: Vec<_> = std::fs::read_dir(temp_dir.path().join("translations/menu/fr"))
        .unwrap()
        .collect();
    assert_eq!(entries.len(), 1);
}

/// Test that concurrent writers of the same key all succeed
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fsBlobStore_withConcurrentWriters_shouldAllSucceed() {
    let temp_dir = create_temp_dir().unwrap();
    let mut handles = Vec::new();

    for writer in 0..16 {
        // Separate stores over one root, as separate runs would open them
        let store = FsBlobStore::new(temp_dir.path());
        handles.push(tokio::spawn(async move {
            store.put(KEY, Bytes::from("Bonjour"), MARKDOWN_CONTENT_TYPE).await.map(|_| writer)
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    let entries: Vec<_> = std::fs::read_dir(temp_dir.path().join("translations/menu/fr"))
        .unwrap()
        .collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(
        std::fs::read_to_string(temp_dir.path().join(KEY)).unwrap(),
        "Bonjour"
    );
}

/// Test that keys escaping the root are refused
#[tokio::test]
async fn test_fsBlobStore_withTraversalKey_shouldFail() {
    let temp_dir = create_temp_dir().unwrap();
    let store = FsBlobStore::new(temp_dir.path());

    let result = store.put("../outside.md", Bytes::from("x"), MARKDOWN_CONTENT_TYPE).await;
    assert!(matches!(result, Err(StoreError::InvalidKey(_))));
    assert!(matches!(store.get("../outside.md").await, Err(StoreError::InvalidKey(_))));
}

/// Test a SQLite round trip and upsert
#[tokio::test]
async fn test_sqliteBlobStore_putThenGet_shouldUpsert() {
    let store = SqliteBlobStore::open_in_memory().unwrap();

    assert!(store.get(KEY).await.unwrap().is_none());
    store.put(KEY, Bytes::from("Salut"), MARKDOWN_CONTENT_TYPE).await.unwrap();
    store.put(KEY, Bytes::from("Bonjour"), MARKDOWN_CONTENT_TYPE).await.unwrap();

    assert_eq!(store.get(KEY).await.unwrap(), Some(Bytes::from("Bonjour")));
    assert_eq!(store.count().await.unwrap(), 1);
}

/// Test that a database file keeps entries across reopen
#[tokio::test]
async fn test_sqliteBlobStore_reopen_shouldKeepEntries() {
    let temp_dir = create_temp_dir().unwrap();
    let db_path = temp_dir.path().join("nested").join("cache.db");

    {
        let store = SqliteBlobStore::open(&db_path).unwrap();
        store.put(KEY, Bytes::from("Bonjour"), MARKDOWN_CONTENT_TYPE).await.unwrap();
        assert_eq!(store.path(), db_path.as_path());
    }

    let reopened = SqliteBlobStore::open(&db_path).unwrap();
    assert_eq!(reopened.get(KEY).await.unwrap(), Some(Bytes::from("Bonjour")));
}

/// Test object URL construction for the HTTP backend
#[test]
fn test_httpBlobStore_objectUrl_shouldJoinKeyUnderBase() {
    let store = HttpBlobStore::new("https://bucket.example.com/cache", None, 10).unwrap();

    assert_eq!(
        store.object_url(KEY).unwrap().as_str(),
        "https://bucket.example.com/cache/translations/menu/fr/1688ddc51f243a91.md"
    );
    assert!(matches!(store.object_url("../x.md"), Err(StoreError::InvalidKey(_))));
    assert!(matches!(store.object_url(""), Err(StoreError::InvalidKey(_))));
}

/// Test that an unparseable endpoint is rejected up front
#[test]
fn test_httpBlobStore_withInvalidEndpoint_shouldFail() {
    assert!(HttpBlobStore::new("not a url", None, 10).is_err());
}

/// Test that the configured backend is selected
#[test]
fn test_fromConfig_shouldBuildSelectedBackend() {
    let temp_dir = create_temp_dir().unwrap();

    let memory = CacheConfig {
        backend: CacheBackend::Memory,
        ..Default::default()
    };
    assert_eq!(storage::from_config(&memory).unwrap().name(), "memory");

    let filesystem = CacheConfig {
        backend: CacheBackend::Filesystem,
        path: temp_dir.path().to_string_lossy().to_string(),
        ..Default::default()
    };
    assert_eq!(storage::from_config(&filesystem).unwrap().name(), "filesystem");

    let sqlite = CacheConfig {
        backend: CacheBackend::Sqlite,
        path: temp_dir.path().join("cache.db").to_string_lossy().to_string(),
        ..Default::default()
    };
    assert_eq!(storage::from_config(&sqlite).unwrap().name(), "sqlite");

    let http = CacheConfig {
        backend: CacheBackend::Http,
        endpoint: "http://localhost:9000/bucket".to_string(),
        token: "secret".to_string(),
        ..Default::default()
    };
    assert_eq!(storage::from_config(&http).unwrap().name(), "http");
}
