/*!
 * Tests for the translation cache adapter
 */

use std::sync::Arc;

use doclingo::errors::StoreError;
use doclingo::storage::{MARKDOWN_CONTENT_TYPE, MemoryBlobStore};
use doclingo::translation::cache::{CacheKey, DEFAULT_CACHE_PREFIX};
use doclingo::translation::TranslationCache;
use doclingo::translation::fingerprint::fingerprint;

use crate::common::mock_stores::FailingBlobStore;

/// Test the key layout with and without a prefix
#[test]
fn test_cacheKey_display_shouldJoinComponents() {
    let fp = fingerprint("", "Hello");

    assert_eq!(
        CacheKey::new(DEFAULT_CACHE_PREFIX, "menu", "fr", &fp).to_string(),
        "translations/menu/fr/1688ddc51f243a91.md"
    );
    assert_eq!(CacheKey::new("", "menu", "fr", &fp).to_string(), "menu/fr/1688ddc51f243a91.md");
    assert_eq!(CacheKey::new("/site/", "menu", "fr", &fp).to_string(), "site/menu/fr/1688ddc51f243a91.md");
}

/// Test a write followed by a read of the same segment
#[tokio::test]
async fn test_cache_putThenGet_shouldReturnStoredText() {
    let store = MemoryBlobStore::new();
    let cache = TranslationCache::new(Arc::new(store.clone()));
    let fp = fingerprint("Keep brand name unchanged", "Welcome to our restaurant.");

    assert_eq!(cache.get("restaurant", "fr", &fp).await.unwrap(), None);
    cache
        .put("restaurant", "fr", &fp, "Bienvenue dans notre restaurant.")
        .await
        .unwrap();

    assert_eq!(
        cache.get("restaurant", "fr", &fp).await.unwrap().as_deref(),
        Some("Bienvenue dans notre restaurant.")
    );

    let key = "translations/restaurant/fr/187696e3bad15f0e.md";
    assert_eq!(store.keys(), vec![key.to_string()]);
    assert_eq!(store.content_type(key).as_deref(), Some(MARKDOWN_CONTENT_TYPE));

    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses, stats.writes), (1, 1, 1));
    assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
}

/// Test that entries are isolated per document and per language
#[tokio::test]
async fn test_cache_withOtherDocumentOrLanguage_shouldMiss() {
    let cache = TranslationCache::new(Arc::new(MemoryBlobStore::new()));
    let fp = fingerprint("", "Hello");

    cache.put("menu", "fr", &fp, "Bonjour").await.unwrap();

    assert!(cache.get("menu", "de", &fp).await.unwrap().is_none());
    assert!(cache.get("about", "fr", &fp).await.unwrap().is_none());
    assert!(cache.get("menu", "fr", &fingerprint("x", "Hello")).await.unwrap().is_none());
}

/// Test that a second write replaces the first
#[tokio::test]
async fn test_cache_put_twice_shouldOverwrite() {
    let cache = TranslationCache::new(Arc::new(MemoryBlobStore::new()));
    let fp = fingerprint("", "Hello");

    cache.put("menu", "fr", &fp, "Salut").await.unwrap();
    cache.put("menu", "fr", &fp, "Bonjour").await.unwrap();

    assert_eq!(cache.get("menu", "fr", &fp).await.unwrap().as_deref(), Some("Bonjour"));
}

/// Test that non UTF-8 bytes surface as a corrupt entry
#[tokio::test]
async fn test_cache_get_withInvalidUtf8_shouldReturnCorrupt() {
    let store = MemoryBlobStore::new();
    let cache = TranslationCache::new(Arc::new(store.clone()));
    let fp = fingerprint("", "Hello");
    let key = cache.key("menu", "fr", &fp).to_string();

    store.insert(&key, vec![0xffu8, 0xfe, 0x00], MARKDOWN_CONTENT_TYPE);

    let result = cache.get("menu", "fr", &fp).await;
    assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    assert_eq!(cache.stats().read_errors, 1);
}

/// Test that store failures are returned and counted
#[tokio::test]
async fn test_cache_withUnreachableStore_shouldReturnErrors() {
    let cache = TranslationCache::new(Arc::new(FailingBlobStore::unreachable()));
    let fp = fingerprint("", "Hello");

    assert!(matches!(cache.get("menu", "fr", &fp).await, Err(StoreError::Unreachable(_))));
    assert!(matches!(
        cache.put("menu", "fr", &fp, "Bonjour").await,
        Err(StoreError::PermissionDenied { .. })
    ));

    let stats = cache.stats();
    assert_eq!((stats.read_errors, stats.write_errors), (1, 1));
    assert_eq!(stats.hit_rate(), 0.0);
}

/// Test that clones share counters
#[tokio::test]
async fn test_cache_clone_shouldShareStats() {
    let cache = TranslationCache::with_prefix(Arc::new(MemoryBlobStore::new()), "docs");
    let clone = cache.clone();
    let fp = fingerprint("", "Hello");

    clone.put("menu", "fr", &fp, "Bonjour").await.unwrap();

    assert_eq!(cache.stats().writes, 1);
    assert_eq!(cache.prefix(), "docs");
    assert_eq!(cache.store_name(), "memory");
}
