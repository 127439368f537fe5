//! Integration tests for the persistent verdict cache.

use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use verdict_core::core::cache::{CacheConfig, ContentCache, ContentKey, SqliteStore};
use verdict_core::core::provider::AnalysisResult;

fn open(temp_dir: &TempDir) -> ContentCache {
    let store = SqliteStore::open(&temp_dir.path().join("cache.db")).unwrap();
    ContentCache::new(Arc::new(store))
}

#[test]
fn verdicts_survive_reopening() {
    let temp_dir = TempDir::new().unwrap();
    let key = ContentKey::from_bytes(b"uploaded bytes");

    {
        let cache = open(&temp_dir);
        cache
            .put(&key, AnalysisResult::new(0.91, true, "detector-v2"))
            .unwrap();
    }

    let cache = open(&temp_dir);
    let entry = cache.get(&key).unwrap().unwrap();

    assert_eq!(entry.result.model_label, "detector-v2");
    assert!(entry.result.is_positive);
    assert_eq!(entry.access_count, 1);
}

#[test]
fn access_count_persists() {
    let temp_dir = TempDir::new().unwrap();
    let key = ContentKey::from_bytes(b"popular");

    {
        let cache = open(&temp_dir);
        cache.put(&key, AnalysisResult::new(0.3, false, "m")).unwrap();
        cache.get(&key).unwrap();
        cache.get(&key).unwrap();
    }

    let cache = open(&temp_dir);
    assert_eq!(cache.get(&key).unwrap().unwrap().access_count, 3);
    assert_eq!(cache.stats().unwrap().total_access_count, 3);
}

#[test]
fn zero_max_age_expires_everything() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(SqliteStore::open(&temp_dir.path().join("cache.db")).unwrap());
    let key = ContentKey::from_bytes(b"short-lived");

    ContentCache::new(store.clone())
        .put(&key, AnalysisResult::new(0.5, false, "m"))
        .unwrap();

    std::thread::sleep(Duration::from_millis(5));
    let strict = ContentCache::with_config(
        store,
        CacheConfig {
            max_age: Duration::ZERO,
            sweep_interval: None,
            ..CacheConfig::default()
        },
    );

    assert!(strict.get(&key).unwrap().is_none());
    assert_eq!(strict.stats().unwrap().total_entries, 0);
}

#[test]
fn clear_and_invalidate() {
    let temp_dir = TempDir::new().unwrap();
    let cache = open(&temp_dir);
    let first = ContentKey::from_bytes(b"one");
    let second = ContentKey::from_bytes(b"two");

    cache.put(&first, AnalysisResult::new(0.1, false, "m")).unwrap();
    cache.put(&second, AnalysisResult::new(0.2, false, "m")).unwrap();

    cache.invalidate(&first).unwrap();
    assert!(cache.get(&first).unwrap().is_none());
    assert!(cache.get(&second).unwrap().is_some());

    assert_eq!(cache.clear().unwrap(), 1);
    assert_eq!(cache.stats().unwrap().total_entries, 0);
}
