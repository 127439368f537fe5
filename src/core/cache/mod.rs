//! # Cache Module
//!
//! Content-addressed storage of previous analysis verdicts.
//!
//! ## Behaviour
//! - Keys are content digests, so renamed copies of an image hit the cache
//! - Entries older than `max_age` (default 7 days) are treated as absent and
//!   deleted on the lookup that finds them
//! - Every hit bumps `access_count` and `last_accessed`
//! - Unreadable entries are dropped and reported as misses
//!
//! ## Stores
//! - `SqliteStore` - Persistent storage using SQLite
//! - `InMemoryStore` - For testing

mod content_hash;
mod memory;
mod sqlite;
mod traits;

pub use content_hash::{ContentKey, KeyKind};
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use traits::KeyValueStore;

use crate::core::provider::AnalysisResult;
use crate::error::CacheError;
use crate::events::{CacheEvent, Event, EventSender};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, warn};

/// Default maximum entry age
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Default minimum gap between write-triggered sweeps
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// A cached verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The content key this entry belongs to
    pub key: String,
    /// How the key was derived
    pub key_kind: KeyKind,
    /// The cached verdict
    pub result: AnalysisResult,
    /// When the entry was written
    pub cached_at: DateTime<Utc>,
    /// Number of hits since the entry was written
    pub access_count: u64,
    /// Time of the most recent hit (or of the write)
    pub last_accessed: DateTime<Utc>,
}

impl CacheEntry {
    fn fresh(key: &ContentKey, result: AnalysisResult, now: DateTime<Utc>) -> Self {
        Self {
            key: key.as_str().to_string(),
            key_kind: key.kind(),
            result,
            cached_at: now,
            access_count: 0,
            last_accessed: now,
        }
    }

    /// Age relative to `now`
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.cached_at)
    }
}

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Entries older than this are treated as absent
    pub max_age: Duration,
    /// Minimum gap between sweeps triggered by `put`; `None` disables them
    pub sweep_interval: Option<Duration>,
    /// Prefix for every key written to the store
    pub namespace: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age: DEFAULT_MAX_AGE,
            sweep_interval: Some(DEFAULT_SWEEP_INTERVAL),
            namespace: "analysis-cache:".to_string(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Live entries in the store (expired ones not yet swept included)
    pub total_entries: usize,
    /// Sum of access counters over all entries
    pub total_access_count: u64,
    /// Lookups served from the cache by this instance
    pub hits: u64,
    /// Lookups that found nothing usable
    pub misses: u64,
    /// Entries removed for exceeding `max_age`
    pub expired_evictions: u64,
    /// Entries removed because they could not be read back
    pub corrupt_evictions: u64,
    /// Oldest `cached_at`
    pub oldest_entry: Option<DateTime<Utc>>,
    /// Newest `cached_at`
    pub newest_entry: Option<DateTime<Utc>>,
}

impl CacheStats {
    /// Fraction of lookups that hit, if any lookups happened
    pub fn hit_rate(&self) -> Option<f64> {
        let lookups = self.hits + self.misses;
        (lookups > 0).then(|| self.hits as f64 / lookups as f64)
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
    corrupt: AtomicU64,
}

/// Content-addressed verdict cache over a [`KeyValueStore`].
///
/// Lookups read, bump the access counter and write back under one lock,
/// so concurrent hits on the same key do not lose updates within a process.
pub struct ContentCache {
    store: Arc<dyn KeyValueStore>,
    config: CacheConfig,
    update_lock: Mutex<()>,
    last_sweep: Mutex<DateTime<Utc>>,
    counters: Counters,
    events: EventSender,
}

impl ContentCache {
    /// Cache with default configuration
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_config(store, CacheConfig::default())
    }

    pub fn with_config(store: Arc<dyn KeyValueStore>, config: CacheConfig) -> Self {
        Self {
            store,
            config,
            update_lock: Mutex::new(()),
            last_sweep: Mutex::new(Utc::now()),
            counters: Counters::default(),
            events: EventSender::default(),
        }
    }

    /// Volatile cache backed by an [`InMemoryStore`]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }

    /// Report hits, misses and evictions on an event channel
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Look up a verdict.
    ///
    /// Returns `Ok(None)` for missing, expired or unreadable entries. Only a
    /// failing store produces `Err`.
    pub fn get(&self, key: &ContentKey) -> Result<Option<CacheEntry>, CacheError> {
        let storage_key = self.storage_key(key);
        let _guard = self.lock_updates();

        let Some(raw) = self.store.get(&storage_key)? else {
            self.record_miss(key);
            return Ok(None);
        };

        let mut entry = match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = %key, error = %e, "dropping unreadable cache entry");
                self.store.delete(&storage_key)?;
                self.counters.corrupt.fetch_add(1, Ordering::Relaxed);
                self.events.send(Event::Cache(CacheEvent::Corrupt {
                    key: key.to_string(),
                }));
                self.record_miss(key);
                return Ok(None);
            }
        };

        let now = Utc::now();
        if self.is_expired(&entry, now) {
            debug!(key = %key, cached_at = %entry.cached_at, "cache entry expired");
            self.store.delete(&storage_key)?;
            self.counters.expired.fetch_add(1, Ordering::Relaxed);
            self.events.send(Event::Cache(CacheEvent::Expired {
                key: key.to_string(),
            }));
            self.record_miss(key);
            return Ok(None);
        }

        entry.access_count += 1;
        entry.last_accessed = now;
        self.store.set(&storage_key, &Self::serialize(&entry)?)?;

        self.counters.hits.fetch_add(1, Ordering::Relaxed);
        self.events.send(Event::Cache(CacheEvent::Hit {
            key: key.to_string(),
            access_count: entry.access_count,
        }));

        Ok(Some(entry))
    }

    /// Store a verdict, replacing any entry for the same key.
    pub fn put(&self, key: &ContentKey, result: AnalysisResult) -> Result<(), CacheError> {
        if !key.is_content_addressed() {
            debug!(key = %key, "caching under a metadata-derived key");
        }

        let entry = CacheEntry::fresh(key, result, Utc::now());
        {
            let _guard = self.lock_updates();
            self.store.set(&self.storage_key(key), &Self::serialize(&entry)?)?;
        }

        self.maybe_sweep();
        Ok(())
    }

    /// Drop the entry for `key`, if any
    pub fn invalidate(&self, key: &ContentKey) -> Result<(), CacheError> {
        let _guard = self.lock_updates();
        self.store.delete(&self.storage_key(key))
    }

    /// Remove every expired or unreadable entry. Returns how many were removed.
    pub fn sweep_expired(&self) -> Result<usize, CacheError> {
        let _guard = self.lock_updates();
        let now = Utc::now();
        let mut removed = 0;

        for storage_key in self.store.keys(&self.config.namespace)? {
            let Some(raw) = self.store.get(&storage_key)? else {
                continue;
            };

            match serde_json::from_str::<CacheEntry>(&raw) {
                Ok(entry) if !self.is_expired(&entry, now) => {}
                Ok(_) => {
                    self.store.delete(&storage_key)?;
                    self.counters.expired.fetch_add(1, Ordering::Relaxed);
                    removed += 1;
                }
                Err(_) => {
                    self.store.delete(&storage_key)?;
                    self.counters.corrupt.fetch_add(1, Ordering::Relaxed);
                    removed += 1;
                }
            }
        }

        if let Ok(mut last) = self.last_sweep.lock() {
            *last = now;
        }

        if removed > 0 {
            debug!(removed, "swept cache");
        }
        self.events.send(Event::Cache(CacheEvent::Swept { removed }));
        Ok(removed)
    }

    /// Remove every entry in this cache's namespace
    pub fn clear(&self) -> Result<usize, CacheError> {
        let _guard = self.lock_updates();
        let keys = self.store.keys(&self.config.namespace)?;
        for key in &keys {
            self.store.delete(key)?;
        }
        Ok(keys.len())
    }

    /// Scan the store and combine with this instance's counters
    pub fn stats(&self) -> Result<CacheStats, CacheError> {
        let mut stats = CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            expired_evictions: self.counters.expired.load(Ordering::Relaxed),
            corrupt_evictions: self.counters.corrupt.load(Ordering::Relaxed),
            ..CacheStats::default()
        };

        for storage_key in self.store.keys(&self.config.namespace)? {
            let Some(entry) = self
                .store
                .get(&storage_key)?
                .and_then(|raw| serde_json::from_str::<CacheEntry>(&raw).ok())
            else {
                continue;
            };

            stats.total_entries += 1;
            stats.total_access_count += entry.access_count;
            stats.oldest_entry = Some(match stats.oldest_entry {
                Some(oldest) => oldest.min(entry.cached_at),
                None => entry.cached_at,
            });
            stats.newest_entry = Some(match stats.newest_entry {
                Some(newest) => newest.max(entry.cached_at),
                None => entry.cached_at,
            });
        }

        Ok(stats)
    }

    /// Housekeeping after a write. The write already succeeded, so a failed
    /// sweep is only logged.
    fn maybe_sweep(&self) {
        let Some(interval) = self.config.sweep_interval else {
            return;
        };

        let due = match self.last_sweep.lock() {
            Ok(last) => Utc::now().signed_duration_since(*last) > to_chrono(interval),
            Err(_) => false,
        };

        if due {
            if let Err(e) = self.sweep_expired() {
                warn!(error = %e, "expired-entry sweep failed");
            }
        }
    }

    fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        entry.age(now) > to_chrono(self.config.max_age)
    }

    fn storage_key(&self, key: &ContentKey) -> String {
        format!("{}{}", self.config.namespace, key.as_str())
    }

    fn record_miss(&self, key: &ContentKey) {
        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        self.events.send(Event::Cache(CacheEvent::Miss {
            key: key.to_string(),
        }));
    }

    fn lock_updates(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no broken state.
        self.update_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn serialize(entry: &CacheEntry) -> Result<String, CacheError> {
        serde_json::to_string(entry).map_err(|e| CacheError::SerializationFailed {
            key: entry.key.clone(),
            reason: e.to_string(),
        })
    }
}

fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::days(365_000))
}
