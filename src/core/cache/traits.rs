//! Key-value store trait definition.

use crate::error::CacheError;

/// Flat string key-value storage behind the content cache.
///
/// Implementations must be safe to share across worker threads.
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if absent
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Remove a value; removing a missing key is not an error
    fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Every key starting with `prefix`
    ///
    /// Used by housekeeping sweeps, never on the lookup path.
    fn keys(&self, prefix: &str) -> Result<Vec<String>, CacheError>;
}
