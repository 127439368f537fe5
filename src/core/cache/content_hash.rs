//! Cache keys derived from image content.
//!
//! The preferred key is a BLAKE3 digest of the full byte content: two
//! uploads with different names but identical bytes share an entry, and a
//! single changed byte yields a different key.
//!
//! [`ContentKey::from_metadata`] exists for callers that cannot read the
//! bytes up front. It hashes `(name, size, last_modified)` and is NOT
//! content-equivalent: renamed copies miss, and an edited file that keeps
//! its size and timestamp collides with its old entry.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use xxhash_rust::xxh3::xxh3_128;

/// How a key was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyKind {
    /// Digest of the full byte content
    Content,
    /// Degraded key from file metadata
    Metadata,
}

/// A cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentKey {
    value: String,
    kind: KeyKind,
}

impl ContentKey {
    /// BLAKE3 digest of `bytes`, hex encoded
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            value: blake3::hash(bytes).to_hex().to_string(),
            kind: KeyKind::Content,
        }
    }

    /// Collision-prone fallback from file metadata
    pub fn from_metadata(name: &str, size: u64, last_modified: Option<SystemTime>) -> Self {
        let modified_ms = last_modified
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let material = format!("{}\u{0}{}\u{0}{}", name, size, modified_ms);

        Self {
            value: format!("meta-{:032x}", xxh3_128(material.as_bytes())),
            kind: KeyKind::Metadata,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// True only for digests of the actual bytes
    pub fn is_content_addressed(&self) -> bool {
        self.kind == KeyKind::Content
    }
}

impl std::fmt::Display for ContentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn identical_bytes_share_a_key() {
        let a = ContentKey::from_bytes(b"same pixels");
        let b = ContentKey::from_bytes(b"same pixels");
        assert_eq!(a, b);
        assert!(a.is_content_addressed());
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn one_byte_changes_the_key() {
        let a = ContentKey::from_bytes(&[0, 1, 2, 3]);
        let b = ContentKey::from_bytes(&[0, 1, 2, 4]);
        assert_ne!(a, b);
    }

    #[test]
    fn metadata_keys_are_marked_degraded() {
        let modified = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let key = ContentKey::from_metadata("photo.jpg", 1024, Some(modified));

        assert_eq!(key.kind(), KeyKind::Metadata);
        assert!(!key.is_content_addressed());
        assert!(key.as_str().starts_with("meta-"));
    }

    #[test]
    fn metadata_keys_depend_on_every_field() {
        let t = UNIX_EPOCH + Duration::from_secs(42);
        let base = ContentKey::from_metadata("a.png", 10, Some(t));

        assert_ne!(base, ContentKey::from_metadata("b.png", 10, Some(t)));
        assert_ne!(base, ContentKey::from_metadata("a.png", 11, Some(t)));
        assert_ne!(base, ContentKey::from_metadata("a.png", 10, None));
        assert_eq!(base, ContentKey::from_metadata("a.png", 10, Some(t)));
    }
}
