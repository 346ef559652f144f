//! Cache key derivation
//!
//! A `CacheKey` reduces a request to a stable identity:
//! - `method`: request method (e.g. "GET")
//! - `partition`: isolation domain (e.g. top-level site) preventing
//!   cross-partition reuse
//! - `identifier`: canonicalized request identity (URL plus any
//!   cache-relevant request attributes)
//! - `range`: byte-range descriptor for partial-content requests
//!
//! The 20-byte SHA-1 digest over (method, partition, identifier) is
//! computed once at construction and is the sole value used for
//! storage addressing. `range` participates in key equality but is not
//! mixed into the digest; differently-ranged requests for the same
//! resource share a storage address and are disambiguated by full-field
//! equality.

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

/// 20-byte SHA-1 digest addressing a cache entry in storage.
pub type KeyHash = [u8; 20];

/// Length of the hex addressing string: two characters per digest byte.
const HASH_STRING_LENGTH: usize = 2 * std::mem::size_of::<KeyHash>();

/// Stable identity for a cacheable request.
///
/// Equality compares every field, not just the digest, so a hash
/// collision between distinct keys can never be mistaken for identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheKey {
    method: String,
    partition: String,
    identifier: String,
    /// Write-path-only metadata: never serialized, never hashed.
    #[serde(skip)]
    range: String,
    hash: KeyHash,
}

impl CacheKey {
    /// Construct a key for a whole-resource request.
    ///
    /// An empty `identifier` yields a null key; callers must check
    /// `is_null()` before using the key for storage addressing.
    pub fn new(
        method: impl Into<String>,
        partition: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self::with_range(method, partition, identifier, "")
    }

    /// Construct a key for a partial-content request.
    pub fn with_range(
        method: impl Into<String>,
        partition: impl Into<String>,
        identifier: impl Into<String>,
        range: impl Into<String>,
    ) -> Self {
        let method = method.into();
        let partition = partition.into();
        let identifier = identifier.into();
        let hash = compute_hash(&method, &partition, &identifier);
        Self {
            method,
            partition,
            identifier,
            range: range.into(),
            hash,
        }
    }

    /// A key constructed from an empty identifier carries no identity.
    pub fn is_null(&self) -> bool {
        self.identifier.is_empty()
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn partition(&self) -> &str {
        &self.partition
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn range(&self) -> &str {
        &self.range
    }

    /// The 20-byte digest used for storage addressing.
    pub fn hash(&self) -> KeyHash {
        self.hash
    }

    /// Lowercase hex form of the digest, always 40 characters; the
    /// canonical storage address and debugging identifier.
    pub fn hash_as_string(&self) -> String {
        hex::encode(self.hash)
    }

    /// Inverse of `hash_as_string`. Returns `None` for anything that is
    /// not exactly 40 hex characters; no partial digest is accepted.
    pub fn string_to_hash(s: &str) -> Option<KeyHash> {
        if s.len() != HASH_STRING_LENGTH {
            return None;
        }
        let bytes = hex::decode(s).ok()?;
        let mut hash = KeyHash::default();
        hash.copy_from_slice(&bytes);
        Some(hash)
    }
}

impl std::hash::Hash for CacheKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // The digest already covers the hashed fields; equal keys agree
        // on it, so it is a valid table hash on its own.
        state.write(&self.hash);
    }
}

fn compute_hash(method: &str, partition: &str, identifier: &str) -> KeyHash {
    let mut hasher = Sha1::new();
    for field in [method, partition, identifier] {
        hasher.update(field.as_bytes());
        // Zero separator keeps field boundaries from shifting between
        // keys ("a" + "bc" must not collide with "ab" + "c").
        hasher.update([0u8]);
    }
    hasher.finalize().into()
}
